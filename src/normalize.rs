//! The normalization pipeline: projection, coercion, and filtering.
//!
//! Projection reduces each source row to the bound logical fields and
//! drops rows that are empty across all of them. Coercion then turns
//! integer-kind fields (currently only `age`) into nullable integers,
//! and the final filter drops records left entirely null.

use crate::{
    data::{Record, Scalar},
    error::SyncError,
    schema::{AliasBinding, FieldKind},
    source::RawTable,
};

/// Builds one [`Record`] per source row, keeping only bound fields.
/// Rows with no value in any bound column contribute nothing; the
/// order of surviving rows is preserved.
pub fn project_records(table: &RawTable, binding: &AliasBinding) -> Vec<Record> {
    table
        .rows
        .iter()
        .filter_map(|row| {
            let fields: Vec<(&'static str, Option<Scalar>)> = binding
                .fields()
                .iter()
                .map(|bound| {
                    let value = row.get(bound.column).cloned().flatten();
                    (bound.field.name, value)
                })
                .collect();
            let record = Record::new(fields);
            if record.is_all_null() { None } else { Some(record) }
        })
        .collect()
}

/// Coerces every bound integer-kind field to a nullable integer.
///
/// Numeric values (including numeric text) are rounded half away from
/// zero: `"34.7"` becomes 35 and `"-2.5"` becomes -3. Anything
/// unparseable becomes null rather than an error, so a column can mix
/// numbers and nulls freely.
pub fn coerce_integer_fields(records: &mut [Record], binding: &AliasBinding) {
    for bound in binding.fields() {
        if bound.field.kind != FieldKind::Integer {
            continue;
        }
        for record in records.iter_mut() {
            let coerced = record.get(bound.field.name).and_then(coerce_to_integer);
            record.set(bound.field.name, coerced.map(Scalar::Integer));
        }
    }
}

fn coerce_to_integer(value: &Scalar) -> Option<i64> {
    match value {
        Scalar::Integer(i) => Some(*i),
        other => {
            let number = other.as_number()?;
            if number.is_finite() {
                Some(number.round() as i64)
            } else {
                None
            }
        }
    }
}

/// Drops records whose every field is null after coercion. A record
/// with even one non-null value survives. An empty survivor set is a
/// `NoValidRecords` error.
pub fn filter_records(records: Vec<Record>) -> Result<Vec<Record>, SyncError> {
    let surviving: Vec<Record> = records
        .into_iter()
        .filter(|record| !record.is_all_null())
        .collect();
    if surviving.is_empty() {
        return Err(SyncError::NoValidRecords);
    }
    Ok(surviving)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::AliasBinding;

    fn table(headers: &[&str], rows: Vec<Vec<Option<Scalar>>>) -> RawTable {
        RawTable {
            headers: headers.iter().map(|s| (*s).to_string()).collect(),
            rows,
        }
    }

    fn text(value: &str) -> Option<Scalar> {
        Some(Scalar::Text(value.to_string()))
    }

    #[test]
    fn projection_drops_rows_empty_across_bound_fields() {
        let table = table(
            &["Nome", "Anos", "Cidade", "Extra"],
            vec![
                vec![text("Ana"), text("34"), text("Lisboa"), text("x")],
                // Empty in every bound column; the extra column does not save it.
                vec![None, None, None, text("y")],
            ],
        );
        let binding = AliasBinding::resolve(&table.headers).unwrap();
        let records = project_records(&table, &binding);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("name"), Some(&Scalar::Text("Ana".into())));
    }

    #[test]
    fn coercion_rounds_half_away_from_zero() {
        let table = table(
            &["nome", "idade"],
            vec![
                vec![text("Ana"), text("34.7")],
                vec![text("Bia"), text("-2.5")],
                vec![text("Caio"), text("N/A")],
                vec![text("Duda"), None],
            ],
        );
        let binding = AliasBinding::resolve(&table.headers).unwrap();
        let mut records = project_records(&table, &binding);
        coerce_integer_fields(&mut records, &binding);

        assert_eq!(records[0].get("age"), Some(&Scalar::Integer(35)));
        assert_eq!(records[1].get("age"), Some(&Scalar::Integer(-3)));
        assert_eq!(records[2].get("age"), None);
        assert_eq!(records[3].get("age"), None);
    }

    #[test]
    fn filter_keeps_records_with_one_value() {
        let records = vec![
            Record::new(vec![("name", None), ("age", Some(Scalar::Integer(5))), ("city", None)]),
            Record::new(vec![("name", None), ("age", None), ("city", None)]),
        ];
        let surviving = filter_records(records).unwrap();
        assert_eq!(surviving.len(), 1);
        assert_eq!(surviving[0].get("age"), Some(&Scalar::Integer(5)));
    }

    #[test]
    fn filter_rejects_fully_null_input() {
        let records = vec![Record::new(vec![("name", None)])];
        assert!(matches!(
            filter_records(records),
            Err(SyncError::NoValidRecords)
        ));
    }
}
