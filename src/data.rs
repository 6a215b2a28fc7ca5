//! Scalar cell values and normalized records.
//!
//! Nullability is always expressed as `Option<Scalar>`; there are no
//! sentinel values (no NaN-as-null, no empty-string-as-null past the
//! source boundary).

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A single cell value as read from a spreadsheet or sent to the store.
///
/// Serializes untagged: integers and floats become JSON numbers, text
/// becomes a JSON string.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Numeric view of the value, parsing text if necessary.
    /// Returns `None` for non-numeric text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Integer(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            Scalar::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Integer(i) => write!(f, "{i}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Text(s) => write!(f, "{s}"),
        }
    }
}

/// A row reduced to the logical fields bound for this upload, in
/// schema order. Fields absent from the binding do not appear at all;
/// bound-but-missing values are `None` and serialize as JSON `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Vec<(&'static str, Option<Scalar>)>,
}

impl Record {
    pub fn new(fields: Vec<(&'static str, Option<Scalar>)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&Scalar> {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .and_then(|(_, value)| value.as_ref())
    }

    pub fn set(&mut self, field: &str, value: Option<Scalar>) {
        if let Some(slot) = self.fields.iter_mut().find(|(name, _)| *name == field) {
            slot.1 = value;
        }
    }

    pub fn fields(&self) -> &[(&'static str, Option<Scalar>)] {
        &self.fields
    }

    /// True when every bound field is null.
    pub fn is_all_null(&self) -> bool {
        self.fields.iter().all(|(_, value)| value.is_none())
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_serializes_untagged() {
        assert_eq!(serde_json::to_string(&Scalar::Integer(35)).unwrap(), "35");
        assert_eq!(
            serde_json::to_string(&Scalar::Text("Lisboa".into())).unwrap(),
            "\"Lisboa\""
        );
    }

    #[test]
    fn scalar_as_number_parses_text() {
        assert_eq!(Scalar::Text(" 34.7 ".into()).as_number(), Some(34.7));
        assert_eq!(Scalar::Text("N/A".into()).as_number(), None);
        assert_eq!(Scalar::Integer(5).as_number(), Some(5.0));
    }

    #[test]
    fn record_serializes_null_for_missing_values() {
        let record = Record::new(vec![
            ("name", Some(Scalar::Text("Ana".into()))),
            ("age", None),
        ]);
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"name":"Ana","age":null}"#
        );
    }

    #[test]
    fn record_all_null_detection() {
        let record = Record::new(vec![("name", None), ("age", None)]);
        assert!(record.is_all_null());

        let mut record = record;
        record.set("age", Some(Scalar::Integer(5)));
        assert!(!record.is_all_null());
    }
}
