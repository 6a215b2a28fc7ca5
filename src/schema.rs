//! The fixed target schema and per-upload alias resolution.
//!
//! The schema is declarative and static: three logical fields, each
//! with an ordered list of accepted header spellings. Resolution walks
//! the alias list in declared order, so when a source table happens to
//! contain two accepted spellings for the same field, the
//! earlier-declared alias wins deterministically.

use crate::error::SyncError;

/// How a field's values are coerced after projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Nullable integer: numeric values are rounded, everything else
    /// becomes null.
    Integer,
}

/// One logical output field with its accepted header spellings.
#[derive(Debug)]
pub struct TargetField {
    pub name: &'static str,
    pub kind: FieldKind,
    pub aliases: &'static [&'static str],
}

/// The fields every upload is reduced to, in output order.
pub const TARGET_FIELDS: &[TargetField] = &[
    TargetField {
        name: "name",
        kind: FieldKind::Text,
        aliases: &["nome", "name"],
    },
    TargetField {
        name: "age",
        kind: FieldKind::Integer,
        aliases: &["idade", "anos", "idade (anos)", "age"],
    },
    TargetField {
        name: "city",
        kind: FieldKind::Text,
        aliases: &["cidade", "municipio", "município", "city"],
    },
];

/// Trims surrounding whitespace and lowercases a raw header.
/// Idempotent: normalizing twice equals normalizing once.
pub fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// A logical field matched to a concrete source column.
#[derive(Debug, Clone)]
pub struct BoundField {
    pub field: &'static TargetField,
    /// Header string as it appears in the source table.
    pub header: String,
    /// Column position in the source table.
    pub column: usize,
}

/// The per-upload resolution from logical fields to source columns.
/// Fields with no matching alias are simply absent.
#[derive(Debug, Clone)]
pub struct AliasBinding {
    bound: Vec<BoundField>,
}

impl AliasBinding {
    /// Matches each target field against the table's headers.
    ///
    /// Headers are normalized before comparison; alias-list order (not
    /// header order) decides ties. Fails with `NoMatchingColumns` when
    /// no field at all is resolvable.
    pub fn resolve(headers: &[String]) -> Result<Self, SyncError> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        let mut bound = Vec::new();
        for field in TARGET_FIELDS {
            let hit = field.aliases.iter().find_map(|alias| {
                normalized
                    .iter()
                    .position(|header| header.as_str() == *alias)
                    .map(|column| BoundField {
                        field,
                        header: headers[column].clone(),
                        column,
                    })
            });
            if let Some(binding) = hit {
                bound.push(binding);
            }
        }
        if bound.is_empty() {
            return Err(SyncError::NoMatchingColumns {
                expected: TARGET_FIELDS
                    .iter()
                    .map(|f| f.name)
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }
        Ok(Self { bound })
    }

    pub fn fields(&self) -> &[BoundField] {
        &self.bound
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.bound.iter().any(|b| b.field.name == name)
    }
}
