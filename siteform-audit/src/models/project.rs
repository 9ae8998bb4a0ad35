//! Project table model and quantity coercion
//!
//! Each project row carries the site name plus a flat metadata map taken
//! verbatim from the uploaded table. The photo reconciliation reads
//! equipment quantities out of that map; values arrive as numbers or
//! locale-formatted numeric strings ("4", "4,0", "-").

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use siteform_common::{Error, Result};

/// One project (deployment site) with its metadata columns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// Site name ("Intitulé" column), the selection key
    pub name: String,
    /// Remaining columns, keys kept exactly as uploaded
    pub metadata: BTreeMap<String, Value>,
}

impl ProjectRecord {
    /// Read a metadata field as an equipment quantity.
    ///
    /// Missing fields and unusable values coerce to zero; one bad cell must
    /// never block a section's photo rule.
    pub fn quantity(&self, field: &str) -> i64 {
        coerce_quantity(self.metadata.get(field))
    }
}

/// Coerce a raw metadata value to an integer quantity.
///
/// Numbers pass through truncated (not rounded). Strings are trimmed, a
/// decimal comma is mapped to a point, then parsed as a float and
/// truncated. Blank, `-`, NaN, and unparsable values all coerce to zero,
/// silently.
pub fn coerce_quantity(value: Option<&Value>) -> i64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let normalized = s.trim().replace(',', ".");
            if normalized.is_empty() || normalized == "-" {
                None
            } else {
                normalized.parse::<f64>().ok()
            }
        }
        _ => None,
    };

    parsed
        .filter(|f| f.is_finite())
        .map(|f| f.trunc() as i64)
        .unwrap_or(0)
}

/// Immutable project table in upload order
#[derive(Debug, Clone)]
pub struct ProjectTable {
    records: Vec<ProjectRecord>,
}

impl ProjectTable {
    /// Build a table from records in upload order.
    ///
    /// Rejects an empty table and duplicate site names (the name is the
    /// lookup key for project selection).
    pub fn from_records(records: Vec<ProjectRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::InvalidInput(
                "project table contains no rows".to_string(),
            ));
        }
        for (i, record) in records.iter().enumerate() {
            if records[..i].iter().any(|r| r.name == record.name) {
                return Err(Error::InvalidInput(format!(
                    "duplicate project name: {}",
                    record.name
                )));
            }
        }
        Ok(Self { records })
    }

    /// Project names in table order
    pub fn names(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.name.as_str()).collect()
    }

    /// Look up a project by name
    pub fn get(&self, name: &str) -> Option<&ProjectRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn project(fields: &[(&str, Value)]) -> ProjectRecord {
        ProjectRecord {
            name: "Site Test".to_string(),
            metadata: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }

    #[test]
    fn quantity_parses_numbers_and_strings() {
        let p = project(&[
            ("a", json!(4)),
            ("b", json!("4")),
            ("c", json!("4,0")),
            ("d", json!(" 2.5 ")),
        ]);
        assert_eq!(p.quantity("a"), 4);
        assert_eq!(p.quantity("b"), 4);
        assert_eq!(p.quantity("c"), 4);
        // truncated, not rounded
        assert_eq!(p.quantity("d"), 2);
    }

    #[test]
    fn quantity_truncates_toward_zero() {
        let p = project(&[("a", json!(3.9)), ("b", json!("3,9"))]);
        assert_eq!(p.quantity("a"), 3);
        assert_eq!(p.quantity("b"), 3);
    }

    #[test]
    fn quantity_coerces_unusable_values_to_zero() {
        let p = project(&[
            ("blank", json!("")),
            ("dash", json!("-")),
            ("words", json!("quatre")),
            ("null", Value::Null),
            ("nan", json!("NaN")),
        ]);
        assert_eq!(p.quantity("blank"), 0);
        assert_eq!(p.quantity("dash"), 0);
        assert_eq!(p.quantity("words"), 0);
        assert_eq!(p.quantity("null"), 0);
        assert_eq!(p.quantity("nan"), 0);
        assert_eq!(p.quantity("absent"), 0);
    }

    #[test]
    fn table_rejects_duplicate_names() {
        let a = ProjectRecord {
            name: "Site A".to_string(),
            metadata: BTreeMap::new(),
        };
        let result = ProjectTable::from_records(vec![a.clone(), a]);
        assert!(result.is_err());
    }

    #[test]
    fn table_lookup_by_name() {
        let records = vec![
            ProjectRecord {
                name: "Site A".to_string(),
                metadata: BTreeMap::new(),
            },
            ProjectRecord {
                name: "Site B".to_string(),
                metadata: BTreeMap::new(),
            },
        ];
        let table = ProjectTable::from_records(records).unwrap();
        assert_eq!(table.names(), ["Site A", "Site B"]);
        assert!(table.get("Site B").is_some());
        assert!(table.get("Site C").is_none());
    }
}
