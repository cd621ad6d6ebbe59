use crate::error::Result;
use serde_json::{json, Value};
use sqlx::PgPool;
use std::collections::BTreeSet;

/// A worker-table column the code understands, and the slot it projects
/// to/from in the nested profile document.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMapping {
    pub column: &'static str,
    pub section: &'static str,
    pub field: &'static str,
    /// SQL cast appended to the bound parameter (columns are written as text).
    pub cast: Option<&'static str>,
}

const fn col(
    column: &'static str,
    section: &'static str,
    field: &'static str,
    cast: Option<&'static str>,
) -> ColumnMapping {
    ColumnMapping {
        column,
        section,
        field,
        cast,
    }
}

/// Every optional column the store knows how to project. The live table may
/// carry any subset of these; writes touch only the intersection.
pub const KNOWN_COLUMNS: &[ColumnMapping] = &[
    col("full_name", "personal", "full_name", None),
    col("phone", "personal", "phone", None),
    col("email", "personal", "email", None),
    col("birth_date", "personal", "birth_date", Some("date")),
    col("gender", "personal", "gender", None),
    col("national_id", "identity", "national_id", None),
    col("position", "employment", "position", None),
    col("start_date", "employment", "start_date", Some("date")),
    col("status", "employment", "worker_status", None),
];

/// Immutable descriptor of the live worker table, loaded once at startup and
/// passed into the store's constructor. Refreshing it means loading a new
/// descriptor and constructing a new store; nothing mutates in place.
#[derive(Debug, Clone)]
pub struct WorkerTableSchema {
    columns: BTreeSet<String>,
}

impl WorkerTableSchema {
    pub async fn load(pool: &PgPool) -> Result<Self> {
        let columns: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT column_name FROM information_schema.columns
            WHERE table_schema = current_schema() AND table_name = 'workers'
            "#,
        )
        .fetch_all(pool)
        .await?;
        Ok(Self::from_columns(columns))
    }

    pub fn from_columns<I>(columns: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            columns: columns.into_iter().collect(),
        }
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    /// Projects a profile document onto the columns that both the code and
    /// the live table know about. Fields the document does not carry (or
    /// carries empty) are omitted rather than written as NULL, so partial
    /// documents never clobber existing values.
    pub fn project(&self, profile: &Value) -> Vec<(ColumnMapping, String)> {
        KNOWN_COLUMNS
            .iter()
            .filter(|mapping| self.columns.contains(mapping.column))
            .filter_map(|mapping| {
                let value = profile
                    .get(mapping.section)
                    .and_then(|section| section.get(mapping.field))
                    .and_then(value_to_string)?;
                Some((*mapping, value))
            })
            .collect()
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Precedence merge of the two profile sources: the overlay document is the
/// base, and every known relational column present (and non-null) in the row
/// overwrites its slot. The result is re-derived in full on every read.
pub fn merge_profile(relational: &Value, overlay: Value) -> Value {
    let mut doc = match overlay {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };

    for mapping in KNOWN_COLUMNS {
        let Some(value) = relational.get(mapping.column) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        let section = doc
            .entry(mapping.section.to_string())
            .or_insert_with(|| json!({}));
        if !section.is_object() {
            *section = json!({});
        }
        if let Some(fields) = section.as_object_mut() {
            fields.insert(mapping.field.to_string(), value.clone());
        }
    }

    Value::Object(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_is_limited_to_present_columns() {
        let schema =
            WorkerTableSchema::from_columns(["full_name", "phone"].map(String::from));
        let profile = json!({
            "personal": { "full_name": "Somchai J.", "phone": "0812345678", "email": "s@x.th" },
            "identity": { "national_id": "1234567890123" }
        });

        let projected = schema.project(&profile);
        let columns: Vec<&str> = projected.iter().map(|(m, _)| m.column).collect();
        assert_eq!(columns, vec!["full_name", "phone"]);
    }

    #[test]
    fn projection_skips_empty_and_missing_fields() {
        let schema = WorkerTableSchema::from_columns(
            ["full_name", "email", "gender"].map(String::from),
        );
        let profile = json!({
            "personal": { "full_name": "Somchai J.", "email": "  " }
        });

        let projected = schema.project(&profile);
        assert_eq!(projected.len(), 1);
        assert_eq!(projected[0].0.column, "full_name");
        assert_eq!(projected[0].1, "Somchai J.");
    }

    #[test]
    fn relational_values_win_over_overlay() {
        let relational = json!({
            "full_name": "Relational Name",
            "phone": "+66812345678",
            "email": null
        });
        let overlay = json!({
            "personal": { "full_name": "Overlay Name", "email": "overlay@x.th" },
            "skills": { "level": "senior" }
        });

        let merged = merge_profile(&relational, overlay);
        assert_eq!(merged["personal"]["full_name"], "Relational Name");
        assert_eq!(merged["personal"]["phone"], "+66812345678");
        // Null relational values do not erase overlay data.
        assert_eq!(merged["personal"]["email"], "overlay@x.th");
        // Sections unknown to the relational schema survive untouched.
        assert_eq!(merged["skills"]["level"], "senior");
    }

    #[test]
    fn merge_tolerates_non_object_overlay() {
        let relational = json!({ "full_name": "Only Name" });
        let merged = merge_profile(&relational, Value::Null);
        assert_eq!(merged["personal"]["full_name"], "Only Name");
    }
}
