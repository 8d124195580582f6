use crate::domain::entities::editable::{optional_text, EditableRecord};
use crate::domain::value_objects::{EntityId, FieldName, FieldValue};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Editable field names of a work log entry.
pub mod fields {
    pub const CONTENT: &str = "content";
}

/// One day's work log. At most one entry exists per date; the backend
/// exposes a date-keyed upsert rather than an update-by-id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkLogEntry {
    pub id: EntityId,
    pub date: NaiveDate,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EditableRecord for WorkLogEntry {
    fn entity_id(&self) -> &EntityId {
        &self.id
    }

    fn revision(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn editable_fields() -> &'static [&'static str] {
        &[fields::CONTENT]
    }

    fn field(&self, name: &FieldName) -> Option<FieldValue> {
        match name.as_str() {
            fields::CONTENT => Some(FieldValue::text(self.content.clone())),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &FieldName, value: &FieldValue) -> Result<(), String> {
        match name.as_str() {
            // 既存エントリの本文は空にできる（バブルは「Click to add content...」表示になる）。
            fields::CONTENT => {
                self.content = optional_text("Content", value)?.unwrap_or_default();
            }
            other => return Err(format!("Unknown work log field: {other}")),
        }
        Ok(())
    }
}

/// Upsert payload for the date-keyed endpoint. `append` adds the content to
/// an existing entry for the date instead of replacing it (the compose bar
/// uses this).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkLogUpsert {
    pub date: NaiveDate,
    pub content: String,
    #[serde(default)]
    pub append: bool,
}

impl WorkLogUpsert {
    pub fn validate(&self) -> Result<(), String> {
        if self.append && self.content.trim().is_empty() {
            return Err("Content is required".to_string());
        }
        Ok(())
    }
}
