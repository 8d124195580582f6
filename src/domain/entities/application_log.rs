use crate::domain::entities::editable::{optional_text, required_text, EditableRecord};
use crate::domain::value_objects::{EntityId, FieldName, FieldValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Editable field names of an application log.
pub mod fields {
    pub const PROCESS_NAME: &str = "process_name";
    pub const NOTE: &str = "note";
    pub const AUDIO_URL: &str = "audio_url";
}

/// One selection-process event under an application (phone screen,
/// technical interview, ...). List items are edited in place field by
/// field, which is what the buffer/debounce/save pipeline exists for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationLog {
    pub id: EntityId,
    pub application_id: EntityId,
    pub process_name: String,
    pub note: String,
    pub audio_url: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EditableRecord for ApplicationLog {
    fn entity_id(&self) -> &EntityId {
        &self.id
    }

    fn revision(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn editable_fields() -> &'static [&'static str] {
        &[fields::PROCESS_NAME, fields::NOTE, fields::AUDIO_URL]
    }

    fn field(&self, name: &FieldName) -> Option<FieldValue> {
        match name.as_str() {
            fields::PROCESS_NAME => Some(FieldValue::text(self.process_name.clone())),
            fields::NOTE => Some(FieldValue::text(self.note.clone())),
            fields::AUDIO_URL => Some(FieldValue::from(self.audio_url.clone())),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &FieldName, value: &FieldValue) -> Result<(), String> {
        match name.as_str() {
            fields::PROCESS_NAME => {
                self.process_name = required_text("Process name", value)?;
            }
            fields::NOTE => {
                self.note = optional_text("Note", value)?.unwrap_or_default();
            }
            fields::AUDIO_URL => {
                self.audio_url = optional_text("Audio URL", value)?;
            }
            other => return Err(format!("Unknown application log field: {other}")),
        }
        Ok(())
    }
}

/// Compose-row payload. Carries a client-generated `local_ref` so a retried
/// create can be deduplicated server-side; the row has no `EntityId` and
/// never enters the buffer/coordinator protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationLogDraft {
    pub process_name: String,
    pub note: String,
    pub audio_url: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub local_ref: Uuid,
}

impl ApplicationLogDraft {
    pub fn new(process_name: String, note: String, occurred_at: DateTime<Utc>) -> Self {
        Self {
            process_name,
            note,
            audio_url: None,
            occurred_at,
            local_ref: Uuid::new_v4(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.process_name.trim().is_empty() {
            return Err("Process name is required".to_string());
        }
        Ok(())
    }
}
