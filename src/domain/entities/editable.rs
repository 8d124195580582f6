use crate::domain::value_objects::{EntityId, FieldName, FieldValue};
use chrono::{DateTime, Utc};

/// Uniform field access over the record kinds whose list items are edited
/// in place. The edit buffer, the save payload builder and the reconciler
/// all address fields through this trait instead of knowing each struct.
pub trait EditableRecord {
    /// Server-assigned id; only persisted records are editable.
    fn entity_id(&self) -> &EntityId;

    /// Server revision (`updated_at`) of this record, the base version new
    /// edits are made against.
    fn revision(&self) -> DateTime<Utc>;

    /// Names of the fields that accept in-place edits, in a stable order.
    fn editable_fields() -> &'static [&'static str]
    where
        Self: Sized;

    /// Current value of an editable field, `None` for unknown names.
    fn field(&self, name: &FieldName) -> Option<FieldValue>;

    /// Writes an editable field. Fails on unknown names or a value the
    /// field cannot hold.
    fn set_field(&mut self, name: &FieldName, value: &FieldValue) -> Result<(), String>;
}

/// 文字列必須フィールドへの代入を検証するヘルパー。
pub(crate) fn required_text(name: &str, value: &FieldValue) -> Result<String, String> {
    match value.as_str() {
        Some(s) if !s.trim().is_empty() => Ok(s.to_string()),
        Some(_) => Err(format!("{name} cannot be empty")),
        None => Err(format!("{name} must be a string")),
    }
}

/// 文字列フィールド（空可）への代入を検証するヘルパー。
pub(crate) fn optional_text(name: &str, value: &FieldValue) -> Result<Option<String>, String> {
    if value.is_null() {
        return Ok(None);
    }
    match value.as_str() {
        Some(s) => Ok(Some(s.to_string())),
        None => Err(format!("{name} must be a string or null")),
    }
}
