use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A single field's value as it travels between the edit buffer, a save
/// payload and the wire. JSON-typed because the two editable record kinds
/// carry strings and nullable strings; `Null` means "clear the field".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue(Value);

impl FieldValue {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self(Value::String(value.into()))
    }

    pub fn null() -> Self {
        Self(Value::Null)
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_str()
    }

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    /// 空文字・空白のみの文字列・null を「空」とみなす。
    pub fn is_blank(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{other}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(s) => Self::text(s),
            None => Self::null(),
        }
    }
}
