use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of an editable entity field, the second half of an edit-buffer key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldName(String);

impl FieldName {
    pub fn new(value: String) -> Result<Self, String> {
        if value.trim().is_empty() {
            return Err("Field name cannot be empty".to_string());
        }
        Ok(Self(value))
    }

    /// 既知のフィールド定数から生成する内部用コンストラクタ。
    pub(crate) fn known(value: &'static str) -> Self {
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
