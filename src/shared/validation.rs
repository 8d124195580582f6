use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// アプリケーションレベルのバリデーション失敗理由。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ValidationFailureKind {
    /// 汎用的なバリデーションエラー。
    Generic,
    /// 必須フィールドが空の場合。
    RequiredField,
    /// 編集対象として認められていないフィールドが指定された場合。
    UnknownField,
    /// フィールド値の型が合わない場合。
    FieldType,
    /// 値のサイズが制限を超過。
    ContentTooLarge,
    /// 日付・月の形式が不正な場合。
    InvalidDate,
    /// 未知の応募ステータスが指定された場合。
    UnknownState,
}

impl ValidationFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationFailureKind::Generic => "generic",
            ValidationFailureKind::RequiredField => "required_field",
            ValidationFailureKind::UnknownField => "unknown_field",
            ValidationFailureKind::FieldType => "field_type",
            ValidationFailureKind::ContentTooLarge => "content_too_large",
            ValidationFailureKind::InvalidDate => "invalid_date",
            ValidationFailureKind::UnknownState => "unknown_state",
        }
    }
}

impl fmt::Display for ValidationFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationFailureKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generic" => Ok(ValidationFailureKind::Generic),
            "required_field" => Ok(ValidationFailureKind::RequiredField),
            "unknown_field" => Ok(ValidationFailureKind::UnknownField),
            "field_type" => Ok(ValidationFailureKind::FieldType),
            "content_too_large" => Ok(ValidationFailureKind::ContentTooLarge),
            "invalid_date" => Ok(ValidationFailureKind::InvalidDate),
            "unknown_state" => Ok(ValidationFailureKind::UnknownState),
            _ => Err(()),
        }
    }
}
