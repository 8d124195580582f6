use crate::shared::validation::ValidationFailureKind;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Validation {
        kind: ValidationFailureKind,
        message: String,
    },
    Api {
        status: u16,
        message: String,
    },
    Network(String),
    NotFound(String),
    SerializationError(String),
    ConfigurationError(String),
    Internal(String),
}

impl AppError {
    pub fn validation(kind: ValidationFailureKind, message: impl Into<String>) -> Self {
        AppError::Validation {
            kind,
            message: message.into(),
        }
    }

    /// `map_err` 用のヘルパー。`Result<_, String>` を検証エラーに変換する。
    pub fn validation_mapper(kind: ValidationFailureKind) -> impl Fn(String) -> AppError {
        move |message| AppError::Validation { kind, message }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::Api { .. } => "api_error",
            AppError::Network(_) => "network_error",
            AppError::NotFound(_) => "not_found",
            AppError::SerializationError(_) => "serialization_error",
            AppError::ConfigurationError(_) => "configuration_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Message suitable for a toast. Backend-provided text passes through
    /// unchanged; it is already user-facing.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation { message, .. } => message.clone(),
            AppError::Api { message, .. } => message.clone(),
            AppError::Network(_) => "Network error. Please try again.".to_string(),
            AppError::NotFound(message) => message.clone(),
            AppError::SerializationError(_) | AppError::Internal(_) => {
                "Something went wrong. Please try again.".to_string()
            }
            AppError::ConfigurationError(message) => message.clone(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_)) || matches!(self, AppError::Api { status: 404, .. })
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation { kind, message } => {
                write!(f, "Validation error ({kind}): {message}")
            }
            AppError::Api { status, message } => write!(f, "API error ({status}): {message}"),
            AppError::Network(msg) => write!(f, "Network error: {msg}"),
            AppError::NotFound(msg) => write!(f, "Not found: {msg}"),
            AppError::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
            AppError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
            AppError::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
