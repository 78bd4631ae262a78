//! Error types for the weight plan core

use thiserror::Error;

/// Errors raised while turning raw inputs into typed core values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A closed enumeration received a key it does not know
    #[error("Unknown {kind}: {value}")]
    UnknownKey { kind: &'static str, value: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidField { field: String, value: String },

    #[error("Missing field: {0}")]
    MissingField(String),
}

impl CoreError {
    pub fn unknown(kind: &'static str, value: impl Into<String>) -> Self {
        CoreError::UnknownKey {
            kind,
            value: value.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, value: impl Into<String>) -> Self {
        CoreError::InvalidField {
            field: field.into(),
            value: value.into(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
