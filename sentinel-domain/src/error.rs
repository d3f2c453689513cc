use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("invalid {field} '{value}'")]
    InvalidValue { field: &'static str, value: String },
}

/// A user write that would give two accounts the same username or email.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} '{value}' is taken")]
pub struct DuplicateKey {
    pub field: &'static str,
    pub value: String,
}

impl DuplicateKey {
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

impl DomainError {
    pub fn invalid(field: &'static str, value: impl Into<String>) -> Self {
        DomainError::InvalidValue {
            field,
            value: value.into(),
        }
    }
}
