use thiserror::Error;

use crate::domain::error::DomainError;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelAdminError {
    #[error("No admin registered for model '{model}'")]
    UnknownModel { model: String },

    #[error("Lookup not allowed: {lookup}")]
    DisallowedLookup { lookup: String },

    #[error("Incorrect lookup parameters: {reason}")]
    IncorrectLookup { reason: String },

    #[error("Permission denied")]
    PermissionDenied,

    #[error("{model} with pk '{pk}' not found")]
    NotFound { model: String, pk: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error")]
    Internal,
}

impl ModelAdminError {
    pub fn unknown_model(model: impl Into<String>) -> Self {
        Self::UnknownModel {
            model: model.into(),
        }
    }
}

impl From<DomainError> for ModelAdminError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::DisallowedLookup { lookup } => Self::DisallowedLookup { lookup },
            DomainError::IncorrectLookupParameters { reason } => Self::IncorrectLookup { reason },
            DomainError::PermissionDenied => Self::PermissionDenied,
            DomainError::NotFound { model, pk } => Self::NotFound { model, pk },
            DomainError::Validation { field, message } => Self::Validation {
                message: format!("{field}: {message}"),
            },
            DomainError::Configuration { .. } | DomainError::Store { .. } => Self::Internal,
        }
    }
}
