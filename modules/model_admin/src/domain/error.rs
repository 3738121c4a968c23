use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A lookup parameter names a path no filter allows.
    #[error("Filtering by {lookup} not allowed")]
    DisallowedLookup { lookup: String },

    /// Parameters are malformed or reference something that cannot be queried.
    /// The REST layer answers these with a redirect to `?e=1`.
    #[error("Incorrect lookup parameters: {reason}")]
    IncorrectLookupParameters { reason: String },

    #[error("Improperly configured: {message}")]
    Configuration { message: String },

    #[error("Permission denied")]
    PermissionDenied,

    #[error("{model} with pk '{pk}' not found")]
    NotFound { model: String, pk: String },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Store error: {message}")]
    Store { message: String },
}

impl DomainError {
    pub fn disallowed_lookup(lookup: impl Into<String>) -> Self {
        Self::DisallowedLookup {
            lookup: lookup.into(),
        }
    }

    pub fn incorrect_lookup(reason: impl Into<String>) -> Self {
        Self::IncorrectLookupParameters {
            reason: reason.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn not_found(model: impl Into<String>, pk: impl Into<String>) -> Self {
        Self::NotFound {
            model: model.into(),
            pk: pk.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for DomainError {
    fn from(e: anyhow::Error) -> Self {
        Self::store(format!("{e:#}"))
    }
}
