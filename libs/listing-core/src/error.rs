use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("empty lookup key")]
    EmptyLookup,

    #[error("unsupported lookup operator: {0}")]
    UnknownOperator(String),

    #[error("invalid value for `{op}` lookup: {value:?}")]
    InvalidValue { op: &'static str, value: String },

    #[error("invalid ordering token: {0:?}")]
    InvalidOrderToken(String),
}
