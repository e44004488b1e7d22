use thiserror::Error;

/// The source does not match the customer-record schema. Loading stops at the
/// first violation; no partial dataset is ever returned.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemaError {
    #[error("source is missing required column '{column}'")]
    MissingColumn { column: String },

    #[error("row {row}: column '{column}' expects a number, got '{value}'")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}: column '{column}' has unsupported type {data_type}")]
    UnsupportedType {
        row: usize,
        column: String,
        data_type: String,
    },
}

/// A request against the dataset names something that does not exist, or a
/// setting that cannot be honoured. Surfaced to the user; never fatal for a
/// running session.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("column '{column}' has no value '{value}'")]
    UnknownValue { column: String, value: String },

    #[error("column '{0}' is not numeric")]
    NotNumeric(String),

    #[error("invalid cleaning rule: {0}")]
    InvalidCleaningRule(String),

    #[error("invalid setting '{name}': {reason}")]
    InvalidSetting { name: String, reason: String },
}
