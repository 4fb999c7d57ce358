use thiserror::Error;

/// Result type alias for boundary validation
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised where loosely-typed input becomes typed records
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown chamber: {0:?} (expected house or senate)")]
    UnknownChamber(String),

    #[error("Hearing record has an empty identifier")]
    EmptyIdentifier,

    #[error("Hearing {hearing_id} is missing required field {field}")]
    MissingField { hearing_id: String, field: &'static str },

    #[error("Invalid configuration: {0}")]
    Config(String),
}
