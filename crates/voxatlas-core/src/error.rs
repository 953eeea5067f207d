use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Missing required field `{field}` in {record} record")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },

    #[error("Unknown database engine: {0}")]
    UnknownEngine(String),

    #[error("Unknown metric kind: {0}")]
    UnknownMetricKind(String),

    #[error("Unknown system kind: {0}")]
    UnknownSystemKind(String),

    #[error("System not found: {0}")]
    SystemNotFound(String),

    #[error("Reference label not seeded: {0}")]
    ReferenceNotSeeded(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Feed parse error: {0}")]
    Feed(#[from] quick_xml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
