use miette::Diagnostic;
use thiserror::Error;

use crate::domain::ProductId;

#[derive(Debug, Error, Diagnostic)]
pub enum HarvestError {
    #[error("MONGO_URI is not set")]
    #[diagnostic(help("fill out the .env file or export MONGO_URI"))]
    MissingMongoUri,

    #[error("invalid value for {key}: {value}")]
    InvalidNumber { key: String, value: String },

    #[error("invalid product id range {start}..{end}")]
    #[diagnostic(help("the range is half-open and must satisfy 1 <= start <= end"))]
    InvalidRange { start: u32, end: u32 },

    #[error("failed to read env file {0}")]
    EnvFile(String),

    #[error("invalid product id: {0}")]
    InvalidProductId(String),

    #[error("an error occurred while requesting '{url}': {message}")]
    Transport { url: String, message: String },

    #[error("{id} - Failed to decode JSON: {message}")]
    Decode { id: ProductId, message: String },

    #[error("{id} was empty")]
    EmptyPayload { id: ProductId },

    #[error("{id} - could not convert record to a document: {message}")]
    DocumentEncode { id: ProductId, message: String },

    #[error("database error: {0}")]
    Store(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

impl HarvestError {
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            HarvestError::MissingMongoUri
                | HarvestError::EnvFile(_)
                | HarvestError::InvalidNumber { .. }
                | HarvestError::InvalidRange { .. }
                | HarvestError::InvalidProductId(_)
        )
    }
}

impl From<mongodb::error::Error> for HarvestError {
    fn from(err: mongodb::error::Error) -> Self {
        HarvestError::Store(err.to_string())
    }
}
