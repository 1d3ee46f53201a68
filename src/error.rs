use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

// Errors raised while classifying a batch of transactions
#[derive(Error, Debug)]
pub enum SlpError {
    // Malformed txids or block height in the request
    #[error("{0}")]
    InvalidInput(String),

    #[error("function handler is required")]
    MissingHandler,

    #[error("input object is required")]
    MissingInput,

    // Transport or lookup failure reported by the token info source, kept verbatim
    #[error("{0}")]
    Provider(String),

    // A single TXID exhausted its retries, so the whole batch is discarded
    #[error(transparent)]
    ClassificationFailed(Box<SlpError>),

    #[error("key must be a string")]
    InvalidKey,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

impl SlpError {
    // Returns the error that caused a batch failure, or self for any other kind
    pub fn root(&self) -> &SlpError {
        match self {
            SlpError::ClassificationFailed(inner) => inner.root(),
            other => other,
        }
    }
}

impl ResponseError for SlpError {
    fn status_code(&self) -> StatusCode {
        match self {
            SlpError::WorkerPool(_) | SlpError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            // Everything raised by the use case defaults to 422, like the REST layer always has
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
