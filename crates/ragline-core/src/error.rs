//! Error types for Ragline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    /// An upstream LLM or embedding call failed. Attempt-once, never retried.
    /// `status` carries a provider-supplied HTTP status when one exists.
    #[error("{message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    #[error("Vector store error: {0}")]
    Store(String),

    #[error(
        "Ingest is not supported in demo mode.\n\
         Run your own deployment with DEMO_MODE unset to add documents."
    )]
    DemoRestricted,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Malformed provider output: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an upstream error without a provider-supplied status.
    pub fn upstream(message: impl Into<String>) -> Self {
        Error::Upstream {
            status: None,
            message: message.into(),
        }
    }

    /// Create an upstream error carrying the provider's HTTP status.
    pub fn upstream_status(status: u16, message: impl Into<String>) -> Self {
        Error::Upstream {
            status: Some(status),
            message: message.into(),
        }
    }

    /// HTTP status code for surfacing this error at the handler boundary.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::DemoRestricted => 403,
            Error::BadRequest(_) => 400,
            Error::Upstream {
                status: Some(s), ..
            } => *s,
            _ => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
