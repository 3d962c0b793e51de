use hyper::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// UpYun client errors
#[derive(Error, Debug)]
pub enum UpyunError {
    /// Local filesystem failure, passed through untouched
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("Body error: {0}")]
    Body(#[from] hyper::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] hyper::http::Error),

    #[error("TLS error: {0}")]
    Tls(#[from] native_tls::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Response status outside 200..=204
    #[error("UpYun error: {status} - {message}")]
    Api { status: StatusCode, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl UpyunError {
    /// HTTP status of an API error
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            UpyunError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Kind of a local I/O error
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            UpyunError::Io(e) => Some(e.kind()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, UpyunError>;
