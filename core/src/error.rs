//! Error types for the request executor.
//!
//! # Design
//! None of these errors reach a completion callback. Every failure inside an
//! attempt becomes an `AttemptError`, and `AttemptError::status` folds it
//! into the closed `ApiStatus` set that callers see. `TransportError` is the
//! contract between the executor and a `Transport`: its variant decides
//! whether a failure counts as a network error or an unknown one.

use thiserror::Error;

use crate::status::ApiStatus;

/// Failures raised by a `Transport` while executing a request.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Reading or writing the connection failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connect or read timeout elapsed.
    #[error("timed out: {0}")]
    Timeout(String),

    /// No connection could be established (DNS, refused, unreachable).
    #[error("connection failed: {0}")]
    Connect(String),

    /// The peer broke the HTTP protocol mid-exchange.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The response body is larger than the transport's limit, in bytes.
    #[error("response body exceeds {0} bytes")]
    BodyTooLarge(u64),

    /// The request could not be expressed on the wire (bad URL, bad method).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    pub fn status(&self) -> ApiStatus {
        match self {
            TransportError::Io(_)
            | TransportError::Timeout(_)
            | TransportError::Connect(_)
            | TransportError::Protocol(_) => ApiStatus::ErrorNetwork,
            // The exchange completed; the payload is what is wrong.
            TransportError::BodyTooLarge(_) => ApiStatus::ErrorServer,
            TransportError::InvalidRequest(_) | TransportError::Other(_) => ApiStatus::ErrorUnknown,
        }
    }
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Io(e) => TransportError::Io(e),
            ureq::Error::Timeout(_) => TransportError::Timeout(err.to_string()),
            ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => {
                TransportError::Connect(err.to_string())
            }
            ureq::Error::Protocol(_) => TransportError::Protocol(err.to_string()),
            ureq::Error::BodyExceedsLimit(limit) => TransportError::BodyTooLarge(limit),
            ureq::Error::BadUri(_) | ureq::Error::Http(_) => {
                TransportError::InvalidRequest(err.to_string())
            }
            other => TransportError::Other(other.to_string()),
        }
    }
}

/// Why a single attempt did not produce a regular outcome.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response carried no content at all.
    #[error("response body is empty")]
    EmptyBody,

    #[error("response body is not valid JSON: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("response body is JSON but not an object")]
    NotAnObject,

    #[error("request body could not be encoded: {0}")]
    Encode(serde_json::Error),

    #[error("transport panicked")]
    Panicked,
}

impl AttemptError {
    pub fn status(&self) -> ApiStatus {
        match self {
            AttemptError::Transport(e) => e.status(),
            AttemptError::EmptyBody | AttemptError::MalformedBody(_) | AttemptError::NotAnObject => {
                ApiStatus::ErrorServer
            }
            AttemptError::Encode(_) | AttemptError::Panicked => ApiStatus::ErrorUnknown,
        }
    }
}

/// A method string that is not one of the supported HTTP verbs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseMethodError {
    #[error("HTTP method is empty")]
    Empty,

    #[error("unsupported HTTP method: {0}")]
    Unknown(String),
}
