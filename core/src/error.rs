//! Error types for request assembly and execution.
//!
//! # Design
//! Failures are split by where they happen. `ProjectionError` is raised while
//! building a request, `TransportError` comes from the transport boundary and
//! `DecodeError` from a response decoder. `RequestError` is what an execution
//! finally reports to the caller; a non-2xx status gets its own `Status`
//! variant with the raw code and body for debugging.
//!
//! Body encoding failures have no error type: they never reach the caller and
//! are reported through `DiagnosticSink` instead.

/// A payload could not be projected to a flat string mapping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectionError {
    /// The encoded form was valid JSON but not an object.
    #[error("expected an object-shaped payload, found {found}")]
    NotAnObject { found: &'static str },

    /// The value could not be encoded at all.
    #[error("payload encoding failed: {0}")]
    Encode(String),
}

/// Failures reported by a `Transport`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request did not complete within its timeout.
    #[error("request timed out")]
    Timeout,

    /// The host could not be reached (DNS, refused connection, TLS).
    #[error("connection failed: {0}")]
    Connect(String),

    /// I/O failed after the connection was established.
    #[error("io error: {0}")]
    Io(String),

    /// The wire request could not be handed to the transport.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Response bytes did not match the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("json decode failed: {0}")]
    Json(String),

    #[error("body is not valid utf-8: {0}")]
    Utf8(String),
}

/// Errors returned by `Client` execution methods.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The query payload was not object-shaped.
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    /// The transport failed before a response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded into the expected type.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The pending request was cancelled before it completed.
    #[error("request cancelled")]
    Cancelled,
}

impl RequestError {
    /// True for failures the tolerant variant would have turned into `None`.
    pub fn is_decode(&self) -> bool {
        matches!(self, RequestError::Decode(_))
    }
}
