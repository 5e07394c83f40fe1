//! Error types for the HTTP server.

use std::net::SocketAddr;

use thiserror::Error;

use crate::parser::Error as ParserError;

/// Errors that can occur during HTTP server operation.
#[derive(Debug, Error)]
pub enum Error {
    /// Error parsing an HTTP request.
    #[error("Parse error: {0}")]
    Parse(#[from] ParserError),

    /// I/O error on a connection.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The listening socket could not be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// `flush` was called before a status line was set.
    #[error("Response flushed without a status line")]
    MissingStatusLine,

    /// A response was modified after it had been flushed.
    #[error("Response already flushed")]
    AlreadyFlushed,

    /// The server has already been started or stopped.
    #[error("Server already started")]
    AlreadyStarted,

    /// A handler gave up on the request.
    #[error("Handler error: {0}")]
    Handler(String),

    /// A handler panicked while serving the request.
    #[error("Handler panicked: {0}")]
    Panic(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this is a misuse of the response state machine.
    pub fn is_state_violation(&self) -> bool {
        matches!(self, Error::MissingStatusLine | Error::AlreadyFlushed)
    }
}
