//! Error types for the HTTP parser.

use thiserror::Error;

/// Errors that can occur while reading an HTTP request off a connection.
#[derive(Debug, Error)]
pub enum Error {
    /// The start line did not consist of exactly three space-separated fields.
    #[error("Malformed start line: {0:?}")]
    MalformedStartLine(String),

    /// A header line had no `:` separating the name from its values.
    #[error("Header line without separator: {0:?}")]
    MissingHeaderSeparator(String),

    /// A start or header line ran past the line length limit without a CR LF.
    #[error("Line exceeds {0} bytes")]
    LineTooLong(usize),

    /// The method is not one of the verbs the dispatcher routes.
    #[error("Unknown HTTP method: {0}")]
    UnknownMethod(String),

    /// The underlying connection failed while reading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error decoding a JSON body.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}
