//! Status lines and the common status codes.

use std::fmt;

/// The protocol version this server speaks.
pub const HTTP_1_1: &str = "HTTP/1.1";

/// HTTP status codes with their standard reason phrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok = 200,
    Created = 201,
    Accepted = 202,
    NoContent = 204,
    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    MethodNotAllowed = 405,
    InternalServerError = 500,
    NotImplemented = 501,
    BadGateway = 502,
    ServiceUnavailable = 503,
}

impl StatusCode {
    /// Get the reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::Accepted => "Accepted",
            StatusCode::NoContent => "No Content",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
            StatusCode::BadGateway => "Bad Gateway",
            StatusCode::ServiceUnavailable => "Service Unavailable",
        }
    }

    pub fn as_u16(&self) -> u16 {
        *self as u16
    }
}

/// The first line of a response: `VERSION CODE REASON`.
///
/// The reason phrase is written as given; it must not contain line
/// terminators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatusLine {
    http_version: String,
    code: u16,
    reason: String,
}

impl StatusLine {
    pub fn new(http_version: impl Into<String>, code: u16, reason: impl Into<String>) -> Self {
        Self {
            http_version: http_version.into(),
            code,
            reason: reason.into(),
        }
    }

    pub fn http_version(&self) -> &str {
        &self.http_version
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl From<StatusCode> for StatusLine {
    /// An `HTTP/1.1` status line with the standard reason phrase.
    fn from(status: StatusCode) -> Self {
        Self::new(HTTP_1_1, status.as_u16(), status.reason_phrase())
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.http_version, self.code, self.reason)
    }
}
