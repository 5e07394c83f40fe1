//! The request start line.

use std::fmt;
use std::str::FromStr;

use crate::parser::error::Error;
use crate::parser::method::Method;

/// The first line of an HTTP request: `METHOD TARGET VERSION`.
///
/// No method or version whitelist is applied here. `WAT /x HTTP/9.9` is a
/// perfectly good request line; the dispatcher decides what to do with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestLine {
    method: String,
    uri: String,
    http_version: String,
}

impl RequestLine {
    /// Create a request line from its three parts.
    pub fn new(
        method: impl Into<String>,
        uri: impl Into<String>,
        http_version: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
            http_version: http_version.into(),
        }
    }

    /// The method token exactly as it appeared on the wire.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The raw request target.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn http_version(&self) -> &str {
        &self.http_version
    }

    /// The routed method, if the token names one of the known verbs.
    pub fn known_method(&self) -> Option<Method> {
        self.method.parse().ok()
    }
}

impl FromStr for RequestLine {
    type Err = Error;

    /// Split on single spaces. Anything other than three fields is rejected,
    /// so doubled spaces are malformed too.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = line.split(' ').collect();
        match parts.as_slice() {
            [method, uri, version] => Ok(Self::new(*method, *uri, *version)),
            _ => Err(Error::MalformedStartLine(line.to_string())),
        }
    }
}

impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.method, self.uri, self.http_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_line() {
        let line: RequestLine = "GET /index.html HTTP/1.1".parse().unwrap();
        assert_eq!(line.method(), "GET");
        assert_eq!(line.uri(), "/index.html");
        assert_eq!(line.http_version(), "HTTP/1.1");
        assert_eq!(line.known_method(), Some(Method::GET));
    }

    #[test]
    fn test_unknown_method_still_parses() {
        let line: RequestLine = "WAT /x HTTP/1.1".parse().unwrap();
        assert_eq!(line.method(), "WAT");
        assert_eq!(line.known_method(), None);
    }

    #[test]
    fn test_wrong_field_count() {
        for input in ["", "GET", "GET /", "GET / HTTP/1.1 extra", "GET  / HTTP/1.1"] {
            let result = input.parse::<RequestLine>();
            assert!(
                matches!(result, Err(Error::MalformedStartLine(ref l)) if l == input),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_display_and_equality() {
        let line = RequestLine::new("PUT", "/create", "HTTP/1.0");
        assert_eq!(line.to_string(), "PUT /create HTTP/1.0");
        assert_eq!(line, "PUT /create HTTP/1.0".parse::<RequestLine>().unwrap());
    }
}
