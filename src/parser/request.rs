//! HTTP request representation.

use std::collections::hash_map;
use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::parser::bounded::BoundedBody;
use crate::parser::error::Error;
use crate::parser::request_line::RequestLine;

/// The unread remainder of a connection, handed to handlers as the body.
pub type Body = Box<dyn AsyncRead + Send + Sync + Unpin>;

/// Read-only, case-insensitive view of request headers.
///
/// Names are stored lower-cased; every lookup lower-cases its key too.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    map: HashMap<String, Vec<String>>,
}

impl Headers {
    /// All values of a header, in declaration order.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.map
            .get(&name.to_lowercase())
            .map(Vec::as_slice)
    }

    /// The first value of a header.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(&name.to_lowercase())
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over `(lower-cased name, values)` pairs in no particular order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.map.iter(),
        }
    }
}

/// Iterator over a [`Headers`] view.
pub struct Iter<'a> {
    inner: hash_map::Iter<'a, String, Vec<String>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a [String]);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a str, &'a [String]);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Accumulates the parts of a [`Request`] while it is being read.
pub struct RequestBuilder {
    request_line: RequestLine,
    headers: HashMap<String, Vec<String>>,
    body: Option<Body>,
}

impl RequestBuilder {
    pub fn new(request_line: RequestLine) -> Self {
        Self {
            request_line,
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Set a header's values, replacing any earlier ones under the same
    /// (case-insensitive) name.
    pub fn set_header(&mut self, name: &str, values: Vec<String>) -> &mut Self {
        self.headers.insert(name.to_lowercase(), values);
        self
    }

    pub fn set_body(&mut self, body: Option<Body>) -> &mut Self {
        self.body = body;
        self
    }

    pub fn build(self) -> Request {
        Request {
            request_line: self.request_line,
            headers: Headers { map: self.headers },
            body: self.body,
        }
    }
}

/// A parsed HTTP request.
///
/// The request line and headers are fixed once built. The body is the raw
/// rest of the connection; it is not bounded by `Content-Length` unless the
/// caller asks for that through [`Request::bounded_body`].
pub struct Request {
    request_line: RequestLine,
    headers: Headers,
    body: Option<Body>,
}

impl Request {
    /// Start building a request for the given request line.
    pub fn builder(request_line: RequestLine) -> RequestBuilder {
        RequestBuilder::new(request_line)
    }

    pub fn request_line(&self) -> &RequestLine {
        &self.request_line
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// All values of a header (case-insensitive).
    pub fn header_values(&self, name: &str) -> Option<&[String]> {
        self.headers.get(name)
    }

    /// The first value of a header (case-insensitive).
    pub fn first_header_value(&self, name: &str) -> Option<&str> {
        self.headers.first(name)
    }

    /// The declared `Content-Length`, or `None` if absent or unparseable.
    pub fn content_length(&self) -> Option<u64> {
        self.first_header_value("content-length")?.parse().ok()
    }

    /// Check if the request declares a JSON body.
    pub fn is_json(&self) -> bool {
        self.first_header_value("content-type")
            .is_some_and(|content_type| content_type.starts_with("application/json"))
    }

    /// The raw, unbounded body stream.
    pub fn body_mut(&mut self) -> Option<&mut Body> {
        self.body.as_mut()
    }

    /// Take ownership of the raw body stream.
    pub fn take_body(&mut self) -> Option<Body> {
        self.body.take()
    }

    /// The body limited to `Content-Length` bytes.
    ///
    /// Without a `Content-Length` the request carries no body as far as this
    /// server is concerned, so the bound is zero.
    pub fn bounded_body(&mut self) -> Option<BoundedBody<&mut Body>> {
        let limit = self.content_length().unwrap_or(0);
        self.body.as_mut().map(|body| BoundedBody::new(body, limit))
    }

    /// Read the `Content-Length`-bounded body into memory.
    pub async fn read_body_to_end(&mut self) -> Result<Vec<u8>, Error> {
        let mut bytes = Vec::new();
        if let Some(mut body) = self.bounded_body() {
            body.read_to_end(&mut bytes).await?;
        }
        Ok(bytes)
    }

    /// Decode the `Content-Length`-bounded body as JSON.
    pub async fn json<T: DeserializeOwned>(&mut self) -> Result<T, Error> {
        let bytes = self.read_body_to_end().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("request_line", &self.request_line)
            .field("headers", &self.headers)
            .field("body", &self.body.as_ref().map(|_| "<stream>"))
            .finish()
    }
}
