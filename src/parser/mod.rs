//! HTTP parser module.
//!
//! Turns the byte stream of a connection into a [`Request`]: the start line,
//! the header block, and the untouched remainder as the body.

mod bounded;
mod error;
mod method;
mod reader;
mod request;
mod request_line;
mod tests;

// Re-export public items
pub use bounded::BoundedBody;
pub use error::Error;
pub use method::Method;
pub use reader::{parse_header_line, read_line, read_request, MAX_LINE_LENGTH};
pub use request::{Body, Headers, Iter as HeaderIter, Request, RequestBuilder};
pub use request_line::RequestLine;
