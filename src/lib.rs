//! A minimal HTTP/1.1 server engine.
//!
//! casual-http owns the boring parts of serving HTTP: the accept loop,
//! per-connection socket tuning, streaming request parsing, and a write-once
//! response. What to answer is up to a [`Handler`], which gets one hook per
//! HTTP method and answers `405` for anything it does not override.
//!
//! # Features
//!
//! - Streaming request parsing that never reads past the header block
//! - Case-insensitive, multi-valued request headers
//! - Responses that refuse edits once bytes have hit the wire
//! - Socket options resolved once per server and applied to every connection
//! - Inline, spawn-per-connection, and worker pool execution strategies
//! - JSON request and response bodies
//! - Static file serving with content types guessed from extensions
//!
//! One request is served per connection; the connection is closed afterwards.
//!
//! # Examples
//!
//! ## A handler
//!
//! ```no_run
//! use async_trait::async_trait;
//! use casual_http::{
//!     Handler, HttpServer, Request, Response, ServerConfig, ServerError, Spawn, StatusCode,
//! };
//!
//! struct Hello;
//!
//! #[async_trait]
//! impl Handler for Hello {
//!     async fn on_get(
//!         &self,
//!         _request: Request,
//!         response: &mut Response,
//!     ) -> Result<(), ServerError> {
//!         response.set_status_line(StatusCode::Ok)?;
//!         response.add_header("Content-Type", "text/plain")?;
//!         response.set_body_bytes("Hello, world!")?;
//!         response.flush().await
//!     }
//! }
//!
//! # async fn run() -> Result<(), ServerError> {
//! let server = HttpServer::new(ServerConfig::for_port(8080), Hello, Spawn);
//! server.start().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Parsing a request
//!
//! ```
//! use casual_http::{read_request, ParserError};
//! use tokio::io::BufReader;
//!
//! # async fn parse() -> Result<(), ParserError> {
//! let raw: &'static [u8] = b"GET /index.html HTTP/1.1\r\nAccept: text/html, text/plain\r\n\r\n";
//! let request = read_request(BufReader::new(raw)).await?;
//!
//! assert_eq!(request.request_line().uri(), "/index.html");
//! assert_eq!(request.header_values("ACCEPT").unwrap(), ["text/html", "text/plain"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Socket options
//!
//! ```
//! use std::time::Duration;
//! use casual_http::{ServerConfig, SocketConfig};
//!
//! let config = ServerConfig::for_port(8080).with_socket(
//!     SocketConfig::builder()
//!         .tcp_no_delay(true)
//!         .socket_timeout(Duration::from_secs(30))
//!         .build(),
//! );
//! assert_eq!(config.socket.socket_timeout_millis, Some(30_000));
//! ```
//!
//! See the `demos` directory for complete servers.

// Export the parser module
pub mod parser;

// Export the server module
pub mod server;

// Export the handler toolkit
pub mod toolkit;

// Re-export commonly used items for convenience
pub use parser::{
    read_request, Body, BoundedBody, Error as ParserError, Headers, Method, Request, RequestLine,
};
pub use server::{
    Error as ServerError, Executor, Handler, HttpServer, Inline, Response, ServerConfig,
    SocketConfig, Spawn, StatusCode, StatusLine, WorkerPool,
};
