//! HTTP server implementation for casual-http.
//!
//! The accept loop, per-connection socket tuning, the write-once
//! [`Response`], and the [`Handler`] hooks requests are dispatched to.

mod config;
mod deadline;
mod error;
mod executor;
mod handler;
mod http_server;
mod response;
mod socket;
mod status;

// Re-export public items
pub use config::{ServerConfig, SocketConfig, SocketConfigBuilder};
pub use deadline::Deadline;
pub use error::Error;
pub use executor::{Executor, Inline, Spawn, Work, WorkerPool};
pub use handler::{dispatch, Handler};
pub use http_server::{handle_connection, HttpServer};
pub use response::{Output, Response};
pub use socket::{ResolvedSocketSettings, SocketConfigResolver, TunableSocket};
pub use status::{StatusCode, StatusLine, HTTP_1_1};
