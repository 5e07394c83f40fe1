//! Helpers for writing handlers.

mod files;

pub use files::{content_type_for, resolve_path, serve_file, serve_file_with_type};
