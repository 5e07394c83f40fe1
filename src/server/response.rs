//! The write-once HTTP response.

use std::fmt;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;
use serde::Serialize;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::parser::Body;
use crate::server::error::Error;
use crate::server::status::StatusLine;

/// Where a response is written: the write side of a connection.
pub type Output = Box<dyn AsyncWrite + Send + Sync + Unpin>;

const CRLF: &[u8] = b"\r\n";
const BODY_CHUNK_SIZE: usize = 4096;

/// An HTTP response bound to a connection's output.
///
/// Status line, headers and body are collected first and written in one
/// [`flush`](Response::flush). Bytes on a live socket cannot be taken back,
/// so once flushed the response is frozen: every mutator fails with
/// [`Error::AlreadyFlushed`] and further flushes do nothing.
pub struct Response {
    out: Output,
    status_line: Option<StatusLine>,
    headers: Vec<(String, Vec<String>)>,
    body: Option<Body>,
    flushed: AtomicBool,
}

impl Response {
    /// Create an empty response that will be written to `out`.
    pub fn new(out: impl AsyncWrite + Send + Sync + Unpin + 'static) -> Self {
        Self {
            out: Box::new(out),
            status_line: None,
            headers: Vec::new(),
            body: None,
            flushed: AtomicBool::new(false),
        }
    }

    pub fn is_flushed(&self) -> bool {
        self.flushed.load(Ordering::Acquire)
    }

    fn ensure_unflushed(&self) -> Result<(), Error> {
        if self.is_flushed() {
            return Err(Error::AlreadyFlushed);
        }
        Ok(())
    }

    pub fn status_line(&self) -> Option<&StatusLine> {
        self.status_line.as_ref()
    }

    /// Set the status line, replacing any earlier one.
    pub fn set_status_line(&mut self, status_line: impl Into<StatusLine>) -> Result<(), Error> {
        self.ensure_unflushed()?;
        self.status_line = Some(status_line.into());
        Ok(())
    }

    /// The values queued for a header name (matched exactly).
    pub fn header_values(&self, name: &str) -> Option<&[String]> {
        self.headers
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Append a value to a header, creating it at the end of the header
    /// list if it is new.
    pub fn add_header(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), Error> {
        self.ensure_unflushed()?;
        let name = name.into();
        let value = value.into();

        match self.headers.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, values)) => values.push(value),
            None => self.headers.push((name, vec![value])),
        }
        Ok(())
    }

    /// Replace a header's values with a single value. An existing header
    /// keeps its position.
    pub fn set_header(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), Error> {
        self.ensure_unflushed()?;
        let name = name.into();
        let value = value.into();

        match self.headers.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, values)) => *values = vec![value],
            None => self.headers.push((name, vec![value])),
        }
        Ok(())
    }

    pub fn clear_all_headers(&mut self) -> Result<(), Error> {
        self.ensure_unflushed()?;
        self.headers.clear();
        Ok(())
    }

    /// Set or clear the body source.
    pub fn set_body(&mut self, body: Option<Body>) -> Result<(), Error> {
        self.ensure_unflushed()?;
        self.body = body;
        Ok(())
    }

    /// Use an in-memory body and set `Content-Length` to match.
    pub fn set_body_bytes(&mut self, bytes: impl Into<Vec<u8>>) -> Result<(), Error> {
        let bytes = bytes.into();
        self.set_header("Content-Length", bytes.len().to_string())?;
        self.set_body(Some(Box::new(Cursor::new(bytes))))
    }

    /// Serialize `value` as the JSON body.
    pub fn set_json_body<T: Serialize>(&mut self, value: &T) -> Result<(), Error> {
        let json = serde_json::to_vec(value)?;
        self.set_header("Content-Type", "application/json")?;
        self.set_body_bytes(json)
    }

    /// Write the response to the connection.
    ///
    /// The first successful call writes the status line, the headers in
    /// insertion order and, if there is one, a blank line followed by the
    /// body, after which the output is shut down. Later calls are no-ops.
    pub async fn flush(&mut self) -> Result<(), Error> {
        if self.is_flushed() {
            debug!("Ignoring flush of an already flushed response");
            return Ok(());
        }

        let status_line = self.status_line.as_ref().ok_or(Error::MissingStatusLine)?;

        if self
            .flushed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Ignoring flush of an already flushed response");
            return Ok(());
        }

        let mut head = Vec::new();
        head.extend_from_slice(status_line.to_string().as_bytes());
        head.extend_from_slice(CRLF);
        for (name, values) in &self.headers {
            head.extend_from_slice(format!("{name}: {}", values.join(",")).as_bytes());
            head.extend_from_slice(CRLF);
        }
        self.out.write_all(&head).await?;

        match self.body.take() {
            Some(mut body) => {
                self.out.write_all(CRLF).await?;
                let mut chunk = vec![0u8; BODY_CHUNK_SIZE];
                loop {
                    let n = body.read(&mut chunk).await?;
                    if n == 0 {
                        break;
                    }
                    self.out.write_all(&chunk[..n]).await?;
                }
                self.out.flush().await?;
                self.out.shutdown().await?;
            }
            None => self.out.flush().await?,
        }

        Ok(())
    }

    /// Shut down the output, flushed or not.
    pub async fn close(&mut self) -> std::io::Result<()> {
        self.out.shutdown().await
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status_line", &self.status_line)
            .field("headers", &self.headers)
            .field("body", &self.body.as_ref().map(|_| "<stream>"))
            .field("flushed", &self.is_flushed())
            .finish()
    }
}
