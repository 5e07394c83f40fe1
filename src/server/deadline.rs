//! Read/write timeouts for connection streams.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::time::{sleep, Sleep};

type Timer = Option<Pin<Box<Sleep>>>;

/// A stream whose reads and writes fail with [`io::ErrorKind::TimedOut`]
/// when they stay pending longer than the timeout.
///
/// The clock starts when an operation first returns `Pending` and is
/// cleared whenever one completes, so the timeout bounds each stall rather
/// than the whole connection. Reads and writes are timed separately.
#[derive(Debug)]
pub struct Deadline<S> {
    inner: S,
    timeout: Option<Duration>,
    read_timer: Timer,
    write_timer: Timer,
}

impl<S> Deadline<S> {
    /// Wrap `inner`. A `None` timeout never expires.
    pub fn new(inner: S, timeout: Option<Duration>) -> Self {
        Self {
            inner,
            timeout,
            read_timer: None,
            write_timer: None,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

/// Poll the stall timer for a pending operation, arming it on first use.
fn poll_expired(
    timer: &mut Timer,
    timeout: Option<Duration>,
    cx: &mut Context<'_>,
    op: &str,
) -> Poll<io::Error> {
    let Some(timeout) = timeout else {
        return Poll::Pending;
    };

    let sleep = timer.get_or_insert_with(|| Box::pin(sleep(timeout)));
    ready!(sleep.as_mut().poll(cx));
    *timer = None;
    Poll::Ready(io::Error::new(
        io::ErrorKind::TimedOut,
        format!("{op} timed out after {}ms", timeout.as_millis()),
    ))
}

impl<S: AsyncRead + Unpin> AsyncRead for Deadline<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_read(cx, buf) {
            Poll::Ready(result) => {
                this.read_timer = None;
                Poll::Ready(result)
            }
            Poll::Pending => poll_expired(&mut this.read_timer, this.timeout, cx, "read").map(Err),
        }
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for Deadline<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_write(cx, buf) {
            Poll::Ready(result) => {
                this.write_timer = None;
                Poll::Ready(result)
            }
            Poll::Pending => {
                poll_expired(&mut this.write_timer, this.timeout, cx, "write").map(Err)
            }
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_flush(cx) {
            Poll::Ready(result) => {
                this.write_timer = None;
                Poll::Ready(result)
            }
            Poll::Pending => {
                poll_expired(&mut this.write_timer, this.timeout, cx, "flush").map(Err)
            }
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_shutdown(cx) {
            Poll::Ready(result) => {
                this.write_timer = None;
                Poll::Ready(result)
            }
            Poll::Pending => {
                poll_expired(&mut this.write_timer, this.timeout, cx, "shutdown").map(Err)
            }
        }
    }
}
