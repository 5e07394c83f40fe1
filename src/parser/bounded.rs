//! A body stream that ends after a fixed number of bytes.

use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

/// Wraps a byte source and reports end-of-stream once `limit` bytes have
/// been delivered, however much the source still holds.
///
/// A connection has no natural end until the peer closes it, so a handler
/// that wants "the body" reads through one of these sized by
/// `Content-Length`. The wrapper never shuts down or closes the delegate.
#[derive(Debug)]
pub struct BoundedBody<R> {
    inner: R,
    limit: u64,
    read: u64,
}

impl<R> BoundedBody<R> {
    /// Bound `inner` to at most `limit` bytes.
    pub fn new(inner: R, limit: u64) -> Self {
        Self {
            inner,
            limit,
            read: 0,
        }
    }

    /// Bytes still allowed before end-of-stream.
    pub fn remaining(&self) -> u64 {
        self.limit - self.read
    }

    /// Bytes delivered so far.
    pub fn bytes_read(&self) -> u64 {
        self.read
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Give the delegate back, positioned just past the bytes delivered.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for BoundedBody<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();

        let remaining = this.remaining();
        if remaining == 0 || buf.remaining() == 0 {
            return Poll::Ready(Ok(()));
        }

        let max = usize::try_from(remaining)
            .unwrap_or(usize::MAX)
            .min(buf.remaining());

        let n = {
            let dst = buf.initialize_unfilled_to(max);
            let mut clipped = ReadBuf::new(dst);
            ready!(Pin::new(&mut this.inner).poll_read(cx, &mut clipped))?;
            clipped.filled().len()
        };

        buf.advance(n);
        this.read += n as u64;
        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_stops_at_limit() {
        let source: &[u8] = b"hello world, and then some";
        let mut body = BoundedBody::new(source, 5);

        let mut out = Vec::new();
        body.read_to_end(&mut out).await.unwrap();

        assert_eq!(out, b"hello");
        assert_eq!(body.bytes_read(), 5);
        assert_eq!(body.remaining(), 0);

        // Still at end-of-stream, and the delegate was left untouched.
        let mut buf = [0u8; 8];
        assert_eq!(body.read(&mut buf).await.unwrap(), 0);
        assert_eq!(body.into_inner(), b" world, and then some");
    }

    #[tokio::test]
    async fn test_small_reads_never_exceed_limit() {
        let source: &[u8] = b"0123456789";
        let mut body = BoundedBody::new(source, 7);

        let mut total = Vec::new();
        let mut buf = [0u8; 3];
        loop {
            let n = body.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            total.extend_from_slice(&buf[..n]);
        }

        assert_eq!(total, b"0123456");
    }

    #[tokio::test]
    async fn test_delegate_shorter_than_limit() {
        let source: &[u8] = b"abc";
        let mut body = BoundedBody::new(source, 100);

        let mut out = Vec::new();
        body.read_to_end(&mut out).await.unwrap();

        assert_eq!(out, b"abc");
        assert_eq!(body.remaining(), 97);
    }

    #[tokio::test]
    async fn test_zero_limit() {
        let source: &[u8] = b"abc";
        let mut body = BoundedBody::new(source, 0);

        let mut out = Vec::new();
        assert_eq!(body.read_to_end(&mut out).await.unwrap(), 0);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_borrowed_delegate() {
        let mut source: &[u8] = b"headbody";
        {
            let mut body = BoundedBody::new(&mut source, 4);
            let mut out = String::new();
            body.read_to_string(&mut out).await.unwrap();
            assert_eq!(out, "head");
        }
        assert_eq!(source, b"body");
    }
}
