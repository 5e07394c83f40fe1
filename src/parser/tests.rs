//! Tests for the HTTP parser.

#[cfg(test)]
mod tests {
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use tokio::io::{AsyncRead, AsyncReadExt, BufReader, ReadBuf};

    use crate::parser::{read_line, read_request, Error, Method, Request, MAX_LINE_LENGTH};

    async fn parse(input: &'static [u8]) -> Result<Request, Error> {
        read_request(BufReader::new(input)).await
    }

    async fn body_string(request: &mut Request) -> String {
        let mut body = String::new();
        request
            .body_mut()
            .expect("parsed requests always carry a body handle")
            .read_to_string(&mut body)
            .await
            .unwrap();
        body
    }

    // A connection that dies after its scripted bytes.
    struct ResetReader;

    impl AsyncRead for ResetReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::from(io::ErrorKind::ConnectionReset)))
        }
    }

    #[tokio::test]
    async fn test_parse_simple_get_request() {
        let mut request = parse(b"GET / HTTP/1.1\r\nHost: foo\r\n\r\ncontent").await.unwrap();

        assert_eq!(request.request_line().method(), "GET");
        assert_eq!(request.request_line().uri(), "/");
        assert_eq!(request.request_line().http_version(), "HTTP/1.1");
        assert_eq!(request.header_values("host").unwrap(), ["foo".to_string()]);
        assert_eq!(request.first_header_value("hoSt"), Some("foo"));
        assert_eq!(request.headers().len(), 1);
        assert_eq!(body_string(&mut request).await, "content");
    }

    #[tokio::test]
    async fn test_parse_multi_value_headers() {
        let mut request = parse(
            b"PUT /create HTTP/1.1\r\ntime: never,ever\r\ncontent-encoding: gzip\r\n\r\nfoo\nbar",
        )
        .await
        .unwrap();

        assert_eq!(request.request_line().method(), "PUT");
        assert_eq!(request.request_line().uri(), "/create");
        assert_eq!(
            request.header_values("time").unwrap(),
            ["never".to_string(), "ever".to_string()]
        );
        assert_eq!(request.header_values("Content-Encoding").unwrap(), ["gzip".to_string()]);
        assert_eq!(body_string(&mut request).await, "foo\nbar");
    }

    #[tokio::test]
    async fn test_multi_values_are_trimmed_in_order() {
        let request = parse(
            b"PUT /index.html%20 HTTP/1.0\r\nHost: foo,bar\r\n\
              Date: now,tomorrow, yesterday\r\nAccept-Encoding: test\r\n\r\n",
        )
        .await
        .unwrap();

        assert_eq!(request.request_line().uri(), "/index.html%20");
        assert_eq!(request.headers().len(), 3);
        assert_eq!(
            request.header_values("host").unwrap(),
            ["foo".to_string(), "bar".to_string()]
        );
        assert_eq!(
            request.header_values("DATE").unwrap(),
            ["now".to_string(), "tomorrow".to_string(), "yesterday".to_string()]
        );
        assert_eq!(request.first_header_value("accept-encoding"), Some("test"));
    }

    #[tokio::test]
    async fn test_headers_with_surrounding_whitespace() {
        let request =
            parse(b"GET / HTTP/1.1\r\n  Host  :   example.com  \r\nUser-Agent:test\r\n\r\n")
                .await
                .unwrap();

        assert_eq!(request.first_header_value("host"), Some("example.com"));
        assert_eq!(request.first_header_value("user-agent"), Some("test"));
    }

    #[tokio::test]
    async fn test_headers_with_multiple_colons() {
        let request =
            parse(b"GET / HTTP/1.1\r\nHost: localhost:8080\r\nX-Test: value:with:colons\r\n\r\n")
                .await
                .unwrap();

        assert_eq!(request.first_header_value("host"), Some("localhost:8080"));
        assert_eq!(request.first_header_value("x-test"), Some("value:with:colons"));
    }

    #[tokio::test]
    async fn test_empty_header_value() {
        let request = parse(b"GET / HTTP/1.1\r\nX-Empty:\r\n\r\n").await.unwrap();
        assert_eq!(request.header_values("x-empty").unwrap(), [String::new()]);
    }

    #[tokio::test]
    async fn test_duplicate_headers() {
        let request = parse(b"GET / HTTP/1.1\r\nX-Test: value1\r\nx-test: value2\r\n\r\n")
            .await
            .unwrap();

        // The later line replaces the earlier one
        assert_eq!(request.header_values("X-Test").unwrap(), ["value2".to_string()]);
    }

    #[tokio::test]
    async fn test_no_headers() {
        let mut request = parse(b"DELETE /thing HTTP/1.1\r\n\r\n").await.unwrap();

        assert_eq!(request.request_line().known_method(), Some(Method::DELETE));
        assert!(request.headers().is_empty());
        assert_eq!(body_string(&mut request).await, "");
    }

    #[tokio::test]
    async fn test_unknown_method_parses() {
        let request = parse(b"WAT /x HTTP/1.1\r\n\r\n").await.unwrap();

        assert_eq!(request.request_line().method(), "WAT");
        assert_eq!(request.request_line().known_method(), None);
    }

    #[tokio::test]
    async fn test_malformed_start_line() {
        let result = parse(b"GET\r\nHost: localhost\r\n\r\n").await;
        assert!(matches!(result, Err(Error::MalformedStartLine(ref l)) if l == "GET"));

        let result = parse(b"GET  /path  HTTP/1.1\r\n\r\n").await;
        assert!(matches!(result, Err(Error::MalformedStartLine(_))));
    }

    #[tokio::test]
    async fn test_empty_request() {
        let result = parse(b"").await;
        assert!(matches!(result, Err(Error::MalformedStartLine(ref l)) if l.is_empty()));
    }

    #[tokio::test]
    async fn test_header_without_separator() {
        let result = parse(b"GET / HTTP/1.1\r\nInvalidHeader\r\nHost: localhost\r\n\r\n").await;
        assert!(matches!(
            result,
            Err(Error::MissingHeaderSeparator(ref l)) if l == "InvalidHeader"
        ));
    }

    #[tokio::test]
    async fn test_lone_line_feed_is_not_a_terminator() {
        let request = parse(b"GET / HTTP/1.1\r\nX-A: one\nX-B: two\r\n\r\n").await.unwrap();

        assert_eq!(request.first_header_value("x-a"), Some("one\nX-B: two"));
        assert!(!request.headers().contains("x-b"));
    }

    #[tokio::test]
    async fn test_non_utf8_bytes_decode_as_latin1() {
        let request = parse(b"GET / HTTP/1.1\r\nX-Test: caf\xE9\r\n\r\n").await.unwrap();
        assert_eq!(request.first_header_value("x-test"), Some("caf\u{e9}"));
    }

    #[tokio::test]
    async fn test_latin1_header_names_fold_case() {
        let request = parse(b"GET / HTTP/1.1\r\n\xC9TAG: 1\r\n\r\n").await.unwrap();

        assert!(request.headers().contains("\u{e9}tag"));
        assert_eq!(request.first_header_value("\u{c9}Tag"), Some("1"));
    }

    #[tokio::test]
    async fn test_body_is_not_over_read() {
        // A tiny buffer forces the header block to span many refills.
        let input: &'static [u8] = b"POST /submit HTTP/1.1\r\nContent-Length: 5\r\n\r\nhelloNEXT";
        let mut request = read_request(BufReader::with_capacity(3, input)).await.unwrap();

        assert_eq!(request.content_length(), Some(5));
        assert_eq!(request.read_body_to_end().await.unwrap(), b"hello");
        assert_eq!(body_string(&mut request).await, "NEXT");
    }

    #[tokio::test]
    async fn test_io_error_while_reading_headers() {
        let reader = BufReader::new((&b"GET / HTTP/1.1\r\nHo"[..]).chain(ResetReader));
        let result = read_request(reader).await;

        assert!(
            matches!(result, Err(Error::Io(ref e)) if e.kind() == io::ErrorKind::ConnectionReset)
        );
    }

    #[tokio::test]
    async fn test_read_line_edge_cases() {
        let mut reader = BufReader::new(&b"a\rb\r\r\n\r\ntail\r"[..]);

        assert_eq!(read_line(&mut reader).await.unwrap(), "a\rb\r");
        assert_eq!(read_line(&mut reader).await.unwrap(), "");
        // End-of-stream ends the final line, keeping a dangling CR.
        assert_eq!(read_line(&mut reader).await.unwrap(), "tail\r");
        assert_eq!(read_line(&mut reader).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_line_length_is_capped() {
        let mut exact = vec![b'a'; MAX_LINE_LENGTH];
        exact.extend_from_slice(b"\r\n");
        let mut reader = BufReader::new(&exact[..]);
        assert_eq!(read_line(&mut reader).await.unwrap().len(), MAX_LINE_LENGTH);

        // A peer that never terminates its line.
        let endless = vec![b'a'; MAX_LINE_LENGTH * 4];
        let mut reader = BufReader::new(&endless[..]);
        assert!(matches!(
            read_line(&mut reader).await,
            Err(Error::LineTooLong(limit)) if limit == MAX_LINE_LENGTH
        ));
    }

    #[tokio::test]
    async fn test_oversized_header_fails_the_request() {
        let header = "x".repeat(MAX_LINE_LENGTH + 1);
        let input = format!("GET / HTTP/1.1\r\nX-Big: {header}\r\n\r\n");
        let result = read_request(BufReader::new(io::Cursor::new(input.into_bytes()))).await;

        assert!(matches!(result, Err(Error::LineTooLong(_))));
    }

    #[test]
    fn test_method_from_str_is_case_insensitive() {
        let methods = vec![
            ("GET", Method::GET),
            ("post", Method::POST),
            ("Put", Method::PUT),
            ("DELETE", Method::DELETE),
            ("head", Method::HEAD),
            ("OPTIONS", Method::OPTIONS),
            ("trace", Method::TRACE),
        ];

        for (token, expected) in methods {
            assert_eq!(token.parse::<Method>().unwrap(), expected);
        }

        assert!(matches!(
            "PATCH".parse::<Method>(),
            Err(Error::UnknownMethod(ref m)) if m == "PATCH"
        ));
    }

    #[test]
    fn test_method_display() {
        assert_eq!(Method::GET.to_string(), "GET");
        assert_eq!(Method::POST.to_string(), "POST");
        assert_eq!(Method::PUT.to_string(), "PUT");
        assert_eq!(Method::DELETE.to_string(), "DELETE");
        assert_eq!(Method::HEAD.to_string(), "HEAD");
        assert_eq!(Method::OPTIONS.to_string(), "OPTIONS");
        assert_eq!(Method::TRACE.to_string(), "TRACE");
    }
}
