//! Reading a request off a connection.
//!
//! The start line and headers are consumed one byte at a time from a
//! buffered reader so that the read stops exactly at the blank line. Whatever
//! follows, including bytes already sitting in the buffer, stays in the
//! reader and becomes the request body.

use tokio::io::{AsyncBufRead, AsyncReadExt};

use crate::parser::error::Error;
use crate::parser::request::{Body, Request};
use crate::parser::request_line::RequestLine;

const CARRIAGE_RETURN: u8 = b'\r';
const LINE_FEED: u8 = b'\n';

/// Longest start or header line accepted, terminator excluded.
pub const MAX_LINE_LENGTH: usize = 8 * 1024;

/// Read a request from `reader`, which is kept as the request body.
pub async fn read_request<R>(mut reader: R) -> Result<Request, Error>
where
    R: AsyncBufRead + Send + Sync + Unpin + 'static,
{
    let request_line: RequestLine = read_line(&mut reader).await?.parse()?;
    let mut builder = Request::builder(request_line);

    loop {
        let line = read_line(&mut reader).await?;
        if line.is_empty() {
            break;
        }

        let (name, values) = parse_header_line(&line)?;
        builder.set_header(name, values);
    }

    let body: Body = Box::new(reader);
    builder.set_body(Some(body));
    Ok(builder.build())
}

/// Read one CR LF terminated line, without the terminator.
///
/// Bytes map directly to chars (Latin-1). End-of-stream ends the line with
/// whatever was read so far. A line longer than [`MAX_LINE_LENGTH`] fails
/// with [`Error::LineTooLong`].
pub async fn read_line<R>(reader: &mut R) -> Result<String, Error>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    let mut line = String::new();
    let mut pending_cr = false;
    let mut length = 0;

    loop {
        let byte = match reader.read_u8().await {
            Ok(byte) => byte,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        };

        if pending_cr {
            if byte == LINE_FEED {
                return Ok(line);
            }
            line.push(CARRIAGE_RETURN as char);
        }

        pending_cr = byte == CARRIAGE_RETURN;
        if !pending_cr {
            line.push(byte as char);
        }

        length += 1;
        if length > MAX_LINE_LENGTH + usize::from(pending_cr) {
            return Err(Error::LineTooLong(MAX_LINE_LENGTH));
        }
    }

    if pending_cr {
        line.push(CARRIAGE_RETURN as char);
    }
    Ok(line)
}

/// Split `Name: v1, v2` into the trimmed name and its trimmed values.
pub fn parse_header_line(line: &str) -> Result<(&str, Vec<String>), Error> {
    let (name, value_section) = line
        .split_once(':')
        .ok_or_else(|| Error::MissingHeaderSeparator(line.to_string()))?;

    let values = value_section
        .split(',')
        .map(|value| value.trim().to_string())
        .collect();

    Ok((name.trim(), values))
}
