//! HTTP message head encoder
//!
//! Serializes a start line, version and header block into wire bytes: the
//! start line terminated by CRLF, each header as `name: value` CRLF in
//! insertion order, then the terminating empty line. The encoder writes
//! exactly what it is given: it never injects or rewrites framing headers,
//! so a caller that sets a body is responsible for a matching
//! `Content-Length`.

use crate::protocol::{SendError, StartLine};

use bytes::{BufMut, BytesMut};
use http::{HeaderMap, Version};
use std::io;
use std::io::Write;
use tokio_util::codec::Encoder;

/// Initial buffer size reserved for head serialization
const INIT_HEAD_SIZE: usize = 4 * 1024;

/// Encoder for HTTP message heads implementing the [`Encoder`] trait.
///
/// Stateless and deterministic: encoding the same head twice produces
/// byte-identical output.
#[derive(Debug, Default)]
pub struct HeadEncoder;

impl<'a> Encoder<(&'a StartLine, Version, &'a HeaderMap)> for HeadEncoder {
    type Error = SendError;

    /// Encodes a message head into the provided buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP version is not 1.0 or 1.1.
    fn encode(&mut self, item: (&'a StartLine, Version, &'a HeaderMap), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (start, version, headers) = item;

        let version_token = match version {
            Version::HTTP_10 => "HTTP/1.0",
            Version::HTTP_11 => "HTTP/1.1",
            v => return Err(SendError::unsupported_version(v)),
        };

        dst.reserve(INIT_HEAD_SIZE);
        match start {
            StartLine::Request { method, uri } => {
                write!(FastWrite(dst), "{method} {uri} {version_token}\r\n")?;
            }
            StartLine::Status { code, reason } => {
                write!(FastWrite(dst), "{version_token} {} {reason}\r\n", code.as_str())?;
            }
        }

        for (header_name, header_value) in headers.iter() {
            dst.put_slice(header_name.as_ref());
            dst.put_slice(b": ");
            dst.put_slice(header_value.as_ref());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

/// Fast writer implementation for writing to BytesMut.
///
/// Avoids unnecessary bounds checking when writing to the bytes buffer,
/// since enough space has already been reserved.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderName, HeaderValue, Method, StatusCode, Uri};

    #[test]
    fn encode_request_line() {
        let start = StartLine::Request { method: Method::POST, uri: "/session/42/element".parse::<Uri>().unwrap() };

        let mut headers = HeaderMap::new();
        headers.insert(http::header::HOST, HeaderValue::from_static("localhost:8100"));
        headers.insert(http::header::CONTENT_LENGTH, HeaderValue::from_static("2"));

        let mut dst = BytesMut::new();
        HeadEncoder.encode((&start, Version::HTTP_11, &headers), &mut dst).unwrap();

        assert_eq!(&dst[..], &b"POST /session/42/element HTTP/1.1\r\nhost: localhost:8100\r\ncontent-length: 2\r\n\r\n"[..]);
    }

    #[test]
    fn encode_status_line() {
        let start = StartLine::Status { code: StatusCode::NOT_FOUND, reason: "Not Found".to_string() };

        let mut dst = BytesMut::new();
        HeadEncoder.encode((&start, Version::HTTP_11, &HeaderMap::new()), &mut dst).unwrap();

        assert_eq!(&dst[..], &b"HTTP/1.1 404 Not Found\r\n\r\n"[..]);
    }

    #[test]
    fn encode_preserves_insertion_order() {
        let start = StartLine::Status { code: StatusCode::OK, reason: "OK".to_string() };

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("x-first"), HeaderValue::from_static("1"));
        headers.insert(HeaderName::from_static("x-second"), HeaderValue::from_static("2"));
        headers.insert(HeaderName::from_static("x-third"), HeaderValue::from_static("3"));

        let mut dst = BytesMut::new();
        HeadEncoder.encode((&start, Version::HTTP_10, &headers), &mut dst).unwrap();

        assert_eq!(&dst[..], &b"HTTP/1.0 200 OK\r\nx-first: 1\r\nx-second: 2\r\nx-third: 3\r\n\r\n"[..]);
    }

    #[test]
    fn rejects_unsupported_version() {
        let start = StartLine::Status { code: StatusCode::OK, reason: "OK".to_string() };

        let mut dst = BytesMut::new();
        let err = HeadEncoder.encode((&start, Version::HTTP_2, &HeaderMap::new()), &mut dst).unwrap_err();

        assert!(matches!(err, SendError::UnsupportedVersion { .. }));
    }
}
