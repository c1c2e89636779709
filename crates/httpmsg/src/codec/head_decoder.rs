//! HTTP message head decoder
//!
//! This module decodes the head of an HTTP message (start line plus header
//! block) from raw bytes into a structured [`MessageHead`]. It handles both
//! message shapes: a request line (`METHOD SP URI SP VERSION`) and a status
//! line (`VERSION SP CODE SP REASON`), distinguished by sniffing whether the
//! first token of the stream is an HTTP version token.
//!
//! # Limits
//!
//! - Maximum number of headers: 64
//! - Maximum header size: 8KB
//! - Only HTTP/1.0 and HTTP/1.1
//!
//! # Implementation Details
//!
//! The decoder works in multiple stages:
//!
//! 1. Sniff request line vs status line from the first bytes
//! 2. Parse raw bytes using `httparse` (bare-LF line endings are tolerated,
//!    matching common server leniency)
//! 3. Resolve everything fallible (version, start-line fields, body framing)
//!    while the source buffer is still untouched, so a failed decode never
//!    consumes input
//! 4. Record header name/value byte ranges, split the head off the buffer and
//!    materialize a `HeaderMap` from the frozen bytes without copying values
//!
//! Duplicate header names overwrite: this engine models headers as a
//! single-value, case-insensitive, insertion-ordered mapping.

use std::cmp;
use std::mem::MaybeUninit;

use bytes::BytesMut;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri, Version};
use httparse::{Error, Status};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;

use crate::protocol::{MessageHead, ParseError, PayloadSize, StartLine};

/// Maximum number of headers allowed in a message head
const MAX_HEADER_NUM: usize = 64;

/// Maximum size in bytes allowed for the entire head section
const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Decoder for HTTP message heads implementing the [`Decoder`] trait.
///
/// Produces a [`MessageHead`] together with the [`PayloadSize`] declared by its
/// framing headers. The decoder is stateless: it re-examines the accumulated
/// buffer on every call until the CRLF-CRLF terminator has arrived, then
/// consumes exactly the head bytes, leaving any body bytes in the buffer.
#[derive(Debug, Default)]
pub struct HeadDecoder;

impl Decoder for HeadDecoder {
    type Item = (MessageHead, PayloadSize);
    type Error = ParseError;

    /// Attempts to decode a message head from the provided buffer.
    ///
    /// # Returns
    ///
    /// - `Ok(Some((head, payload_size)))` if a complete head was parsed
    /// - `Ok(None)` if more data is needed
    /// - `Err(ParseError)` if parsing failed; the buffer is left unconsumed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match sniff_status_line(src) {
            Some(true) => decode_status(src),
            Some(false) => decode_request(src),
            // not enough bytes yet to tell a request line from a status line
            None => Ok(None),
        }
    }
}

/// Determines whether the stream starts with a status line.
///
/// A status line begins with an HTTP version token; a request line begins with
/// a method token, which can never contain `/`. Returns `None` when the buffer
/// is still a proper prefix of `HTTP/` and the answer is not yet knowable.
fn sniff_status_line(src: &[u8]) -> Option<bool> {
    const VERSION_PREFIX: &[u8] = b"HTTP/";

    let n = cmp::min(src.len(), VERSION_PREFIX.len());
    if src[..n] != VERSION_PREFIX[..n] {
        return Some(false);
    }
    (src.len() >= VERSION_PREFIX.len()).then_some(true)
}

fn decode_request(src: &mut BytesMut) -> Result<Option<(MessageHead, PayloadSize)>, ParseError> {
    let mut req = httparse::Request::new(&mut []);
    let mut headers: [MaybeUninit<httparse::Header>; MAX_HEADER_NUM] = unsafe { MaybeUninit::uninit().assume_init() };

    let parsed_result = req.parse_with_uninit_headers(src, &mut headers).map_err(map_httparse_error);

    match parsed_result? {
        Status::Complete(body_offset) => {
            trace!(body_offset, "parsed request head");
            ensure!(body_offset <= MAX_HEADER_BYTES, ParseError::too_large_header(body_offset, MAX_HEADER_BYTES));

            let header_count = req.headers.len();
            ensure!(header_count <= MAX_HEADER_NUM, ParseError::too_many_headers(MAX_HEADER_NUM));

            // Resolve all fallible fields before consuming a single byte,
            // so a failed decode leaves the buffer exactly as it was
            let version = parse_version(req.version)?;

            let method = req.method.ok_or_else(|| ParseError::invalid_start_line("missing method"))?;
            let method = Method::from_bytes(method.as_bytes()).map_err(ParseError::invalid_start_line)?;

            let uri = req.path.ok_or_else(|| ParseError::invalid_start_line("missing uri"))?;
            let uri = uri.parse::<Uri>().map_err(ParseError::invalid_start_line)?;

            let payload_size = parse_payload_size(req.headers)?;

            let mut header_index: [HeaderIndex; MAX_HEADER_NUM] = EMPTY_HEADER_INDEX_ARRAY;
            HeaderIndex::record(src, req.headers, &mut header_index);

            let headers = materialize_headers(src, body_offset, &header_index[..header_count]);

            Ok(Some((MessageHead { start: StartLine::Request { method, uri }, version, headers }, payload_size)))
        }
        Status::Partial => {
            ensure!(src.len() <= MAX_HEADER_BYTES, ParseError::too_large_header(src.len(), MAX_HEADER_BYTES));
            Ok(None)
        }
    }
}

fn decode_status(src: &mut BytesMut) -> Result<Option<(MessageHead, PayloadSize)>, ParseError> {
    // httparse exposes the uninit-headers fast path only for requests
    let mut header_storage = [httparse::EMPTY_HEADER; MAX_HEADER_NUM];
    let mut res = httparse::Response::new(&mut header_storage);

    let parsed_result = res.parse(src).map_err(map_httparse_error);

    match parsed_result? {
        Status::Complete(body_offset) => {
            trace!(body_offset, "parsed status head");
            ensure!(body_offset <= MAX_HEADER_BYTES, ParseError::too_large_header(body_offset, MAX_HEADER_BYTES));

            let header_count = res.headers.len();
            ensure!(header_count <= MAX_HEADER_NUM, ParseError::too_many_headers(MAX_HEADER_NUM));

            let version = parse_version(res.version)?;

            let code = res.code.ok_or_else(|| ParseError::invalid_start_line("missing status code"))?;
            let code = StatusCode::from_u16(code).map_err(ParseError::invalid_start_line)?;

            let reason = res.reason.unwrap_or("").to_string();

            let payload_size = parse_payload_size(res.headers)?;

            let mut header_index: [HeaderIndex; MAX_HEADER_NUM] = EMPTY_HEADER_INDEX_ARRAY;
            HeaderIndex::record(src, res.headers, &mut header_index);

            let headers = materialize_headers(src, body_offset, &header_index[..header_count]);

            Ok(Some((MessageHead { start: StartLine::Status { code, reason }, version, headers }, payload_size)))
        }
        Status::Partial => {
            ensure!(src.len() <= MAX_HEADER_BYTES, ParseError::too_large_header(src.len(), MAX_HEADER_BYTES));
            Ok(None)
        }
    }
}

/// Maps httparse errors onto the engine's error kinds: header grammar failures
/// are header errors, everything else failed while reading the start line.
fn map_httparse_error(e: Error) -> ParseError {
    match e {
        Error::TooManyHeaders => ParseError::too_many_headers(MAX_HEADER_NUM),
        Error::HeaderName | Error::HeaderValue => ParseError::invalid_header(e),
        e => ParseError::invalid_start_line(e),
    }
}

fn parse_version(version: Option<u8>) -> Result<Version, ParseError> {
    match version {
        Some(0) => Ok(Version::HTTP_10),
        Some(1) => Ok(Version::HTTP_11),
        // HTTP/2 and HTTP/3 not supported
        v => Err(ParseError::invalid_start_line(format!("unsupported http version token: {v:?}"))),
    }
}

/// Determines the declared body size from the framing headers.
///
/// `Content-Length` is the only framing header given semantic meaning; absent
/// any, the body is empty. Chunked transfer encoding is not supported, so a
/// `Transfer-Encoding` header carries no framing weight here. When the header
/// is repeated the last occurrence wins, consistent with the engine's
/// overwrite-on-duplicate header semantics.
fn parse_payload_size(headers: &[httparse::Header<'_>]) -> Result<PayloadSize, ParseError> {
    let mut declared = None;
    for header in headers {
        if header.name.eq_ignore_ascii_case("content-length") {
            declared = Some(header.value);
        }
    }

    match declared {
        None => Ok(PayloadSize::Empty),
        Some(value) => {
            let cl_str =
                std::str::from_utf8(value).map_err(|_| ParseError::invalid_content_length("value is not valid utf8"))?;

            let length = cl_str
                .trim()
                .parse::<u64>()
                .map_err(|_| ParseError::invalid_content_length(format!("value {cl_str} is not u64")))?;

            Ok(PayloadSize::Length(length))
        }
    }
}

/// Splits the head off the source buffer and builds the header mapping from
/// the frozen bytes. Infallible: every index was validated by httparse.
fn materialize_headers(src: &mut BytesMut, body_offset: usize, indices: &[HeaderIndex]) -> HeaderMap {
    let header_bytes = src.split_to(body_offset).freeze();

    let mut headers = HeaderMap::with_capacity(indices.len());
    for index in indices {
        // Safe to unwrap since httparse verified header name is valid ASCII
        let name = HeaderName::from_bytes(&header_bytes[index.name.0..index.name.1]).unwrap();

        // Safe to use from_maybe_shared_unchecked since httparse verified
        // header value contains only visible ASCII chars
        let value = unsafe { HeaderValue::from_maybe_shared_unchecked(header_bytes.slice(index.value.0..index.value.1)) };

        // insert, not append: a name set twice overwrites
        headers.insert(name, value);
    }
    headers
}

/// Stores the byte range positions of a header's name and value within the
/// original buffer, so header data can be materialized after the head is
/// split off without copying values.
#[derive(Clone, Copy)]
struct HeaderIndex {
    name: (usize, usize),
    value: (usize, usize),
}

const EMPTY_HEADER_INDEX: HeaderIndex = HeaderIndex { name: (0, 0), value: (0, 0) };

const EMPTY_HEADER_INDEX_ARRAY: [HeaderIndex; MAX_HEADER_NUM] = [EMPTY_HEADER_INDEX; MAX_HEADER_NUM];

impl HeaderIndex {
    /// Records the byte positions of header names and values from the parsed headers.
    fn record(bytes: &[u8], headers: &[httparse::Header<'_>], indices: &mut [HeaderIndex]) {
        let bytes_ptr = bytes.as_ptr() as usize;
        for (header, indices) in headers.iter().zip(indices.iter_mut()) {
            let name_start = header.name.as_ptr() as usize - bytes_ptr;
            let name_end = name_start + header.name.len();
            indices.name = (name_start, name_end);
            let value_start = header.value.as_ptr() as usize - bytes_ptr;
            let value_end = value_start + header.value.len();
            indices.value = (value_start, value_end);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn sniff_needs_five_bytes() {
        assert_eq!(sniff_status_line(b""), None);
        assert_eq!(sniff_status_line(b"HT"), None);
        assert_eq!(sniff_status_line(b"HTTP"), None);
        assert_eq!(sniff_status_line(b"HTTP/"), Some(true));
        assert_eq!(sniff_status_line(b"HTTP/1.1 200"), Some(true));
        assert_eq!(sniff_status_line(b"G"), Some(false));
        assert_eq!(sniff_status_line(b"HEAD / HTTP/1.1"), Some(false));
    }

    #[test]
    fn leaves_body_bytes_in_buffer() {
        let str = indoc! {r##"
        GET /index.html HTTP/1.1
        Host: 127.0.0.1:8080
        User-Agent: curl/7.79.1
        Accept: */*

        123"##};

        let mut bytes = BytesMut::from(str);

        let result = HeadDecoder.decode(&mut bytes).unwrap();
        assert!(result.is_some());

        assert_eq!(bytes.len(), 3);
        assert_eq!(&bytes[..], &b"123"[..]);
    }

    #[test]
    fn from_curl() {
        let str = indoc! {r##"
        GET /index.html HTTP/1.1
        Host: 127.0.0.1:8080
        User-Agent: curl/7.79.1
        Accept: */*

        "##};

        let mut buf = BytesMut::from(str);

        let (head, payload_size) = HeadDecoder.decode(&mut buf).unwrap().unwrap();

        assert!(payload_size.is_empty());
        assert!(head.start.is_request());
        assert_eq!(head.version, Version::HTTP_11);

        let StartLine::Request { method, uri } = &head.start else {
            panic!("expect request line");
        };
        assert_eq!(method, &Method::GET);
        assert_eq!(uri.path(), "/index.html");
        assert_eq!(uri.query(), None);

        assert_eq!(head.headers.len(), 3);
        assert_eq!(head.headers.get(http::header::ACCEPT), Some(&HeaderValue::from_static("*/*")));
        assert_eq!(head.headers.get(http::header::HOST), Some(&HeaderValue::from_static("127.0.0.1:8080")));
        assert_eq!(head.headers.get(http::header::USER_AGENT), Some(&HeaderValue::from_static("curl/7.79.1")));
    }

    #[test]
    fn status_line_head() {
        let mut buf = BytesMut::from(
            &b"HTTP/1.1 404 Not Found\r\nContent-Type: text/plain\r\nContent-Length: 9\r\n\r\nnot found"[..],
        );

        let (head, payload_size) = HeadDecoder.decode(&mut buf).unwrap().unwrap();

        assert_eq!(payload_size, PayloadSize::Length(9));
        assert!(!head.start.is_request());
        assert_eq!(head.version, Version::HTTP_11);

        let StartLine::Status { code, reason } = &head.start else {
            panic!("expect status line");
        };
        assert_eq!(*code, StatusCode::NOT_FOUND);
        assert_eq!(reason, "Not Found");

        assert_eq!(&buf[..], b"not found");
    }

    #[test]
    fn partial_head_is_not_an_error() {
        let mut buf = BytesMut::from(&b"GET /index.html HTTP/1.1\r\nHost: 127"[..]);

        let result = HeadDecoder.decode(&mut buf).unwrap();
        assert!(result.is_none());
        // nothing consumed
        assert_eq!(buf.len(), 35);
    }

    #[test]
    fn duplicate_content_length_last_wins() {
        let mut buf = BytesMut::from(&b"POST /u HTTP/1.1\r\nContent-Length: 3\r\nContent-Length: 7\r\n\r\n"[..]);

        let (head, payload_size) = HeadDecoder.decode(&mut buf).unwrap().unwrap();

        assert_eq!(payload_size, PayloadSize::Length(7));
        assert_eq!(head.headers.get(http::header::CONTENT_LENGTH), Some(&HeaderValue::from_static("7")));
    }

    #[test]
    fn bad_content_length_fails_without_consuming() {
        let raw = &b"POST /u HTTP/1.1\r\nContent-Length: abc\r\n\r\n"[..];
        let mut buf = BytesMut::from(raw);

        let err = HeadDecoder.decode(&mut buf).unwrap_err();
        assert!(matches!(err, ParseError::InvalidContentLength { .. }));
        assert_eq!(&buf[..], raw);
    }

    #[test]
    fn too_many_headers_rejected() {
        let mut raw = String::from("GET / HTTP/1.1\r\n");
        for i in 0..=MAX_HEADER_NUM {
            raw.push_str(&format!("x-h{i}: {i}\r\n"));
        }
        raw.push_str("\r\n");

        let mut buf = BytesMut::from(raw.as_str());

        let err = HeadDecoder.decode(&mut buf).unwrap_err();
        assert!(matches!(err, ParseError::TooManyHeaders { max_num: MAX_HEADER_NUM }));
        // nothing consumed
        assert_eq!(buf.len(), raw.len());
    }

    #[test]
    fn too_large_head_rejected() {
        let mut raw = String::from("GET / HTTP/1.1\r\nx-big: ");
        raw.push_str(&"a".repeat(MAX_HEADER_BYTES));
        raw.push_str("\r\n\r\n");

        let mut buf = BytesMut::from(raw.as_str());

        let err = HeadDecoder.decode(&mut buf).unwrap_err();
        assert!(matches!(err, ParseError::TooLargeHeader { .. }));
        assert_eq!(buf.len(), raw.len());
    }

    #[test]
    fn oversized_partial_head_rejected() {
        // no CRLF-CRLF terminator in sight, already past the limit
        let mut raw = String::from("GET / HTTP/1.1\r\nx-big: ");
        raw.push_str(&"a".repeat(MAX_HEADER_BYTES));

        let mut buf = BytesMut::from(raw.as_str());

        let err = HeadDecoder.decode(&mut buf).unwrap_err();
        assert!(matches!(err, ParseError::TooLargeHeader { .. }));
    }

    #[test]
    fn http2_version_token_rejected() {
        let mut buf = BytesMut::from(&b"GET / HTTP/2.0\r\n\r\n"[..]);

        let err = HeadDecoder.decode(&mut buf).unwrap_err();
        assert!(matches!(err, ParseError::InvalidStartLine { .. }));
    }
}
