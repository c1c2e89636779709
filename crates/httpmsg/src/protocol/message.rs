//! The HTTP message entity.
//!
//! A [`Message`] owns the structured state of exactly one HTTP message (start
//! line, headers, body) together with the resumable parsing state needed to
//! build that state incrementally from a byte stream. The transport layer
//! creates one inbound message per connection-read cycle, feeds it chunks via
//! [`Message::append_data`] and polls [`Message::is_complete`] after every
//! feed; the dispatcher builds outbound messages via [`Message::request`] /
//! [`Message::response`] and serializes them with [`Message::message_data`].
//!
//! A message is single-use: it covers exactly one frame of the stream. Bytes
//! past the frame boundary are never consumed into its fields and can be
//! reclaimed with [`Message::take_excess`] to seed the next message.

use bytes::{BufMut, Bytes, BytesMut};
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri, Version};
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{HeadDecoder, HeadEncoder, LengthDecoder};
use crate::ensure;
use crate::protocol::{BuildError, ParseError, PayloadItem, SendError, StartLine};

/// A single HTTP message: a request or a response, inbound or outbound.
///
/// The message kind is a tagged variant rather than a flag: request-only
/// fields are structurally absent on a response and vice versa, and an inbound
/// message whose start line has not arrived yet is in a third, unresolved
/// state in which all head accessors report `None`.
///
/// The internal accumulation buffer never aliases the transport's read
/// buffer: [`Message::append_data`] copies on feed.
#[derive(Debug)]
pub struct Message {
    /// `None` while an inbound start line is still unresolved
    start: Option<StartLine>,
    version: Version,
    headers: HeaderMap,
    /// `None` means "not yet known", distinct from an empty body
    body: Option<BytesMut>,
    /// Fed bytes not yet consumed into the structured fields
    buffer: BytesMut,
    head_decoder: HeadDecoder,
    /// Body-phase state machine; `None` once the declared body is complete
    body_decoder: Option<LengthDecoder>,
}

impl Message {
    /// Creates an empty inbound message, ready to ingest bytes from the wire.
    ///
    /// Whether it is a request or a response is determined by the first parsed
    /// line; until then the message is unresolved and all head accessors
    /// report `None`.
    pub fn inbound() -> Self {
        Self {
            start: None,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            body: None,
            buffer: BytesMut::new(),
            head_decoder: HeadDecoder,
            body_decoder: None,
        }
    }

    /// Creates an outbound request with the given method, URI and version.
    ///
    /// # Errors
    ///
    /// Fails if `method` is not a non-empty HTTP token or `uri` does not parse.
    pub fn request(method: &str, uri: &str, version: Version) -> Result<Self, BuildError> {
        let method = method.parse::<Method>().map_err(BuildError::invalid_method)?;
        let uri = uri.parse::<Uri>().map_err(BuildError::invalid_uri)?;
        Ok(Self::outbound(StartLine::Request { method, uri }, version))
    }

    /// Creates an outbound response with the given status code, reason phrase
    /// and version.
    ///
    /// # Errors
    ///
    /// Fails with [`BuildError::InvalidStatusCode`] if `code` is outside
    /// `[100, 599]`.
    pub fn response(code: u16, reason: &str, version: Version) -> Result<Self, BuildError> {
        ensure!((100..=599).contains(&code), BuildError::invalid_status_code(code));
        let code = StatusCode::from_u16(code).map_err(|_| BuildError::invalid_status_code(code))?;
        Ok(Self::outbound(StartLine::Status { code, reason: reason.to_string() }, version))
    }

    /// An outbound message is header-complete from birth: the caller supplied
    /// the whole start line and adds headers through setters.
    fn outbound(start: StartLine, version: Version) -> Self {
        Self {
            start: Some(start),
            version,
            headers: HeaderMap::new(),
            body: Some(BytesMut::new()),
            buffer: BytesMut::new(),
            head_decoder: HeadDecoder,
            body_decoder: None,
        }
    }

    /// Incorporates a chunk of inbound bytes into the message.
    ///
    /// Chunks may be empty and may split lines or multi-byte tokens anywhere;
    /// feeding a well-formed message in any sequence of chunks yields the same
    /// parsed result as feeding it whole. Incompleteness is never an error:
    /// the call succeeds and [`Message::is_complete`] stays false until the
    /// frame is fully ingested.
    ///
    /// Appending is atomic: on failure the message is left exactly as it was
    /// before the call, so the transport can abort the connection without
    /// re-derivation. Once the message is complete the call is a success
    /// no-op that consumes nothing: bytes past the frame boundary belong to
    /// the next message.
    ///
    /// # Errors
    ///
    /// Fails only on malformed input: a bad start line, a header line without
    /// a colon separator, or an unparseable `Content-Length` value.
    pub fn append_data(&mut self, data: &[u8]) -> Result<(), ParseError> {
        if self.is_complete() {
            return Ok(());
        }

        let checkpoint = self.buffer.len();
        self.buffer.extend_from_slice(data);

        if self.start.is_none() {
            match self.head_decoder.decode(&mut self.buffer) {
                Ok(Some((head, payload_size))) => {
                    self.version = head.version;
                    self.headers = head.headers;
                    self.body = Some(BytesMut::new());
                    self.body_decoder = Some(LengthDecoder::from(payload_size));
                    self.start = Some(head.start);
                }
                Ok(None) => return Ok(()),
                Err(e) => {
                    // atomic append: roll the failed chunk back
                    self.buffer.truncate(checkpoint);
                    return Err(e);
                }
            }
        }

        while let Some(decoder) = self.body_decoder.as_mut() {
            match decoder.decode(&mut self.buffer)? {
                Some(PayloadItem::Chunk(chunk)) => {
                    if let Some(body) = self.body.as_mut() {
                        body.extend_from_slice(&chunk);
                    }
                }
                Some(PayloadItem::Eof) => {
                    self.body_decoder = None;
                }
                None => break,
            }
        }

        Ok(())
    }

    /// True once the start line and all header lines have been parsed.
    /// Monotonic: never reverts to false. The body may still be incomplete.
    pub fn is_header_complete(&self) -> bool {
        self.start.is_some()
    }

    /// True once the head is complete and the declared body length (zero when
    /// no framing header is present) has been fully received. A complete
    /// message is ready for the dispatcher.
    pub fn is_complete(&self) -> bool {
        self.start.is_some() && self.body_decoder.is_none()
    }

    /// Whether this is a request (`Some(true)`), a response (`Some(false)`),
    /// or still unresolved (`None`).
    pub fn is_request(&self) -> Option<bool> {
        self.start.as_ref().map(StartLine::is_request)
    }

    /// The protocol version. Defaults to HTTP/1.1 until set by a constructor
    /// or by inbound parsing.
    pub fn version(&self) -> Version {
        self.version
    }

    /// The request method. `None` on responses and unresolved messages.
    pub fn method(&self) -> Option<&Method> {
        match &self.start {
            Some(StartLine::Request { method, .. }) => Some(method),
            _ => None,
        }
    }

    /// The request URI. `None` on responses and unresolved messages.
    pub fn uri(&self) -> Option<&Uri> {
        match &self.start {
            Some(StartLine::Request { uri, .. }) => Some(uri),
            _ => None,
        }
    }

    /// The response status code. `None` on requests and unresolved messages.
    pub fn status_code(&self) -> Option<StatusCode> {
        match &self.start {
            Some(StartLine::Status { code, .. }) => Some(*code),
            _ => None,
        }
    }

    /// The response reason phrase. `None` on requests and unresolved messages.
    pub fn reason(&self) -> Option<&str> {
        match &self.start {
            Some(StartLine::Status { reason, .. }) => Some(reason),
            _ => None,
        }
    }

    /// A read-only view of all header fields, in insertion order.
    ///
    /// `None` until the head is complete: an incomplete inbound message
    /// reports "not yet available" rather than a partial mapping.
    pub fn headers(&self) -> Option<&HeaderMap> {
        self.is_header_complete().then_some(&self.headers)
    }

    /// Case-insensitive single-header lookup. `None` when the header is
    /// absent or the head is not yet complete; an empty value is `Some`.
    pub fn header_field(&self, name: &str) -> Option<&HeaderValue> {
        self.headers()?.get(name)
    }

    /// The message body. `None` while the body is not yet known (inbound,
    /// head incomplete); an empty body is `Some` with zero length.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Inserts or overwrites a header field, matching names case-insensitively.
    ///
    /// An empty value is permitted and distinct from absence. No value
    /// character-set validation beyond `HeaderValue`'s is performed; framing
    /// headers are not recomputed on the caller's behalf.
    ///
    /// # Errors
    ///
    /// Fails if `name` is empty or not a valid header name, or if `value`
    /// contains bytes a header value cannot carry.
    pub fn set_header_field(&mut self, name: &str, value: &str) -> Result<(), BuildError> {
        let name = name.parse::<HeaderName>().map_err(BuildError::invalid_header_name)?;
        let value = HeaderValue::from_str(value).map_err(BuildError::invalid_header_value)?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Replaces the body outright.
    ///
    /// If the message already carries a `Content-Length` header it is the
    /// caller's responsibility to update it to match; the engine never
    /// recomputes framing headers on body mutation.
    pub fn set_body(&mut self, body: impl AsRef<[u8]>) {
        self.body = Some(BytesMut::from(body.as_ref()));
    }

    /// Takes the bytes fed past the end of this message's frame.
    ///
    /// When a fed chunk straddles a frame boundary the tail stays buffered
    /// here, unconsumed; the transport redelivers it to the next message.
    pub fn take_excess(&mut self) -> Bytes {
        self.buffer.split().freeze()
    }

    /// Serializes the message to its exact wire bytes: start line, headers in
    /// insertion order, the empty terminator line, then the raw body verbatim
    /// (no transfer-encoding transformation).
    ///
    /// Deterministic and idempotent: two calls without intervening mutation
    /// yield byte-identical output. By convention an outbound message is not
    /// mutated after serialization.
    ///
    /// # Errors
    ///
    /// Fails with [`SendError::MissingStartLine`] when the start line is
    /// absent (an inbound message whose head never completed), or with
    /// [`SendError::UnsupportedVersion`] for non-HTTP/1.x versions.
    pub fn message_data(&self) -> Result<Bytes, SendError> {
        let start = self.start.as_ref().ok_or(SendError::MissingStartLine)?;

        let mut dst = BytesMut::new();
        HeadEncoder.encode((start, self.version, &self.headers), &mut dst)?;

        if let Some(body) = &self.body {
            dst.put_slice(body);
        }

        Ok(dst.freeze())
    }
}
