use bytes::Bytes;

/// An item produced by the body decoder: a chunk of body bytes or the end of
/// the body stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem {
    /// A chunk of payload data
    Chunk(Bytes),
    /// Marks the end of the payload stream
    Eof,
}

impl PayloadItem {
    /// Returns true if this item represents the end of the payload stream
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, PayloadItem::Eof)
    }

    /// Returns true if this item contains chunk data
    #[inline]
    pub fn is_chunk(&self) -> bool {
        matches!(self, PayloadItem::Chunk(_))
    }

    /// Returns a reference to the contained bytes if this is a Chunk
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }
}

/// The declared size of an HTTP message body, derived from the framing headers.
///
/// `Content-Length` is the only framing header given semantic meaning here;
/// a message head without one declares an empty body.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PayloadSize {
    /// Payload with known length in bytes
    Length(u64),
    /// Empty payload (no framing header present)
    Empty,
}

impl PayloadSize {
    /// Returns true if the payload is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, PayloadSize::Empty)
    }

    /// The declared length in bytes
    #[inline]
    pub fn length(&self) -> u64 {
        match self {
            PayloadSize::Length(n) => *n,
            PayloadSize::Empty => 0,
        }
    }
}
