//! Decoder for message bodies framed by a `Content-Length` header.
//!
//! The decoder tracks the number of body bytes still owed to the current frame
//! and never consumes past it: bytes beyond the declared length belong to the
//! next message on the stream.

use std::cmp;

use crate::protocol::{ParseError, PayloadItem, PayloadSize};
use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// A decoder for bodies with a known content length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthDecoder {
    /// The number of bytes remaining to be read from the payload
    length: u64,
}

impl LengthDecoder {
    /// Creates a new LengthDecoder expecting `length` body bytes.
    pub fn new(length: u64) -> Self {
        Self { length }
    }
}

/// A declared payload size converts directly into its body decoder; an absent
/// framing header means a zero-length body.
impl From<PayloadSize> for LengthDecoder {
    fn from(payload_size: PayloadSize) -> Self {
        Self::new(payload_size.length())
    }
}

impl Decoder for LengthDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    /// Decodes body bytes from the input buffer up to the declared length.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(PayloadItem::Eof))` when all declared bytes have been read
    /// - `Ok(Some(PayloadItem::Chunk(bytes)))` for an available chunk
    /// - `Ok(None)` when more data is needed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.length == 0 {
            return Ok(Some(PayloadItem::Eof));
        }

        if src.is_empty() {
            return Ok(None);
        }

        // Read the minimum of remaining length and available bytes
        let len = cmp::min(self.length, src.len() as u64);
        let bytes = src.split_to(len as usize).freeze();

        self.length -= bytes.len() as u64;
        Ok(Some(PayloadItem::Chunk(bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_at_declared_length() {
        let mut buffer = BytesMut::from(&b"hello, worldGET /next HTTP/1.1"[..]);

        let mut length_decoder = LengthDecoder::new(12);

        let payload = length_decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(payload.is_chunk());
        assert_eq!(&payload.as_bytes().unwrap()[..], b"hello, world");

        // next frame's bytes stay in the buffer
        assert_eq!(&buffer[..], b"GET /next HTTP/1.1");

        let eof = length_decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(eof.is_eof());
    }

    #[test]
    fn needs_more_data() {
        let mut buffer = BytesMut::from(&b"hel"[..]);

        let mut length_decoder = LengthDecoder::new(5);

        let payload = length_decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(&payload.as_bytes().unwrap()[..], b"hel");

        assert_eq!(length_decoder.decode(&mut buffer).unwrap(), None);
    }

    #[test]
    fn zero_length_is_immediately_eof() {
        let mut buffer = BytesMut::new();

        let mut length_decoder = LengthDecoder::from(PayloadSize::Empty);

        let eof = length_decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(eof.is_eof());
    }
}
