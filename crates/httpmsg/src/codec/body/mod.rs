//! Body decoding.
//!
//! The only supported body framing is `Content-Length`; chunked transfer
//! encoding is out of scope for this engine.

mod length_decoder;
pub use length_decoder::LengthDecoder;
