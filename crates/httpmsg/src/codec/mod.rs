//! Wire-format encoding and decoding.
//!
//! The codec layer is built on the [`tokio_util::codec`] `Decoder`/`Encoder`
//! traits and is driven purely buffer-to-buffer: no I/O, no blocking, no
//! suspension points. The [`protocol::Message`](crate::protocol::Message)
//! entity drives these codecs over its own accumulation buffer.
//!
//! - [`HeadDecoder`]: start line + header block decoding (request and status
//!   line shapes)
//! - [`LengthDecoder`]: `Content-Length` framed body decoding
//! - [`HeadEncoder`]: start line + header block serialization

mod head_decoder;
pub use head_decoder::HeadDecoder;

mod head_encoder;
pub use head_encoder::HeadEncoder;

pub mod body;
pub use body::LengthDecoder;
