//! An incremental HTTP/1.x message parsing and serialization engine
//!
//! This crate turns a stream of raw bytes arriving over a socket into a structured
//! HTTP request or response object, and turns a structured object back into wire
//! bytes. It is the message layer of an embedded HTTP server: the transport layer
//! (sockets, read/write scheduling) and the route dispatcher are external
//! collaborators, not part of this crate.
//!
//! # Features
//!
//! - Push-mode, resumable parsing: feed byte chunks of arbitrary size as they
//!   arrive, poll completion after each feed
//! - Both message shapes: request lines and status lines, detected from the
//!   first bytes of an inbound stream
//! - `Content-Length` body framing with exact frame boundaries
//! - Byte-for-byte serialization of constructed messages
//! - Zero-copy header materialization on the parse path
//! - Clean, distinguishable error kinds
//!
//! # Example
//!
//! ```
//! use httpmsg::protocol::Message;
//!
//! // Inbound: the transport feeds chunks as they arrive.
//! let mut message = Message::inbound();
//! message.append_data(b"GET /status HTTP/1.1\r\n").unwrap();
//! message.append_data(b"Host: localhost\r\n\r\n").unwrap();
//! assert!(message.is_complete());
//! assert_eq!(message.method().unwrap(), &http::Method::GET);
//!
//! // Outbound: the dispatcher builds a response and asks for wire bytes.
//! let mut response = Message::response(200, "OK", http::Version::HTTP_11).unwrap();
//! response.set_header_field("Content-Length", "2").unwrap();
//! response.set_body(b"hi");
//! let bytes = response.message_data().unwrap();
//! assert_eq!(&bytes[..], b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\n\r\nhi");
//! ```
//!
//! # Architecture
//!
//! The crate is organized into two modules:
//!
//! - [`protocol`]: the [`protocol::Message`] entity, start-line and payload
//!   types, and error types
//! - [`codec`]: wire-format decoding/encoding built on the
//!   [`tokio_util::codec`] traits, driven buffer-to-buffer
//!
//! # Concurrency
//!
//! There is none. A [`protocol::Message`] is exclusively owned by the
//! connection that created it; `append_data` and `message_data` never block,
//! never perform I/O, and never suspend. The transport layer is free to use
//! threads, an event loop, or async tasks: one message instance per in-flight
//! message is the whole safety story.
//!
//! # Limitations
//!
//! - HTTP/1.0 and HTTP/1.1 only
//! - Chunked transfer encoding is not supported; `Content-Length` is the only
//!   framing header given semantic meaning
//! - Single-value headers: setting a name twice overwrites
//! - Maximum header size: 8KB; maximum number of headers: 64

pub mod codec;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
