//! Core protocol types.
//!
//! - [`Message`]: the single entity of this engine, a request or response
//!   under construction, either by incremental byte ingestion (inbound) or by
//!   the constructor/setter path (outbound)
//! - [`StartLine`] / [`MessageHead`]: the tagged start-line variant and the
//!   decoder's head output
//! - [`PayloadItem`] / [`PayloadSize`]: body chunks and declared body framing
//! - [`HttpError`], [`ParseError`], [`BuildError`], [`SendError`]: error types
//!   for the parsing, construction and serialization phases

mod message;
pub use message::Message;

mod head;
pub use head::MessageHead;
pub use head::StartLine;

mod payload;
pub use payload::PayloadItem;
pub use payload::PayloadSize;

mod error;
pub use error::BuildError;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
