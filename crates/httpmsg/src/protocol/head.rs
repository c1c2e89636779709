//! Start-line and message-head types.
//!
//! An HTTP message head is the start line plus the header block. The start line
//! is a tagged variant: a request line carries a method and URI, a status line
//! carries a code and reason phrase. Keeping the two shapes in one enum makes
//! request-only fields structurally inaccessible on a response and vice versa,
//! instead of relying on a boolean flag plus nullable fields.

use http::{HeaderMap, Method, StatusCode, Uri, Version};

/// The first line of an HTTP message.
#[derive(Debug, Clone)]
pub enum StartLine {
    /// A request line: `METHOD SP URI SP VERSION`
    Request { method: Method, uri: Uri },
    /// A status line: `VERSION SP CODE SP REASON`
    Status { code: StatusCode, reason: String },
}

impl StartLine {
    /// Returns true if this is a request line
    #[inline]
    pub fn is_request(&self) -> bool {
        matches!(self, StartLine::Request { .. })
    }
}

/// A fully parsed message head: start line, version and header block.
///
/// This is the item type produced by the head decoder once the CRLF-CRLF
/// terminator has been seen. The [`Message`](crate::protocol::Message) entity
/// absorbs it into its own fields.
#[derive(Debug)]
pub struct MessageHead {
    pub start: StartLine,
    pub version: Version,
    pub headers: HeaderMap,
}
