use http::Version;
use std::io;
use thiserror::Error;

/// Top level error type, wrapping the phase-specific errors.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("parse error: {source}")]
    ParseError {
        #[from]
        source: ParseError,
    },

    #[error("build error: {source}")]
    BuildError {
        #[from]
        source: BuildError,
    },

    #[error("send error: {source}")]
    SendError {
        #[from]
        source: SendError,
    },
}

/// Errors produced while ingesting inbound bytes.
///
/// Every variant is terminal for the message being parsed: the engine does not
/// resynchronize within a corrupted stream. Incomplete input is never an error.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed start line: {reason}")]
    InvalidStartLine { reason: String },

    #[error("malformed header line: {reason}")]
    InvalidHeader { reason: String },

    #[error("malformed content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("header number exceed the limit {max_num}")]
    TooManyHeaders { max_num: usize },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn invalid_start_line<S: ToString>(str: S) -> Self {
        Self::InvalidStartLine { reason: str.to_string() }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// Errors produced while constructing or mutating an outbound message.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("invalid status code {code}, expect range [100, 599]")]
    InvalidStatusCode { code: u16 },

    #[error("invalid http method: {reason}")]
    InvalidMethod { reason: String },

    #[error("invalid http uri: {reason}")]
    InvalidUri { reason: String },

    #[error("invalid header name: {reason}")]
    InvalidHeaderName { reason: String },

    #[error("invalid header value: {reason}")]
    InvalidHeaderValue { reason: String },
}

impl BuildError {
    pub fn invalid_status_code(code: u16) -> Self {
        Self::InvalidStatusCode { code }
    }

    pub fn invalid_method<S: ToString>(str: S) -> Self {
        Self::InvalidMethod { reason: str.to_string() }
    }

    pub fn invalid_uri<S: ToString>(str: S) -> Self {
        Self::InvalidUri { reason: str.to_string() }
    }

    pub fn invalid_header_name<S: ToString>(str: S) -> Self {
        Self::InvalidHeaderName { reason: str.to_string() }
    }

    pub fn invalid_header_value<S: ToString>(str: S) -> Self {
        Self::InvalidHeaderValue { reason: str.to_string() }
    }
}

/// Errors produced while serializing a message to wire bytes.
#[derive(Error, Debug)]
pub enum SendError {
    #[error("message has no start line, not serializable")]
    MissingStartLine,

    #[error("unsupported http version: {version:?}")]
    UnsupportedVersion { version: Version },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn unsupported_version(version: Version) -> Self {
        Self::UnsupportedVersion { version }
    }
}
