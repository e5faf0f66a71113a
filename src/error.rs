//! Error types for the frame decoder.
//!
//! Every condition that makes an incoming byte stream unusable is a variant of
//! [`Error`]. Running out of bytes is *not* one of them while feeding: the
//! decoder simply waits. [`Error::IncompleteFrame`] only surfaces from the
//! one-shot [`Frame::parse`](crate::protocol::Frame::parse) API.

use thiserror::Error;

/// Result type alias for decoder operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding a WebSocket byte stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Fragmentation rules were broken by the peer.
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// Invalid UTF-8 in a text message or close reason.
    #[error("Invalid UTF-8 in text payload")]
    InvalidUtf8,

    /// Frame size exceeds configured maximum.
    #[error("Frame too large: {size} bytes (max: {max})")]
    FrameTooLarge {
        /// Declared payload length.
        size: u64,
        /// Maximum allowed size.
        max: usize,
    },

    /// Message size exceeds configured maximum.
    #[error("Message too large: {size} bytes (max: {max})")]
    MessageTooLarge {
        /// Accumulated message size.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// Too many fragments in a single message.
    #[error("Too many fragments: {count} (max: {max})")]
    TooManyFragments {
        /// Fragment count including the offending frame.
        count: usize,
        /// Maximum allowed fragments.
        max: usize,
    },

    /// Opcode outside the six defined by RFC 6455.
    #[error("Reserved opcode: {0:#x}")]
    ReservedOpcode(u8),

    /// Control frame with FIN=0.
    #[error("Control frames cannot be fragmented")]
    FragmentedControlFrame,

    /// Control frame payload too large (>125 bytes).
    #[error("Control frame payload too large: {0} bytes (max: 125)")]
    ControlFrameTooLarge(u64),

    /// RSV1-3 set while no extension is negotiated.
    #[error("Reserved bits set without negotiated extension")]
    ReservedBitsSet,

    /// A server received an unmasked frame.
    #[error("Client frame must be masked")]
    UnmaskedClientFrame,

    /// A client received a masked frame.
    #[error("Server frame must not be masked")]
    MaskedServerFrame,

    /// Close frame payload of exactly one byte.
    #[error("Invalid close payload: {0} byte(s), expected 0 or at least 2")]
    InvalidClosePayload(usize),

    /// 64-bit payload length with the most significant bit set.
    #[error("Payload length {0:#x} has the most significant bit set")]
    PayloadLengthMsbSet(u64),

    /// Payload length does not fit in this platform's `usize`.
    #[error("Payload too large for platform: {size} bytes (max: {max})")]
    PayloadTooLargeForPlatform {
        /// Declared payload length.
        size: u64,
        /// Largest length addressable on this platform.
        max: u64,
    },

    /// Incomplete frame data (one-shot parsing only).
    #[error("Incomplete frame: need {needed} more bytes")]
    IncompleteFrame {
        /// Number of additional bytes needed.
        needed: usize,
    },

    /// Output buffer too small for an encoded frame.
    #[error("Buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall {
        /// Bytes required.
        needed: usize,
        /// Bytes available.
        available: usize,
    },
}

impl Error {
    /// Returns `true` for errors caused by the peer breaking RFC 6455 framing or
    /// fragmentation rules, as opposed to local limits or encoding issues.
    #[must_use]
    pub const fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Error::ProtocolViolation(_)
                | Error::ReservedOpcode(_)
                | Error::FragmentedControlFrame
                | Error::ControlFrameTooLarge(_)
                | Error::ReservedBitsSet
                | Error::UnmaskedClientFrame
                | Error::MaskedServerFrame
                | Error::InvalidClosePayload(_)
                | Error::PayloadLengthMsbSet(_)
        )
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(_: std::str::Utf8Error) -> Self {
        Error::InvalidUtf8
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(_: std::string::FromUtf8Error) -> Self {
        Error::InvalidUtf8
    }
}
