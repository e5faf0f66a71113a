//! Decoded messages and close payloads (RFC 6455 Sections 5.5.1 and 7.4).

use std::fmt;

use crate::error::{Error, Result};
use crate::protocol::utf8::validate_utf8;

/// Registered close status codes (RFC 6455 Section 7.4.1 and the IANA registry).
///
/// Codes outside this table are kept numerically in
/// [`CloseStatus::Unrecognized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseCode {
    /// 1000: the purpose of the connection has been fulfilled.
    Normal,
    /// 1001: the peer is going away (server shutdown, page navigation).
    GoingAway,
    /// 1002: the peer saw a protocol error.
    ProtocolError,
    /// 1003: the peer received a data type it cannot accept.
    UnsupportedData,
    /// 1007: the peer received data inconsistent with the message type.
    InvalidPayload,
    /// 1008: the peer received a message that violates its policy.
    PolicyViolation,
    /// 1009: the peer received a message too big to process.
    MessageTooBig,
    /// 1010: the client expected an extension the server did not negotiate.
    MandatoryExtension,
    /// 1011: the server hit an unexpected condition.
    InternalError,
    /// 1012: the server is restarting.
    ServiceRestart,
    /// 1013: the server is overloaded, try again later.
    TryAgainLater,
    /// 1014: a gateway received an invalid upstream response.
    BadGateway,
}

/// Static mapping between wire values and symbolic codes.
const CLOSE_CODES: [(u16, CloseCode); 12] = [
    (1000, CloseCode::Normal),
    (1001, CloseCode::GoingAway),
    (1002, CloseCode::ProtocolError),
    (1003, CloseCode::UnsupportedData),
    (1007, CloseCode::InvalidPayload),
    (1008, CloseCode::PolicyViolation),
    (1009, CloseCode::MessageTooBig),
    (1010, CloseCode::MandatoryExtension),
    (1011, CloseCode::InternalError),
    (1012, CloseCode::ServiceRestart),
    (1013, CloseCode::TryAgainLater),
    (1014, CloseCode::BadGateway),
];

impl CloseCode {
    /// Look up the symbolic code for a wire value.
    #[must_use]
    pub fn from_u16(code: u16) -> Option<Self> {
        CLOSE_CODES
            .iter()
            .find(|(value, _)| *value == code)
            .map(|(_, symbolic)| *symbolic)
    }

    /// Wire value of this code.
    #[must_use]
    pub fn as_u16(self) -> u16 {
        CLOSE_CODES
            .iter()
            .find(|(_, symbolic)| *symbolic == self)
            .map_or(0, |(value, _)| *value)
    }

    /// Human-readable description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            CloseCode::Normal => "normal closure",
            CloseCode::GoingAway => "peer going away",
            CloseCode::ProtocolError => "protocol error",
            CloseCode::UnsupportedData => "unsupported data",
            CloseCode::InvalidPayload => "invalid payload data",
            CloseCode::PolicyViolation => "policy violation",
            CloseCode::MessageTooBig => "message too big",
            CloseCode::MandatoryExtension => "mandatory extension missing",
            CloseCode::InternalError => "internal server error",
            CloseCode::ServiceRestart => "service restart",
            CloseCode::TryAgainLater => "try again later",
            CloseCode::BadGateway => "bad gateway",
        }
    }
}

impl fmt::Display for CloseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_u16())
    }
}

/// Status carried by a Close frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CloseStatus {
    /// The Close frame had an empty payload.
    #[default]
    NoStatus,
    /// A registered status code.
    Code(CloseCode),
    /// A status code absent from the table, preserved as sent.
    Unrecognized(u16),
}

impl CloseStatus {
    /// Classify a wire value.
    #[must_use]
    pub fn from_u16(code: u16) -> Self {
        CloseCode::from_u16(code).map_or(Self::Unrecognized(code), Self::Code)
    }

    /// Numeric value, if the frame carried one.
    #[must_use]
    pub fn as_u16(self) -> Option<u16> {
        match self {
            CloseStatus::NoStatus => None,
            CloseStatus::Code(code) => Some(code.as_u16()),
            CloseStatus::Unrecognized(code) => Some(code),
        }
    }
}

/// A decoded Close frame payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CloseFrame {
    /// Status code, if any.
    pub status: CloseStatus,
    /// Reason text; empty when absent.
    pub reason: String,
}

impl CloseFrame {
    /// Create a close frame with a registered code.
    #[must_use]
    pub fn new(code: CloseCode, reason: impl Into<String>) -> Self {
        Self {
            status: CloseStatus::Code(code),
            reason: reason.into(),
        }
    }

    /// Parse a Close frame payload.
    ///
    /// An empty payload has no status and an empty reason. Otherwise the first
    /// two bytes are a big-endian status code and the rest is a UTF-8 reason.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidClosePayload` for a one-byte payload
    /// - `Error::InvalidUtf8` if the reason is not valid UTF-8
    pub fn parse(payload: &[u8]) -> Result<Self> {
        match payload {
            [] => Ok(Self::default()),
            [_] => Err(Error::InvalidClosePayload(1)),
            [hi, lo, reason @ ..] => Ok(Self {
                status: CloseStatus::from_u16(u16::from_be_bytes([*hi, *lo])),
                reason: validate_utf8(reason)?.to_owned(),
            }),
        }
    }

    /// Symbolic code, or `None` when the frame had no code or an unknown one.
    #[must_use]
    pub fn code(&self) -> Option<CloseCode> {
        match self.status {
            CloseStatus::Code(code) => Some(code),
            _ => None,
        }
    }

    /// Numeric code as sent, if any.
    #[must_use]
    pub fn raw_code(&self) -> Option<u16> {
        self.status.as_u16()
    }
}

/// A complete data message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A text message, validated as UTF-8.
    Text(String),
    /// A binary message.
    Binary(Vec<u8>),
}

impl Message {
    /// Create a text message.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Message::Text(s.into())
    }

    /// Create a binary message.
    #[must_use]
    pub fn binary(data: impl Into<Vec<u8>>) -> Self {
        Message::Binary(data.into())
    }

    /// Returns `true` if this is a text message.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Message::Text(_))
    }

    /// Returns `true` if this is a binary message.
    #[must_use]
    pub const fn is_binary(&self) -> bool {
        matches!(self, Message::Binary(_))
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw payload bytes regardless of type.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Message::Text(s) => s.as_bytes(),
            Message::Binary(data) => data,
        }
    }

    /// Consume and return the text content, if this is a text message.
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self {
            Message::Text(s) => Some(s),
            Message::Binary(_) => None,
        }
    }

    /// Consume and return the payload bytes regardless of type.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Message::Text(s) => s.into_bytes(),
            Message::Binary(data) => data,
        }
    }

    /// Borrow the text content, if this is a text message.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Message::Text(s) => Some(s),
            Message::Binary(_) => None,
        }
    }

    /// Borrow the binary content, if this is a binary message.
    #[must_use]
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Message::Binary(data) => Some(data),
            Message::Text(_) => None,
        }
    }
}
