//! Frame opcodes (RFC 6455 Section 5.2).

use crate::error::{Error, Result};

/// WebSocket frame opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    /// Continuation of a fragmented message (0x0).
    Continuation = 0x0,
    /// UTF-8 text (0x1).
    Text = 0x1,
    /// Arbitrary binary data (0x2).
    Binary = 0x2,
    /// Connection close, optionally with a status code and reason (0x8).
    Close = 0x8,
    /// Ping (0x9).
    Ping = 0x9,
    /// Pong (0xA).
    Pong = 0xA,
}

impl OpCode {
    /// Decode the low nibble of the first header byte.
    ///
    /// # Errors
    ///
    /// Returns `Error::ReservedOpcode` for 0x3-0x7, 0xB-0xF and anything that
    /// does not fit in four bits.
    pub const fn from_u8(byte: u8) -> Result<Self> {
        match byte {
            0x0 => Ok(OpCode::Continuation),
            0x1 => Ok(OpCode::Text),
            0x2 => Ok(OpCode::Binary),
            0x8 => Ok(OpCode::Close),
            0x9 => Ok(OpCode::Ping),
            0xA => Ok(OpCode::Pong),
            _ => Err(Error::ReservedOpcode(byte)),
        }
    }

    /// Raw nibble value.
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Close, Ping or Pong. The high bit of the nibble marks control opcodes.
    #[inline]
    #[must_use]
    pub const fn is_control(self) -> bool {
        self.as_u8() & 0x8 != 0
    }

    /// Continuation, Text or Binary.
    #[inline]
    #[must_use]
    pub const fn is_data(self) -> bool {
        !self.is_control()
    }

    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            OpCode::Continuation => "continuation",
            OpCode::Text => "text",
            OpCode::Binary => "binary",
            OpCode::Close => "close",
            OpCode::Ping => "ping",
            OpCode::Pong => "pong",
        }
    }
}

impl TryFrom<u8> for OpCode {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self> {
        Self::from_u8(byte)
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [OpCode; 6] = [
        OpCode::Continuation,
        OpCode::Text,
        OpCode::Binary,
        OpCode::Close,
        OpCode::Ping,
        OpCode::Pong,
    ];

    #[test]
    fn test_every_defined_opcode_decodes_to_itself() {
        for opcode in ALL {
            assert_eq!(OpCode::from_u8(opcode.as_u8()), Ok(opcode));
            assert_eq!(OpCode::try_from(opcode.as_u8()), Ok(opcode));
        }
    }

    #[test]
    fn test_reserved_nibbles_rejected() {
        for reserved in (0x3..=0x7).chain(0xB..=0xF) {
            assert_eq!(OpCode::from_u8(reserved), Err(Error::ReservedOpcode(reserved)));
        }
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert_eq!(OpCode::from_u8(0x10), Err(Error::ReservedOpcode(0x10)));
        assert_eq!(OpCode::from_u8(0xFF), Err(Error::ReservedOpcode(0xFF)));
    }

    #[test]
    fn test_control_and_data_partition() {
        let control: Vec<_> = ALL.iter().filter(|op| op.is_control()).collect();
        assert_eq!(control, [&OpCode::Close, &OpCode::Ping, &OpCode::Pong]);
        for opcode in ALL {
            assert_ne!(opcode.is_control(), opcode.is_data());
        }
    }

    #[test]
    fn test_opcode_display() {
        assert_eq!(OpCode::Text.to_string(), "text");
        assert_eq!(OpCode::Close.to_string(), "close");
    }
}
