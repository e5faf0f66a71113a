//! Frame header decoding (RFC 6455 Section 5.2).
//!
//! The header is decoded from the front of the unconsumed buffer without
//! consuming anything. When the buffer ends inside the header the result is
//! [`Decode::Incomplete`] and the caller retries with the same bytes plus
//! whatever arrives next.
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-------+-+-------------+-------------------------------+
//! |F|R|R|R| opcode|M| Payload len |    Extended payload length    |
//! |I|S|S|S|  (4)  |A|     (7)     |             (16/64)           |
//! |N|V|V|V|       |S|             |   (if payload len==126/127)   |
//! | |1|2|3|       |K|             |                               |
//! +-+-+-+-+-------+-+-------------+ - - - - - - - - - - - - - - - +
//! |     Extended payload length continued, if payload len == 127  |
//! + - - - - - - - - - - - - - - - +-------------------------------+
//! |                               |Masking-key, if MASK set to 1  |
//! +-------------------------------+-------------------------------+
//! ```

use crate::error::{Error, Result};
use crate::protocol::OpCode;

const FIN: u8 = 0x80;
const RSV1: u8 = 0x40;
const RSV2: u8 = 0x20;
const RSV3: u8 = 0x10;
const OPCODE: u8 = 0x0F;
const MASK: u8 = 0x80;
const LEN7: u8 = 0x7F;

/// 7-bit length sentinel announcing a 16-bit extended length.
pub const LEN_16_SENTINEL: u8 = 126;
/// 7-bit length sentinel announcing a 64-bit extended length.
pub const LEN_64_SENTINEL: u8 = 127;

/// Outcome of an attempt to decode something from a possibly short buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decode<T> {
    /// Enough bytes were present.
    Complete(T),
    /// At least `needed` more bytes are required before trying again.
    Incomplete {
        /// Minimum number of additional bytes.
        needed: usize,
    },
}

/// A fully decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct FrameHeader {
    /// Final fragment flag.
    pub fin: bool,
    /// Reserved bit 1.
    pub rsv1: bool,
    /// Reserved bit 2.
    pub rsv2: bool,
    /// Reserved bit 3.
    pub rsv3: bool,
    /// Frame opcode.
    pub opcode: OpCode,
    /// Masking key, present iff the MASK bit was set.
    pub mask: Option<[u8; 4]>,
    /// Declared payload length.
    pub payload_len: u64,
    /// Bytes occupied by the header, extended length and mask key.
    pub header_len: usize,
}

impl FrameHeader {
    /// Whether the MASK bit was set.
    #[inline]
    #[must_use]
    pub const fn masked(&self) -> bool {
        self.mask.is_some()
    }

    /// Whether any of RSV1-3 is set.
    #[inline]
    #[must_use]
    pub const fn rsv_bits_set(&self) -> bool {
        self.rsv1 || self.rsv2 || self.rsv3
    }

    /// Declared payload length as a `usize`.
    ///
    /// # Errors
    ///
    /// Returns `Error::PayloadTooLargeForPlatform` if the length does not fit.
    pub fn payload_len_usize(&self) -> Result<usize> {
        usize::try_from(self.payload_len).map_err(|_| Error::PayloadTooLargeForPlatform {
            size: self.payload_len,
            max: usize::MAX as u64,
        })
    }

    /// Decode a header from the front of `buf`.
    ///
    /// Nothing is consumed; on success `header_len` tells the caller how many
    /// bytes to advance past.
    ///
    /// # Errors
    ///
    /// - `Error::ReservedOpcode` as soon as the first byte carries a reserved opcode
    /// - `Error::PayloadLengthMsbSet` if a 64-bit length has its top bit set
    /// - `Error::PayloadTooLargeForPlatform` if the length does not fit `usize`
    pub fn decode(buf: &[u8]) -> Result<Decode<Self>> {
        let Some(&byte0) = buf.first() else {
            return Ok(Decode::Incomplete { needed: 2 });
        };

        let opcode = OpCode::from_u8(byte0 & OPCODE)?;

        let Some(&byte1) = buf.get(1) else {
            return Ok(Decode::Incomplete { needed: 1 });
        };

        let masked = byte1 & MASK != 0;
        let len7 = byte1 & LEN7;

        let extended_len = match len7 {
            LEN_16_SENTINEL => 2,
            LEN_64_SENTINEL => 8,
            _ => 0,
        };
        let mask_len = if masked { 4 } else { 0 };
        let header_len = 2 + extended_len + mask_len;

        if buf.len() < header_len {
            return Ok(Decode::Incomplete {
                needed: header_len - buf.len(),
            });
        }

        let payload_len = match len7 {
            LEN_16_SENTINEL => u64::from(u16::from_be_bytes([buf[2], buf[3]])),
            LEN_64_SENTINEL => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(&buf[2..10]);
                let len = u64::from_be_bytes(raw);
                if len >> 63 != 0 {
                    return Err(Error::PayloadLengthMsbSet(len));
                }
                len
            }
            short => u64::from(short),
        };

        let mask = masked.then(|| {
            let at = 2 + extended_len;
            [buf[at], buf[at + 1], buf[at + 2], buf[at + 3]]
        });

        let header = FrameHeader {
            fin: byte0 & FIN != 0,
            rsv1: byte0 & RSV1 != 0,
            rsv2: byte0 & RSV2 != 0,
            rsv3: byte0 & RSV3 != 0,
            opcode,
            mask,
            payload_len,
            header_len,
        };
        header.payload_len_usize()?;

        Ok(Decode::Complete(header))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(buf: &[u8]) -> FrameHeader {
        match FrameHeader::decode(buf).unwrap() {
            Decode::Complete(header) => header,
            Decode::Incomplete { needed } => panic!("expected complete header, need {needed}"),
        }
    }

    fn needed(buf: &[u8]) -> usize {
        match FrameHeader::decode(buf).unwrap() {
            Decode::Incomplete { needed } => needed,
            Decode::Complete(header) => panic!("expected incomplete header, got {header:?}"),
        }
    }

    #[test]
    fn test_short_unmasked_header() {
        let header = complete(&[0x81, 0x05, b'H']);
        assert!(header.fin);
        assert!(!header.rsv_bits_set());
        assert_eq!(header.opcode, OpCode::Text);
        assert_eq!(header.mask, None);
        assert_eq!(header.payload_len, 5);
        assert_eq!(header.header_len, 2);
    }

    #[test]
    fn test_masked_header_carries_key() {
        let header = complete(&[0x81, 0x85, 0x37, 0xfa, 0x21, 0x3d]);
        assert!(header.masked());
        assert_eq!(header.mask, Some([0x37, 0xfa, 0x21, 0x3d]));
        assert_eq!(header.header_len, 6);
    }

    #[test]
    fn test_16_bit_length() {
        let header = complete(&[0x82, 0x7e, 0x01, 0x00]);
        assert_eq!(header.payload_len, 256);
        assert_eq!(header.header_len, 4);

        let header = complete(&[0x82, 0xfe, 0xff, 0xff, 1, 2, 3, 4]);
        assert_eq!(header.payload_len, 65535);
        assert_eq!(header.mask, Some([1, 2, 3, 4]));
        assert_eq!(header.header_len, 8);
    }

    #[test]
    fn test_64_bit_length() {
        let mut buf = vec![0x82, 0x7f];
        buf.extend_from_slice(&65536u64.to_be_bytes());
        let header = complete(&buf);
        assert_eq!(header.payload_len, 65536);
        assert_eq!(header.header_len, 10);
    }

    #[test]
    fn test_non_minimal_length_encoding_accepted() {
        let header = complete(&[0x82, 0x7e, 0x00, 0x05]);
        assert_eq!(header.payload_len, 5);
    }

    #[test]
    fn test_incomplete_at_every_stage() {
        assert_eq!(needed(&[]), 2);
        assert_eq!(needed(&[0x81]), 1);
        assert_eq!(needed(&[0x82, 0x7e, 0x01]), 1);
        assert_eq!(needed(&[0x82, 0x7f, 0x00, 0x00, 0x00]), 5);
        assert_eq!(needed(&[0x81, 0x85, 0x37, 0xfa]), 2);
        assert_eq!(needed(&[0x82, 0xff, 0, 0, 0, 0, 0, 0, 1, 0]), 4);
    }

    #[test]
    fn test_reserved_opcode_detected_from_first_byte() {
        assert_eq!(
            FrameHeader::decode(&[0x83]),
            Err(Error::ReservedOpcode(0x3))
        );
        assert_eq!(
            FrameHeader::decode(&[0x8b, 0x00]),
            Err(Error::ReservedOpcode(0xB))
        );
    }

    #[test]
    fn test_rsv_bits_reported() {
        let header = complete(&[0xf1, 0x00]);
        assert!(header.rsv1 && header.rsv2 && header.rsv3);
        assert!(header.rsv_bits_set());
    }

    #[test]
    fn test_length_msb_rejected() {
        let mut buf = vec![0x82, 0x7f];
        buf.extend_from_slice(&u64::MAX.to_be_bytes());
        assert_eq!(
            FrameHeader::decode(&buf),
            Err(Error::PayloadLengthMsbSet(u64::MAX))
        );
    }

    #[test]
    fn test_largest_legal_length_decodes_on_64_bit() {
        let mut buf = vec![0x82, 0x7f];
        buf.extend_from_slice(&(u64::MAX >> 1).to_be_bytes());
        let result = FrameHeader::decode(&buf);
        if cfg!(target_pointer_width = "64") {
            assert!(matches!(result, Ok(Decode::Complete(h)) if h.payload_len == u64::MAX >> 1));
        } else {
            assert!(matches!(result, Err(Error::PayloadTooLargeForPlatform { .. })));
        }
    }
}
