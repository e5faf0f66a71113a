//! WebSocket frames: the decoded form, one-shot parsing, and encoding.
//!
//! The streaming decoder never calls [`Frame::parse`]; it is for callers that
//! already hold a whole frame. The encoder produces the byte sequences the
//! decoder consumes and exists for fixtures, benchmarks and downstream tests.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};
use crate::protocol::OpCode;
use crate::protocol::header::{Decode, FrameHeader, LEN_16_SENTINEL, LEN_64_SENTINEL};
use crate::protocol::mask::{apply_mask_at, apply_mask_fast};

/// Largest payload carried by the 7-bit length field alone.
const MAX_SHORT_LEN: usize = 125;

/// A single physical WebSocket frame with an unmasked payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Frame {
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
    /// Key the payload was masked with on the wire, if any.
    pub mask: Option<[u8; 4]>,
    /// Payload after unmasking.
    pub payload: Bytes,
}

impl Frame {
    /// Create a frame with no reserved bits set.
    #[must_use]
    pub fn new(fin: bool, opcode: OpCode, payload: impl Into<Bytes>) -> Self {
        Self {
            fin,
            rsv1: false,
            rsv2: false,
            rsv3: false,
            opcode,
            mask: None,
            payload: payload.into(),
        }
    }

    pub(crate) fn from_header(header: &FrameHeader, payload: Bytes) -> Self {
        Self {
            fin: header.fin,
            rsv1: header.rsv1,
            rsv2: header.rsv2,
            rsv3: header.rsv3,
            opcode: header.opcode,
            mask: header.mask,
            payload,
        }
    }

    /// Create a final text frame.
    #[must_use]
    pub fn text(data: impl Into<Bytes>) -> Self {
        Self::new(true, OpCode::Text, data)
    }

    /// Create a final binary frame.
    #[must_use]
    pub fn binary(data: impl Into<Bytes>) -> Self {
        Self::new(true, OpCode::Binary, data)
    }

    /// Create a continuation frame.
    #[must_use]
    pub fn continuation(fin: bool, data: impl Into<Bytes>) -> Self {
        Self::new(fin, OpCode::Continuation, data)
    }

    /// Create a close frame. Without a code the payload is empty and `reason`
    /// is ignored.
    #[must_use]
    pub fn close(code: Option<u16>, reason: &str) -> Self {
        let payload = match code {
            Some(code) => {
                let mut data = BytesMut::with_capacity(2 + reason.len());
                data.put_u16(code);
                data.put_slice(reason.as_bytes());
                data.freeze()
            }
            None => Bytes::new(),
        };
        Self::new(true, OpCode::Close, payload)
    }

    /// Create a ping frame.
    #[must_use]
    pub fn ping(data: impl Into<Bytes>) -> Self {
        Self::new(true, OpCode::Ping, data)
    }

    /// Create a pong frame.
    #[must_use]
    pub fn pong(data: impl Into<Bytes>) -> Self {
        Self::new(true, OpCode::Pong, data)
    }

    /// Whether the frame arrived masked.
    #[inline]
    #[must_use]
    pub const fn masked(&self) -> bool {
        self.mask.is_some()
    }

    /// Payload bytes.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload length as it would appear on the wire.
    #[inline]
    #[must_use]
    pub fn payload_len(&self) -> u64 {
        self.payload.len() as u64
    }

    /// Parse one complete frame from the front of `buf`.
    ///
    /// Returns the frame and the number of bytes consumed.
    ///
    /// # Errors
    ///
    /// - `Error::IncompleteFrame` if `buf` ends before the frame does
    /// - any header error from [`FrameHeader::decode`]
    pub fn parse(buf: &[u8]) -> Result<(Self, usize)> {
        let header = match FrameHeader::decode(buf)? {
            Decode::Complete(header) => header,
            Decode::Incomplete { needed } => return Err(Error::IncompleteFrame { needed }),
        };

        let payload_len = header.payload_len_usize()?;
        let total = header.header_len.checked_add(payload_len).ok_or(
            Error::PayloadTooLargeForPlatform {
                size: header.payload_len,
                max: usize::MAX as u64,
            },
        )?;

        if buf.len() < total {
            return Err(Error::IncompleteFrame {
                needed: total - buf.len(),
            });
        }

        let mut payload = BytesMut::from(&buf[header.header_len..total]);
        if let Some(mask) = header.mask {
            apply_mask_fast(&mut payload, mask);
        }

        Ok((Self::from_header(&header, payload.freeze()), total))
    }

    /// Number of bytes [`encode`](Self::encode) produces.
    #[must_use]
    pub fn wire_size(&self, masked: bool) -> usize {
        let payload_len = self.payload.len();
        let extended_len = if payload_len <= MAX_SHORT_LEN {
            0
        } else if payload_len <= usize::from(u16::MAX) {
            2
        } else {
            8
        };
        let mask_len = if masked { 4 } else { 0 };
        2 + extended_len + mask_len + payload_len
    }

    /// Encode the frame, masking the payload with `mask` if given.
    ///
    /// Lengths always use the shortest encoding.
    #[must_use]
    pub fn encode(&self, mask: Option<[u8; 4]>) -> BytesMut {
        let mut dst = BytesMut::with_capacity(self.wire_size(mask.is_some()));
        self.encode_into(&mut dst, mask);
        dst
    }

    /// Write the encoded frame into `buf`, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns `Error::BufferTooSmall` if `buf` cannot hold the frame.
    pub fn write(&self, buf: &mut [u8], mask: Option<[u8; 4]>) -> Result<usize> {
        let needed = self.wire_size(mask.is_some());
        if buf.len() < needed {
            return Err(Error::BufferTooSmall {
                needed,
                available: buf.len(),
            });
        }
        let mut dst = &mut buf[..needed];
        self.encode_into(&mut dst, mask);
        Ok(needed)
    }

    /// Append the encoded frame to any [`BufMut`].
    pub fn encode_into<B: BufMut>(&self, dst: &mut B, mask: Option<[u8; 4]>) {
        let mut byte0 = self.opcode.as_u8();
        if self.fin {
            byte0 |= 0x80;
        }
        if self.rsv1 {
            byte0 |= 0x40;
        }
        if self.rsv2 {
            byte0 |= 0x20;
        }
        if self.rsv3 {
            byte0 |= 0x10;
        }
        dst.put_u8(byte0);

        let mask_bit = if mask.is_some() { 0x80 } else { 0x00 };
        let payload_len = self.payload.len();
        if payload_len <= MAX_SHORT_LEN {
            dst.put_u8(mask_bit | payload_len as u8);
        } else if let Ok(len) = u16::try_from(payload_len) {
            dst.put_u8(mask_bit | LEN_16_SENTINEL);
            dst.put_u16(len);
        } else {
            dst.put_u8(mask_bit | LEN_64_SENTINEL);
            dst.put_u64(payload_len as u64);
        }

        match mask {
            None => dst.put_slice(&self.payload),
            Some(key) => {
                dst.put_slice(&key);
                let mut scratch = [0u8; 256];
                let mut offset = 0;
                for piece in self.payload.chunks(scratch.len()) {
                    let out = &mut scratch[..piece.len()];
                    out.copy_from_slice(piece);
                    apply_mask_at(out, key, offset);
                    dst.put_slice(out);
                    offset += piece.len();
                }
            }
        }
    }
}
