//! Payload accumulation across deliveries.
//!
//! Once a header is decoded the decoder knows exactly how many payload bytes
//! follow. [`PayloadAccumulator`] takes whatever part of them is available,
//! unmasks it in place and keeps it until the declared length is reached.
//! Bytes are moved out of the input buffer as they are taken, so a slow peer
//! never causes the same bytes to be copied twice.

use bytes::BytesMut;

use crate::error::Result;
use crate::protocol::frame::Frame;
use crate::protocol::header::FrameHeader;
use crate::protocol::mask::apply_mask_at;

/// Accumulates the payload of one frame.
#[derive(Debug)]
pub struct PayloadAccumulator {
    header: FrameHeader,
    payload: BytesMut,
    expected: usize,
}

impl PayloadAccumulator {
    /// Start accumulating the payload announced by `header`.
    ///
    /// Capacity is reserved lazily, as bytes arrive, so a header announcing a
    /// huge payload does not allocate for bytes the peer never sends.
    ///
    /// # Errors
    ///
    /// Returns `Error::PayloadTooLargeForPlatform` if the declared length does
    /// not fit `usize`.
    pub fn new(header: FrameHeader) -> Result<Self> {
        Ok(Self {
            expected: header.payload_len_usize()?,
            header,
            payload: BytesMut::new(),
        })
    }

    /// Payload bytes received so far.
    #[must_use]
    pub fn received(&self) -> usize {
        self.payload.len()
    }

    /// Payload bytes still outstanding.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.expected - self.payload.len()
    }

    /// Move up to [`remaining`](Self::remaining) bytes from the front of `src`.
    ///
    /// Returns the finished frame once the last payload byte has arrived. A
    /// zero-length payload completes on the first call.
    pub fn fill(&mut self, src: &mut BytesMut) -> Option<Frame> {
        let take = self.remaining().min(src.len());
        if take > 0 {
            let offset = self.payload.len();
            let mut chunk = src.split_to(take);
            if let Some(mask) = self.header.mask {
                apply_mask_at(&mut chunk, mask, offset);
            }
            if self.payload.is_empty() {
                self.payload = chunk;
            } else {
                self.payload.unsplit(chunk);
            }
        }

        if self.remaining() > 0 {
            return None;
        }

        let payload = std::mem::take(&mut self.payload).freeze();
        Some(Frame::from_header(&self.header, payload))
    }
}
