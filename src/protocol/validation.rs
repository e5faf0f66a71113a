//! Header validation (RFC 6455 Sections 5.1, 5.2 and 5.5).
//!
//! Runs once per frame, right after the header is decoded and before any
//! payload byte is buffered, so an oversized or malformed frame is rejected
//! without allocating for it.

use crate::config::Limits;
use crate::error::{Error, Result};
use crate::protocol::Role;
use crate::protocol::header::FrameHeader;

/// Maximum payload size for control frames.
pub const MAX_CONTROL_FRAME_PAYLOAD: u64 = 125;

/// Validator for incoming frame headers.
#[derive(Debug, Clone)]
pub struct FrameValidator {
    /// Local role, if masking direction is enforced.
    role: Option<Role>,
    /// Size limits for frames.
    limits: Limits,
}

impl FrameValidator {
    /// Create a new frame validator.
    ///
    /// With `role == None` both masked and unmasked frames are accepted.
    pub fn new(role: Option<Role>, limits: Limits) -> Self {
        Self { role, limits }
    }

    /// Validate a decoded header.
    ///
    /// Checks run in order: masking, reserved bits, control-frame rules, size.
    ///
    /// # Errors
    ///
    /// - `Error::UnmaskedClientFrame` / `Error::MaskedServerFrame` on a masking mismatch
    /// - `Error::ReservedBitsSet` if RSV1-3 are set
    /// - `Error::FragmentedControlFrame` if a control frame has FIN=0
    /// - `Error::ControlFrameTooLarge` if a control payload exceeds 125 bytes
    /// - `Error::FrameTooLarge` if the payload exceeds `max_frame_size`
    pub fn validate(&self, header: &FrameHeader) -> Result<()> {
        self.validate_masking(header.masked())?;

        if header.rsv_bits_set() {
            return Err(Error::ReservedBitsSet);
        }

        if header.opcode.is_control() {
            if !header.fin {
                return Err(Error::FragmentedControlFrame);
            }
            if header.payload_len > MAX_CONTROL_FRAME_PAYLOAD {
                return Err(Error::ControlFrameTooLarge(header.payload_len));
            }
        }

        self.limits.check_frame_size(header.payload_len)
    }

    fn validate_masking(&self, masked: bool) -> Result<()> {
        match self.role {
            Some(role) if role.expects_masked() != masked => Err(if masked {
                Error::MaskedServerFrame
            } else {
                Error::UnmaskedClientFrame
            }),
            _ => Ok(()),
        }
    }
}
