//! Incremental UTF-8 validation for text messages.
//!
//! A code point may straddle two fragments. The validator keeps the unfinished
//! tail of one fragment (at most three bytes) and completes it from the front
//! of the next, so each fragment is checked once and the message fails on the
//! first fragment that cannot be valid UTF-8.

use crate::error::{Error, Result};

/// Incremental UTF-8 validator.
#[derive(Debug, Clone, Default)]
pub struct Utf8Validator {
    pending: [u8; 4],
    pending_len: usize,
}

/// Encoded length implied by a leading byte, for leads `from_utf8` can leave
/// incomplete.
const fn sequence_len(lead: u8) -> usize {
    match lead {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        _ => 4,
    }
}

impl Utf8Validator {
    /// Create a validator with no pending bytes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the next fragment of a text message.
    ///
    /// A non-final fragment may end inside a code point. The final fragment
    /// must leave nothing pending.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUtf8` on the first byte that rules out valid UTF-8.
    pub fn validate(&mut self, mut data: &[u8], is_final: bool) -> Result<()> {
        if self.pending_len > 0 {
            let width = sequence_len(self.pending[0]);
            let take = (width - self.pending_len).min(data.len());
            self.pending[self.pending_len..self.pending_len + take]
                .copy_from_slice(&data[..take]);
            self.pending_len += take;
            data = &data[take..];

            match std::str::from_utf8(&self.pending[..self.pending_len]) {
                Ok(_) => self.pending_len = 0,
                Err(e) if e.error_len().is_none() && !is_final => return Ok(()),
                Err(_) => return Err(Error::InvalidUtf8),
            }
        }

        match std::str::from_utf8(data) {
            Ok(_) => Ok(()),
            Err(e) if e.error_len().is_none() && !is_final => {
                let tail = &data[e.valid_up_to()..];
                self.pending[..tail.len()].copy_from_slice(tail);
                self.pending_len = tail.len();
                Ok(())
            }
            Err(_) => Err(Error::InvalidUtf8),
        }
    }

    /// Discard any pending partial code point.
    pub fn reset(&mut self) {
        self.pending_len = 0;
    }

    /// Whether a partial code point is waiting for the next fragment.
    #[must_use]
    pub fn has_incomplete(&self) -> bool {
        self.pending_len > 0
    }
}

/// Validate a complete byte slice.
///
/// # Errors
///
/// Returns `Error::InvalidUtf8` if the data is not valid UTF-8.
pub fn validate_utf8(data: &[u8]) -> Result<&str> {
    Ok(std::str::from_utf8(data)?)
}
