//! Decoder configuration and resource limits.

use crate::error::{Error, Result};
use crate::protocol::Role;

/// Resource limits applied while decoding.
///
/// The defaults are unbounded: only the wire format constrains frame and
/// message sizes. Callers that read from untrusted peers should install caps so
/// a stalled or hostile fragmented message cannot grow without bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum declared payload length of a single frame.
    ///
    /// Checked as soon as the header is decoded, before any payload is buffered.
    pub max_frame_size: usize,

    /// Maximum size of a reassembled message, summed over all fragments.
    pub max_message_size: usize,

    /// Maximum number of frames in a single message.
    pub max_fragment_count: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl Limits {
    /// Create new limits with custom values.
    #[must_use]
    pub const fn new(
        max_frame_size: usize,
        max_message_size: usize,
        max_fragment_count: usize,
    ) -> Self {
        Self {
            max_frame_size,
            max_message_size,
            max_fragment_count,
        }
    }

    /// No caps beyond what the wire format can express.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            max_frame_size: usize::MAX,
            max_message_size: usize::MAX,
            max_fragment_count: usize::MAX,
        }
    }

    /// Limits suitable for small embedded systems.
    ///
    /// - Max frame: 64 KB
    /// - Max message: 256 KB
    /// - Max fragments: 16
    #[must_use]
    pub const fn embedded() -> Self {
        Self {
            max_frame_size: 64 * 1024,
            max_message_size: 256 * 1024,
            max_fragment_count: 16,
        }
    }

    /// Validate a declared frame payload length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FrameTooLarge`] if `size` exceeds the configured maximum.
    pub const fn check_frame_size(&self, size: u64) -> Result<()> {
        if size > self.max_frame_size as u64 {
            Err(Error::FrameTooLarge {
                size,
                max: self.max_frame_size,
            })
        } else {
            Ok(())
        }
    }

    /// Validate an accumulated message size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MessageTooLarge`] if `size` exceeds the configured maximum.
    pub const fn check_message_size(&self, size: usize) -> Result<()> {
        if size > self.max_message_size {
            Err(Error::MessageTooLarge {
                size,
                max: self.max_message_size,
            })
        } else {
            Ok(())
        }
    }

    /// Validate the fragment count of the message being assembled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooManyFragments`] if `count` exceeds the configured maximum.
    pub const fn check_fragment_count(&self, count: usize) -> Result<()> {
        if count > self.max_fragment_count {
            Err(Error::TooManyFragments {
                count,
                max: self.max_fragment_count,
            })
        } else {
            Ok(())
        }
    }
}

/// Decoder configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Resource limits.
    pub limits: Limits,

    /// Role of the local endpoint.
    ///
    /// `None` accepts masked and unmasked frames alike. `Some(Role::Server)`
    /// rejects unmasked frames, `Some(Role::Client)` rejects masked ones.
    ///
    /// Default: None
    pub role: Option<Role>,

    /// Initial capacity of the unconsumed-byte buffer.
    ///
    /// Default: 8 KB (8192)
    pub buffer_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            role: None,
            buffer_capacity: 8192,
        }
    }
}

impl Config {
    /// Create a configuration that accepts any masking and has no caps.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure for the server side: incoming frames must be masked.
    #[must_use]
    pub fn server() -> Self {
        Self::default().with_role(Role::Server)
    }

    /// Configure for the client side: incoming frames must not be masked.
    #[must_use]
    pub fn client() -> Self {
        Self::default().with_role(Role::Client)
    }

    /// Set custom limits.
    #[must_use]
    pub const fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Enforce the masking direction of `role`.
    #[must_use]
    pub const fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Set the initial buffer capacity.
    #[must_use]
    pub const fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }
}
