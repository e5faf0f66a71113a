//! # wsfeed - incremental RFC 6455 frame decoding
//!
//! `wsfeed` turns a WebSocket byte stream, delivered in chunks of any size,
//! into complete messages and control events. It performs no I/O: the caller
//! reads from its transport and hands each chunk to [`Decoder::feed`].
//!
//! ## Features
//!
//! - **Split-safe**: headers, extended lengths, mask keys and payloads may be
//!   cut at any byte; events are the same for every partition of the stream
//! - **Fragmentation**: continuation frames are reassembled, with control frames
//!   interleaved freely
//! - **Strict validation**: opcodes, reserved bits, control-frame rules,
//!   incremental UTF-8, close payloads and optional masking direction
//! - **Opt-in limits** on frame size, message size and fragment count
//!
//! ## Quick Start
//!
//! ```rust
//! use wsfeed::{CloseCode, Config, Decoder, Frame};
//!
//! let mut decoder = Decoder::new(Config::server());
//! decoder.on_close(|close| assert_eq!(close.code(), Some(CloseCode::GoingAway)));
//!
//! let mut wire = Frame::text("Hello").encode(Some([7, 7, 7, 7]));
//! wire.extend_from_slice(&Frame::close(Some(1001), "Goodbye!").encode(Some([1, 2, 3, 4])));
//!
//! let messages = decoder.feed(&wire);
//! assert_eq!(messages[0].as_text(), Some("Hello"));
//! ```

pub mod config;
pub mod decoder;
pub mod dispatch;
pub mod error;
pub mod message;
pub mod protocol;

pub use config::{Config, Limits};
pub use decoder::Decoder;
pub use dispatch::{Event, Handlers};
pub use error::{Error, Result};
pub use message::{CloseCode, CloseFrame, CloseStatus, Message};
pub use protocol::{Frame, OpCode, Role};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn test_public_types_are_send() {
        assert_send::<Decoder>();
        assert_send::<Error>();
        assert_send::<Config>();
        assert_send::<Limits>();
        assert_send::<Message>();
        assert_send::<Event>();
        assert_send::<CloseFrame>();
        assert_send::<Frame>();
        assert_send::<Role>();
    }

    #[test]
    fn test_value_types_are_sync() {
        assert_sync::<Error>();
        assert_sync::<Config>();
        assert_sync::<Limits>();
        assert_sync::<Message>();
        assert_sync::<Event>();
        assert_sync::<CloseCode>();
        assert_sync::<CloseFrame>();
        assert_sync::<Frame>();
        assert_sync::<Role>();
    }
}
