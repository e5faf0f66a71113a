//! Message reassembly from data frames (RFC 6455 Section 5.4).

use bytes::BytesMut;

use crate::config::Limits;
use crate::error::{Error, Result};
use crate::message::Message;
use crate::protocol::utf8::Utf8Validator;
use crate::protocol::{Frame, OpCode};

/// Reassembles fragmented data messages.
///
/// Only data frames belong here; control frames are dispatched by the decoder
/// as they arrive and never touch the message in progress.
#[derive(Debug)]
pub struct MessageAssembler {
    buffer: BytesMut,
    fragment_count: usize,
    opcode: Option<OpCode>,
    utf8: Utf8Validator,
    limits: Limits,
}

impl MessageAssembler {
    /// Create an assembler enforcing `limits`.
    #[must_use]
    pub fn new(limits: Limits) -> Self {
        Self {
            buffer: BytesMut::new(),
            fragment_count: 0,
            opcode: None,
            utf8: Utf8Validator::new(),
            limits,
        }
    }

    /// Add a data frame to the message being assembled.
    ///
    /// Returns the finished message when the frame has FIN set.
    ///
    /// # Errors
    ///
    /// - `Error::ProtocolViolation` for a continuation with no message in
    ///   progress, or a new Text/Binary frame while one is
    /// - `Error::InvalidUtf8` as soon as a text fragment cannot be valid UTF-8
    /// - `Error::MessageTooLarge` / `Error::TooManyFragments` when limits are hit
    pub fn push(&mut self, frame: Frame) -> Result<Option<Message>> {
        debug_assert!(frame.opcode.is_data());

        let opcode = match (frame.opcode, self.opcode) {
            (OpCode::Continuation, Some(opcode)) => opcode,
            (OpCode::Continuation, None) => {
                return Err(Error::ProtocolViolation(
                    "continuation frame without a message in progress".into(),
                ));
            }
            (_, Some(opcode)) => {
                return Err(Error::ProtocolViolation(format!(
                    "{} frame while a fragmented {} message is in progress",
                    frame.opcode, opcode
                )));
            }
            (opcode, None) => opcode,
        };

        self.limits
            .check_fragment_count(self.fragment_count + 1)?;
        let size = self
            .buffer
            .len()
            .saturating_add(frame.payload().len());
        self.limits.check_message_size(size)?;

        if opcode == OpCode::Text {
            self.utf8.validate(frame.payload(), frame.fin)?;
        }

        if frame.fin && self.opcode.is_none() {
            return finish(opcode, Vec::from(frame.payload)).map(Some);
        }

        self.opcode = Some(opcode);
        self.fragment_count += 1;
        self.buffer.extend_from_slice(frame.payload());

        if !frame.fin {
            return Ok(None);
        }

        let payload = Vec::from(std::mem::take(&mut self.buffer));
        self.reset();
        finish(opcode, payload).map(Some)
    }

    /// Whether a fragmented message is in progress.
    #[must_use]
    pub fn is_assembling(&self) -> bool {
        self.opcode.is_some()
    }

    /// Bytes held for the message in progress.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Abandon the message in progress.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.fragment_count = 0;
        self.opcode = None;
        self.utf8.reset();
    }
}

fn finish(opcode: OpCode, payload: Vec<u8>) -> Result<Message> {
    match opcode {
        OpCode::Text => Ok(Message::Text(String::from_utf8(payload)?)),
        _ => Ok(Message::Binary(payload)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_limits() -> Limits {
        Limits::new(1024, 100, 3)
    }

    #[test]
    fn test_single_frame_message() {
        let mut assembler = MessageAssembler::new(Limits::default());
        let msg = assembler.push(Frame::text(&b"Hello"[..])).unwrap();
        assert_eq!(msg, Some(Message::Text("Hello".into())));
        assert!(!assembler.is_assembling());
    }

    #[test]
    fn test_two_fragment_message() {
        let mut assembler = MessageAssembler::new(Limits::default());

        let first = Frame::new(false, OpCode::Text, &b"Hel"[..]);
        assert!(assembler.push(first).unwrap().is_none());
        assert!(assembler.is_assembling());
        assert_eq!(assembler.buffered_len(), 3);

        let last = Frame::continuation(true, &b"lo"[..]);
        let msg = assembler.push(last).unwrap();
        assert_eq!(msg, Some(Message::Text("Hello".into())));
        assert!(!assembler.is_assembling());
        assert_eq!(assembler.buffered_len(), 0);
    }

    #[test]
    fn test_many_fragments() {
        let mut assembler = MessageAssembler::new(Limits::default());

        assert!(assembler.push(Frame::new(false, OpCode::Binary, vec![1u8, 2])).unwrap().is_none());
        assert!(assembler.push(Frame::continuation(false, vec![3u8, 4])).unwrap().is_none());
        assert!(assembler.push(Frame::continuation(false, Vec::<u8>::new())).unwrap().is_none());

        let msg = assembler.push(Frame::continuation(true, vec![5u8, 6])).unwrap();
        assert_eq!(msg, Some(Message::Binary(vec![1, 2, 3, 4, 5, 6])));
    }

    #[test]
    fn test_buffer_handed_off_between_messages() {
        let mut assembler = MessageAssembler::new(Limits::default());

        assembler.push(Frame::new(false, OpCode::Text, &b"first "[..])).unwrap();
        let msg = assembler.push(Frame::continuation(true, &b"message"[..])).unwrap();
        assert_eq!(msg, Some(Message::Text("first message".into())));
        assert_eq!(assembler.buffered_len(), 0);

        assembler.push(Frame::new(false, OpCode::Binary, vec![9u8])).unwrap();
        assert_eq!(assembler.buffered_len(), 1);
        let msg = assembler.push(Frame::continuation(true, vec![8u8, 7])).unwrap();
        assert_eq!(msg, Some(Message::Binary(vec![9, 8, 7])));

        let msg = assembler.push(Frame::binary(vec![1u8, 2])).unwrap();
        assert_eq!(msg, Some(Message::Binary(vec![1, 2])));
    }

    #[test]
    fn test_continuation_without_start_fails() {
        let mut assembler = MessageAssembler::new(Limits::default());
        let result = assembler.push(Frame::continuation(true, &b"data"[..]));
        assert!(matches!(result, Err(Error::ProtocolViolation(_))));
    }

    #[test]
    fn test_new_message_without_continuation_fails() {
        let mut assembler = MessageAssembler::new(Limits::default());
        assembler.push(Frame::new(false, OpCode::Text, &b"first"[..])).unwrap();

        let result = assembler.push(Frame::binary(&b"second"[..]));
        assert!(matches!(result, Err(Error::ProtocolViolation(_))));
    }

    #[test]
    fn test_max_message_size_exceeded() {
        let mut assembler = MessageAssembler::new(small_limits());
        let result = assembler.push(Frame::binary(vec![0u8; 150]));
        assert_eq!(
            result,
            Err(Error::MessageTooLarge {
                size: 150,
                max: 100
            })
        );
    }

    #[test]
    fn test_message_size_summed_over_fragments() {
        let mut assembler = MessageAssembler::new(small_limits());
        assembler.push(Frame::new(false, OpCode::Binary, vec![0u8; 60])).unwrap();
        let result = assembler.push(Frame::continuation(true, vec![0u8; 60]));
        assert!(matches!(result, Err(Error::MessageTooLarge { size: 120, .. })));
    }

    #[test]
    fn test_max_fragment_count_exceeded() {
        let mut assembler = MessageAssembler::new(small_limits());

        assert!(assembler.push(Frame::new(false, OpCode::Binary, vec![1u8])).is_ok());
        assert!(assembler.push(Frame::continuation(false, vec![2u8])).is_ok());
        assert!(assembler.push(Frame::continuation(false, vec![3u8])).is_ok());

        let result = assembler.push(Frame::continuation(true, vec![4u8]));
        assert_eq!(result, Err(Error::TooManyFragments { count: 4, max: 3 }));
    }

    #[test]
    fn test_code_point_split_across_fragments() {
        let mut assembler = MessageAssembler::new(Limits::default());

        let first = Frame::new(false, OpCode::Text, vec![0xf0u8, 0x9f]);
        assert!(assembler.push(first).unwrap().is_none());

        let last = Frame::continuation(true, vec![0x8eu8, 0x89]);
        let msg = assembler.push(last).unwrap();
        assert_eq!(msg, Some(Message::Text("🎉".into())));
    }

    #[test]
    fn test_invalid_utf8_fails_on_offending_fragment() {
        let mut assembler = MessageAssembler::new(Limits::default());

        let first = Frame::new(false, OpCode::Text, vec![b'o', b'k', 0xff]);
        assert_eq!(assembler.push(first), Err(Error::InvalidUtf8));
    }

    #[test]
    fn test_binary_message_skips_utf8_validation() {
        let mut assembler = MessageAssembler::new(Limits::default());
        let msg = assembler.push(Frame::binary(vec![0x80u8, 0x81, 0xff])).unwrap();
        assert_eq!(msg, Some(Message::Binary(vec![0x80, 0x81, 0xff])));
    }

    #[test]
    fn test_reset() {
        let mut assembler = MessageAssembler::new(Limits::default());

        assembler.push(Frame::new(false, OpCode::Text, vec![b'a', 0xe2])).unwrap();
        assert!(assembler.is_assembling());

        assembler.reset();
        assert!(!assembler.is_assembling());

        let msg = assembler.push(Frame::text(&b"fresh"[..])).unwrap();
        assert_eq!(msg, Some(Message::Text("fresh".into())));
    }
}
