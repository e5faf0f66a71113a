//! The incremental stream decoder.
//!
//! [`Decoder`] owns everything needed to resume decoding at any byte
//! boundary: the bytes received but not yet consumed, the current stage of the
//! frame being decoded, the message being reassembled and the handler table.
//! Feeding the same stream in any partition produces the same events.
//!
//! # Error recovery
//!
//! A fatal error poisons the decoder. Frame boundaries are unknown after a
//! malformed header, so no attempt is made to resynchronize: the error handler
//! fires once, buffered state is dropped and later input is discarded until
//! [`Decoder::reset`] is called.

use bytes::{Buf, BytesMut};
use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::dispatch::{Event, Handlers};
use crate::error::{Error, Result};
use crate::message::{CloseFrame, Message};
use crate::protocol::header::{Decode, FrameHeader};
use crate::protocol::payload::PayloadAccumulator;
use crate::protocol::{Frame, FrameValidator, MessageAssembler, OpCode};

/// Decode stage of the frame at the front of the stream.
#[derive(Debug)]
enum State {
    /// Waiting for a complete header.
    Header,
    /// Header consumed; collecting its payload.
    Payload(PayloadAccumulator),
    /// A fatal error was reported; input is ignored.
    Failed,
}

/// Incremental RFC 6455 frame decoder for one connection.
///
/// ```
/// use wsfeed::{Decoder, Frame, Message};
///
/// let wire = Frame::text("Hello").encode(Some([1, 2, 3, 4]));
/// let mut decoder = Decoder::default();
///
/// assert!(decoder.feed(&wire[..3]).is_empty());
/// assert_eq!(decoder.feed(&wire[3..]), vec![Message::text("Hello")]);
/// ```
#[derive(Debug)]
pub struct Decoder {
    buffer: BytesMut,
    state: State,
    validator: FrameValidator,
    assembler: MessageAssembler,
    handlers: Handlers,
    config: Config,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Decoder {
    /// Create a decoder with no handlers registered.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            buffer: BytesMut::with_capacity(config.buffer_capacity),
            state: State::Header,
            validator: FrameValidator::new(config.role, config.limits.clone()),
            assembler: MessageAssembler::new(config.limits.clone()),
            handlers: Handlers::new(),
            config,
        }
    }

    /// Handle each completed text or binary message.
    pub fn on_message(&mut self, handler: impl FnMut(&Message) + Send + 'static) -> &mut Self {
        self.handlers.set_message(handler);
        self
    }

    /// Handle the fatal error that poisons the decoder.
    pub fn on_error(&mut self, handler: impl FnMut(&Error) + Send + 'static) -> &mut Self {
        self.handlers.set_error(handler);
        self
    }

    /// Handle Close frames.
    pub fn on_close(&mut self, handler: impl FnMut(&CloseFrame) + Send + 'static) -> &mut Self {
        self.handlers.set_close(handler);
        self
    }

    /// Handle Ping payloads.
    pub fn on_ping(&mut self, handler: impl FnMut(&[u8]) + Send + 'static) -> &mut Self {
        self.handlers.set_ping(handler);
        self
    }

    /// Handle Pong payloads.
    pub fn on_pong(&mut self, handler: impl FnMut(&[u8]) + Send + 'static) -> &mut Self {
        self.handlers.set_pong(handler);
        self
    }

    /// Feed the next chunk of the stream.
    ///
    /// Returns the data messages completed by this chunk, in stream order.
    /// Control frames and errors reach their handlers as they are decoded;
    /// messages reach the message handler as well as the returned vector.
    ///
    /// An empty chunk does nothing.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Message> {
        let mut messages = Vec::new();
        if chunk.is_empty() {
            return messages;
        }
        if self.is_poisoned() {
            debug!(len = chunk.len(), "dropping input on poisoned decoder");
            return messages;
        }

        self.buffer.extend_from_slice(chunk);

        loop {
            let frame = match self.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(err) => {
                    self.fail(err);
                    break;
                }
            };

            match self.handle_frame(frame) {
                Ok(Some(event)) => {
                    self.handlers.dispatch(&event);
                    if let Event::Message(message) = event {
                        messages.push(message);
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    self.fail(err);
                    break;
                }
            }
        }

        messages
    }

    /// Advance the state machine by at most one frame.
    ///
    /// `Ok(None)` means more input is needed.
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        match &mut self.state {
            State::Header => {
                let header = match FrameHeader::decode(&self.buffer)? {
                    Decode::Complete(header) => header,
                    Decode::Incomplete { needed } => {
                        trace!(buffered = self.buffer.len(), needed, "header incomplete");
                        return Ok(None);
                    }
                };
                self.validator.validate(&header)?;
                trace!(
                    opcode = %header.opcode,
                    fin = header.fin,
                    masked = header.masked(),
                    len = header.payload_len,
                    "frame header"
                );
                self.buffer.advance(header.header_len);
                self.state = State::Payload(PayloadAccumulator::new(header)?);
                self.next_frame()
            }
            State::Payload(payload) => {
                let Some(frame) = payload.fill(&mut self.buffer) else {
                    trace!(
                        received = payload.received(),
                        remaining = payload.remaining(),
                        "payload incomplete"
                    );
                    return Ok(None);
                };
                self.state = State::Header;
                trace!(opcode = %frame.opcode, len = frame.payload.len(), "frame complete");
                Ok(Some(frame))
            }
            State::Failed => Ok(None),
        }
    }

    /// Turn a complete frame into an event, if it finishes one.
    fn handle_frame(&mut self, frame: Frame) -> Result<Option<Event>> {
        let event = match frame.opcode {
            OpCode::Ping => Event::Ping(frame.payload),
            OpCode::Pong => Event::Pong(frame.payload),
            OpCode::Close => {
                let close = CloseFrame::parse(&frame.payload)?;
                debug!(code = ?close.raw_code(), reason = %close.reason, "close frame");
                Event::Close(close)
            }
            OpCode::Text | OpCode::Binary | OpCode::Continuation => {
                match self.assembler.push(frame)? {
                    Some(message) => {
                        debug!(text = message.is_text(), len = message.len(), "message complete");
                        Event::Message(message)
                    }
                    None => return Ok(None),
                }
            }
        };
        Ok(Some(event))
    }

    fn fail(&mut self, err: Error) {
        warn!(error = %err, "websocket decode failed, decoder poisoned");
        self.state = State::Failed;
        self.buffer.clear();
        self.assembler.reset();
        self.handlers.dispatch(&Event::Error(err));
    }

    /// Bytes held by the decoder: unconsumed input, the partial payload of the
    /// current frame and the message being reassembled.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        let partial = match &self.state {
            State::Payload(payload) => payload.received(),
            State::Header | State::Failed => 0,
        };
        self.buffer.len() + partial + self.assembler.buffered_len()
    }

    /// Whether a fragmented message is in progress.
    #[must_use]
    pub fn is_assembling(&self) -> bool {
        self.assembler.is_assembling()
    }

    /// Whether a fatal error has been reported.
    #[must_use]
    pub fn is_poisoned(&self) -> bool {
        matches!(self.state, State::Failed)
    }

    /// Drop all buffered state and clear poisoning. Handlers are kept.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.state = State::Header;
        self.assembler.reset();
    }

    /// The configuration this decoder was built with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}
