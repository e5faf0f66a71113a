//! Event routing to user handlers.

use std::fmt;

use bytes::Bytes;

use crate::error::Error;
use crate::message::{CloseFrame, Message};

/// Something the decoder observed in the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A complete data message.
    Message(Message),
    /// A Ping frame and its payload.
    Ping(Bytes),
    /// A Pong frame and its payload.
    Pong(Bytes),
    /// A Close frame.
    Close(CloseFrame),
    /// A fatal decoding error.
    Error(Error),
}

type MessageHandler = Box<dyn FnMut(&Message) + Send>;
type ErrorHandler = Box<dyn FnMut(&Error) + Send>;
type CloseHandler = Box<dyn FnMut(&CloseFrame) + Send>;
type PayloadHandler = Box<dyn FnMut(&[u8]) + Send>;

/// One optional handler per event kind.
///
/// Setting a handler replaces the previous one of that kind. Events with no
/// handler are dropped.
#[derive(Default)]
pub struct Handlers {
    message: Option<MessageHandler>,
    error: Option<ErrorHandler>,
    close: Option<CloseHandler>,
    ping: Option<PayloadHandler>,
    pong: Option<PayloadHandler>,
}

impl Handlers {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler for completed text and binary messages.
    pub fn set_message(&mut self, handler: impl FnMut(&Message) + Send + 'static) {
        self.message = Some(Box::new(handler));
    }

    /// Handler for the error that poisons the decoder.
    pub fn set_error(&mut self, handler: impl FnMut(&Error) + Send + 'static) {
        self.error = Some(Box::new(handler));
    }

    /// Handler for parsed Close frames.
    pub fn set_close(&mut self, handler: impl FnMut(&CloseFrame) + Send + 'static) {
        self.close = Some(Box::new(handler));
    }

    /// Handler for Ping payloads.
    pub fn set_ping(&mut self, handler: impl FnMut(&[u8]) + Send + 'static) {
        self.ping = Some(Box::new(handler));
    }

    /// Handler for Pong payloads.
    pub fn set_pong(&mut self, handler: impl FnMut(&[u8]) + Send + 'static) {
        self.pong = Some(Box::new(handler));
    }

    /// Route `event` to the matching handler, if one is registered.
    pub fn dispatch(&mut self, event: &Event) {
        match event {
            Event::Message(message) => {
                if let Some(handler) = self.message.as_mut() {
                    handler(message);
                }
            }
            Event::Ping(payload) => {
                if let Some(handler) = self.ping.as_mut() {
                    handler(&payload[..]);
                }
            }
            Event::Pong(payload) => {
                if let Some(handler) = self.pong.as_mut() {
                    handler(&payload[..]);
                }
            }
            Event::Close(close) => {
                if let Some(handler) = self.close.as_mut() {
                    handler(close);
                }
            }
            Event::Error(error) => {
                if let Some(handler) = self.error.as_mut() {
                    handler(error);
                }
            }
        }
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handlers")
            .field("message", &self.message.is_some())
            .field("error", &self.error.is_some())
            .field("close", &self.close.is_some())
            .field("ping", &self.ping.is_some())
            .field("pong", &self.pong.is_some())
            .finish()
    }
}
