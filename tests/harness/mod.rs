//! Shared fixtures for the integration tests: wire encoding helpers and an
//! event recorder that captures everything a decoder reports.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};

use bytes::Bytes;
use tracing_subscriber::EnvFilter;
use wsfeed::{Config, Decoder, Event, Frame, Message};

pub const MASK: [u8; 4] = [0x37, 0xfa, 0x21, 0x3d];

/// Route decoder logs to the test writer. Set `RUST_LOG=wsfeed=trace` to see them.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Concatenate the wire encoding of `frames`.
pub fn encode_all(frames: &[Frame], mask: Option<[u8; 4]>) -> Vec<u8> {
    let mut wire = Vec::new();
    for frame in frames {
        wire.extend_from_slice(&frame.encode(mask));
    }
    wire
}

/// Records every event a decoder dispatches, in order.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Recorder {
    /// Register handlers for every event kind on `decoder`.
    pub fn attach(decoder: &mut Decoder) -> Self {
        let recorder = Self::default();

        let events = Arc::clone(&recorder.events);
        decoder.on_message(move |m| events.lock().unwrap().push(Event::Message(m.clone())));
        let events = Arc::clone(&recorder.events);
        decoder.on_ping(move |p| {
            events
                .lock()
                .unwrap()
                .push(Event::Ping(Bytes::copy_from_slice(p)));
        });
        let events = Arc::clone(&recorder.events);
        decoder.on_pong(move |p| {
            events
                .lock()
                .unwrap()
                .push(Event::Pong(Bytes::copy_from_slice(p)));
        });
        let events = Arc::clone(&recorder.events);
        decoder.on_close(move |c| events.lock().unwrap().push(Event::Close(c.clone())));
        let events = Arc::clone(&recorder.events);
        decoder.on_error(move |e| events.lock().unwrap().push(Event::Error(e.clone())));

        recorder
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    pub fn errors(&self) -> Vec<wsfeed::Error> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Error(e) => Some(e),
                _ => None,
            })
            .collect()
    }
}

/// A decoder with a recorder attached.
pub fn recording_decoder(config: Config) -> (Decoder, Recorder) {
    init_tracing();
    let mut decoder = Decoder::new(config);
    let recorder = Recorder::attach(&mut decoder);
    (decoder, recorder)
}

/// Feed `wire` split at the given ascending cut points and collect the
/// returned messages.
pub fn feed_split(decoder: &mut Decoder, wire: &[u8], cuts: &[usize]) -> Vec<Message> {
    let mut messages = Vec::new();
    let mut start = 0;
    for &cut in cuts {
        messages.extend(decoder.feed(&wire[start..cut]));
        start = cut;
    }
    messages.extend(decoder.feed(&wire[start..]));
    messages
}

/// Feed `wire` one byte at a time.
pub fn feed_bytewise(decoder: &mut Decoder, wire: &[u8]) -> Vec<Message> {
    wire.iter()
        .flat_map(|b| decoder.feed(std::slice::from_ref(b)))
        .collect()
}

/// Decode `wire` in one chunk with a fresh recording decoder.
pub fn decode_whole(config: Config, wire: &[u8]) -> (Vec<Message>, Vec<Event>) {
    let (mut decoder, recorder) = recording_decoder(config);
    let messages = decoder.feed(wire);
    (messages, recorder.events())
}
