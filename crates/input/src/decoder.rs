//! Terminal input decoder: parser output applied to keys, queries and flags.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::hold::KeyHoldScheduler;
use crate::parser::{Dispatch, Parser, ParserState};
use crate::query::QuerySlots;
use crate::types::KeyEvent;

/// Flags shared between the reader thread and the game thread.
#[derive(Debug, Default)]
pub struct InputFlags {
    exit_requested: AtomicBool,
    shutdown_armed: AtomicBool,
    reader_done: AtomicBool,
}

impl InputFlags {
    pub fn exit_requested(&self) -> bool {
        self.exit_requested.load(Ordering::Acquire)
    }

    pub fn request_exit(&self) {
        self.exit_requested.store(true, Ordering::Release);
    }

    /// Allow the next status report to stop the reader loop.
    pub fn arm_shutdown(&self) {
        self.shutdown_armed.store(true, Ordering::Release);
    }

    pub fn shutdown_armed(&self) -> bool {
        self.shutdown_armed.load(Ordering::Acquire)
    }

    pub fn reader_done(&self) -> bool {
        self.reader_done.load(Ordering::Acquire)
    }

    fn mark_reader_done(&self) {
        self.reader_done.store(true, Ordering::Release);
    }
}

/// Owns the parser; lives on the reader thread.
#[derive(Debug)]
pub struct Decoder {
    parser: Parser,
    queries: Arc<QuerySlots>,
    flags: Arc<InputFlags>,
    holds: KeyHoldScheduler,
    events: UnboundedSender<KeyEvent>,
}

impl Decoder {
    pub fn new(
        queries: Arc<QuerySlots>,
        flags: Arc<InputFlags>,
        holds: KeyHoldScheduler,
        events: UnboundedSender<KeyEvent>,
    ) -> Self {
        Self {
            parser: Parser::new(),
            queries,
            flags,
            holds,
            events,
        }
    }

    pub fn state(&self) -> ParserState {
        self.parser.state()
    }

    pub fn holds(&self) -> &KeyHoldScheduler {
        &self.holds
    }

    /// True once the shutdown status report has been seen.
    pub fn is_done(&self) -> bool {
        self.flags.reader_done()
    }

    pub fn feed_byte(&mut self, byte: u8) {
        let Some(dispatch) = self.parser.advance(byte) else {
            return;
        };

        match dispatch {
            Dispatch::Interrupt => {
                debug!("interrupt requested");
                self.flags.request_exit();
            }
            Dispatch::Key { code, mods } => self.holds.press(code, mods),
            Dispatch::KeyTransition { code, pressed } => {
                let _ = self.events.send(KeyEvent { code, pressed });
            }
            Dispatch::DeviceAttributes(values) => {
                self.queries.complete_device_attributes(&values);
            }
            Dispatch::CellSize { height, width } => {
                self.queries.complete_cell_size(height, width);
            }
            Dispatch::CursorPosition { row, col } => {
                self.queries.complete_cursor_position(row, col);
            }
            Dispatch::StatusReport => {
                if self.flags.shutdown_armed() {
                    self.flags.mark_reader_done();
                } else {
                    debug!("ignoring status report outside shutdown");
                }
            }
        }
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.feed_byte(b);
        }
    }

    /// Called by the reader when input ends; wakes blocked queries.
    pub fn close(&self) {
        self.queries.close();
    }
}
