//! TerminalInput: background reader plus the blocking query API.
//!
//! The reader thread is the only owner of the [`Decoder`]. The game thread
//! talks to it through the query slots and the shared flags.
//!
//! Reads on a terminal cannot be cancelled, so shutdown asks the terminal for a
//! status report and lets the reply wake the reader:
//!
//! 1. disable enhanced key mode and arm the shutdown flag
//! 2. send `CSI 5 n`; the `CSI 0 n` reply ends the reader loop
//! 3. join the reader
//! 4. show the cursor again
//!
//! Raw mode must only be released by the caller after [`TerminalInput::shutdown`]
//! returns.

use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::{cursor, QueueableCommand};
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::decoder::{Decoder, InputFlags};
use crate::error::Result;
use crate::hold::KeyHoldScheduler;
use crate::query::QuerySlots;
use crate::types::{KeyEvent, QueryKind, FALLBACK_CELL_HEIGHT, FALLBACK_CELL_WIDTH, KEY_RELEASE_MS};

const ENHANCED_KEYS_ON: &[u8] = b"\x1b[?9001h";
const ENHANCED_KEYS_OFF: &[u8] = b"\x1b[?9001l";
const QUERY_DEVICE_ATTRIBUTES: &[u8] = b"\x1b[c";
const QUERY_SCREEN_SIZE: &[u8] = b"\x1b[9999;9999H\x1b[16t\x1b[6n";
const QUERY_STATUS: &[u8] = b"\x1b[5n";

/// Input tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputConfig {
    /// Quiescence window before a synthesized key release.
    pub key_release: Duration,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            key_release: Duration::from_millis(KEY_RELEASE_MS),
        }
    }
}

/// Running terminal input instance.
pub struct TerminalInput<W: Write> {
    out: Mutex<W>,
    queries: Arc<QuerySlots>,
    flags: Arc<InputFlags>,
    reader: Option<JoinHandle<()>>,
    _rt: Option<Runtime>,
}

impl<W: Write> TerminalInput<W> {
    /// Start reading `input` on a background thread.
    ///
    /// Key release timers run on a private single-worker runtime.
    pub fn start<R>(
        input: R,
        out: W,
        events: UnboundedSender<KeyEvent>,
        config: InputConfig,
    ) -> Result<Self>
    where
        R: Read + Send + 'static,
    {
        let rt = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("vt-arcade-keys")
            .enable_time()
            .build()?;
        let mut this = Self::start_with_runtime(input, out, events, config, rt.handle().clone())?;
        this._rt = Some(rt);
        Ok(this)
    }

    /// Like [`TerminalInput::start`], but release timers run on `runtime`.
    pub fn start_with_runtime<R>(
        input: R,
        mut out: W,
        events: UnboundedSender<KeyEvent>,
        config: InputConfig,
        runtime: Handle,
    ) -> Result<Self>
    where
        R: Read + Send + 'static,
    {
        out.queue(cursor::Hide)?;
        out.write_all(ENHANCED_KEYS_ON)?;
        out.flush()?;

        let queries = Arc::new(QuerySlots::new());
        let flags = Arc::new(InputFlags::default());
        let holds = KeyHoldScheduler::with_window(runtime, events.clone(), config.key_release);
        let decoder = Decoder::new(Arc::clone(&queries), Arc::clone(&flags), holds, events);

        let reader = thread::Builder::new()
            .name("vt-arcade-reader".to_string())
            .spawn(move || run_reader(input, decoder))?;

        Ok(Self {
            out: Mutex::new(out),
            queries,
            flags,
            reader: Some(reader),
            _rt: None,
        })
    }

    /// True once Ctrl+C has been seen.
    pub fn exit_requested(&self) -> bool {
        self.flags.exit_requested()
    }

    /// Query the primary device attributes and block until the reply.
    pub fn request_device_attributes(&self) -> Result<Vec<u32>> {
        self.queries.begin(QueryKind::DeviceAttributes)?;
        if let Err(e) = self.send(QUERY_DEVICE_ATTRIBUTES) {
            self.queries.cancel(QueryKind::DeviceAttributes);
            return Err(e.into());
        }
        let attributes = self.queries.wait_device_attributes()?;
        debug!(?attributes, "device attributes");
        Ok(attributes)
    }

    /// Resolve the screen size in pixels as `(height, width)`.
    ///
    /// Moves the cursor to the far corner, then asks for the cell size and the
    /// cursor position. Terminals that ignore the cell size query are assumed
    /// to use 20x10 cells.
    pub fn request_screen_size(&self) -> Result<(u32, u32)> {
        self.queries.begin(QueryKind::CellSize)?;
        if let Err(e) = self.queries.begin(QueryKind::CursorPosition) {
            self.queries.cancel(QueryKind::CellSize);
            return Err(e);
        }
        if let Err(e) = self.send(QUERY_SCREEN_SIZE) {
            self.queries.cancel(QueryKind::CellSize);
            self.queries.cancel(QueryKind::CursorPosition);
            return Err(e.into());
        }

        let waited = self.queries.wait_cursor_position();
        let cell = self.queries.take_cell_size();
        let (rows, cols) = waited?;
        let (cell_height, cell_width) = cell.unwrap_or_else(|| {
            debug!("no cell size reply, assuming 20x10");
            (FALLBACK_CELL_HEIGHT, FALLBACK_CELL_WIDTH)
        });

        let size = (rows.saturating_mul(cell_height), cols.saturating_mul(cell_width));
        debug!(rows, cols, cell_height, cell_width, ?size, "screen size");
        Ok(size)
    }

    /// Stop the reader thread and restore the cursor.
    ///
    /// Every step is attempted even if an earlier write fails; the first error
    /// is returned. If the status query could not be sent the reader is kept,
    /// so a later call (or drop) can try again.
    pub fn shutdown(&mut self) -> Result<()> {
        let Some(reader) = self.reader.take() else {
            return Ok(());
        };

        self.flags.arm_shutdown();
        let mut failure = None;
        let status_sent = {
            let mut out = self.lock_out();
            keep_first(&mut failure, out.write_all(ENHANCED_KEYS_OFF));
            if reader.is_finished() {
                keep_first(&mut failure, out.flush());
                true
            } else {
                let written = keep_first(&mut failure, out.write_all(QUERY_STATUS));
                keep_first(&mut failure, out.flush()) && written
            }
        };

        if status_sent {
            if reader.join().is_err() {
                warn!("terminal reader thread panicked");
            }
            debug!("terminal reader stopped");
        } else {
            warn!("status query not sent, terminal reader still running");
            self.reader = Some(reader);
        }

        {
            let mut out = self.lock_out();
            keep_first(&mut failure, out.queue(cursor::Show).map(|_| ()));
            keep_first(&mut failure, out.flush());
        }

        match failure {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    fn send(&self, bytes: &[u8]) -> io::Result<()> {
        let mut out = self.lock_out();
        out.write_all(bytes)?;
        out.flush()
    }

    fn lock_out(&self) -> MutexGuard<'_, W> {
        self.out.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write> Drop for TerminalInput<W> {
    fn drop(&mut self) {
        if self.reader.is_some() {
            if let Err(e) = self.shutdown() {
                warn!(error = %e, "terminal input shutdown failed");
            }
        }
    }
}

/// Record the first error; true when `result` is ok.
fn keep_first(failure: &mut Option<io::Error>, result: io::Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            failure.get_or_insert(e);
            false
        }
    }
}

fn run_reader<R: Read>(mut input: R, mut decoder: Decoder) {
    let mut buf = [0u8; 256];
    debug!("terminal reader started");

    'read: loop {
        match input.read(&mut buf) {
            Ok(0) => {
                debug!("terminal input closed");
                break;
            }
            Ok(n) => {
                for &byte in &buf[..n] {
                    decoder.feed_byte(byte);
                    if decoder.is_done() {
                        break 'read;
                    }
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(error = %e, "terminal read failed");
                break;
            }
        }
    }

    decoder.close();
}
