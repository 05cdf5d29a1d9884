//! A scripted terminal for integration tests.
//!
//! The writer half records everything the program sends and answers the
//! queries it recognizes by pushing replies into the reader half, the way a
//! real terminal would.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// How the fake terminal answers each query.
#[derive(Debug, Clone)]
pub struct Replies {
    pub device_attributes: Option<&'static [u8]>,
    pub cell_size: Option<&'static [u8]>,
    pub cursor_position: Option<&'static [u8]>,
    pub status: Option<&'static [u8]>,
    /// Writes containing these bytes fail with a broken pipe.
    pub rejected: Option<&'static [u8]>,
}

impl Default for Replies {
    fn default() -> Self {
        Self {
            device_attributes: Some(b"\x1b[?64;1;4c"),
            cell_size: Some(b"\x1b[6;20;10t"),
            cursor_position: Some(b"\x1b[40;30R"),
            status: Some(b"\x1b[0n"),
            rejected: None,
        }
    }
}

type Line = Arc<Mutex<Option<Sender<Vec<u8>>>>>;

/// Test-side handle: inject keystrokes, inspect output, hang up.
#[derive(Clone)]
pub struct FakeTerminal {
    line: Line,
    written: Arc<Mutex<Vec<u8>>>,
}

pub struct FakeWriter {
    line: Line,
    written: Arc<Mutex<Vec<u8>>>,
    replies: Replies,
}

pub struct FakeReader {
    rx: Receiver<Vec<u8>>,
    pending: VecDeque<u8>,
}

impl FakeTerminal {
    pub fn new(replies: Replies) -> (Self, FakeReader, FakeWriter) {
        let (tx, rx) = mpsc::channel();
        let line = Arc::new(Mutex::new(Some(tx)));
        let written = Arc::new(Mutex::new(Vec::new()));
        let term = Self {
            line: Arc::clone(&line),
            written: Arc::clone(&written),
        };
        let reader = FakeReader {
            rx,
            pending: VecDeque::new(),
        };
        let writer = FakeWriter {
            line,
            written,
            replies,
        };
        (term, reader, writer)
    }

    /// Bytes as if typed on the keyboard.
    pub fn type_bytes(&self, bytes: &[u8]) {
        send(&self.line, bytes);
    }

    /// Close the input stream; the reader sees end of file.
    pub fn hang_up(&self) {
        self.line.lock().unwrap().take();
    }

    pub fn written(&self) -> Vec<u8> {
        self.written.lock().unwrap().clone()
    }

    pub fn count(&self, needle: &[u8]) -> usize {
        count(&self.written(), needle)
    }

    /// Wait until `needle` has been written at least once.
    pub fn wait_for_output(&self, needle: &[u8]) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while self.count(needle) == 0 {
            assert!(Instant::now() < deadline, "timed out waiting for {needle:?}");
            thread::sleep(Duration::from_millis(1));
        }
    }
}

pub fn count(haystack: &[u8], needle: &[u8]) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

fn send(line: &Line, bytes: &[u8]) {
    if let Some(tx) = line.lock().unwrap().as_ref() {
        let _ = tx.send(bytes.to_vec());
    }
}

impl Write for FakeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(rejected) = self.replies.rejected {
            if count(buf, rejected) > 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal went away"));
            }
        }
        self.written.lock().unwrap().extend_from_slice(buf);

        let answers = [
            (&b"\x1b[c"[..], self.replies.device_attributes),
            (&b"\x1b[16t"[..], self.replies.cell_size),
            (&b"\x1b[6n"[..], self.replies.cursor_position),
            (&b"\x1b[5n"[..], self.replies.status),
        ];
        for (query, reply) in answers {
            if let Some(reply) = reply {
                if count(buf, query) > 0 {
                    send(&self.line, reply);
                }
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for FakeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.pending.is_empty() {
            match self.rx.recv() {
                Ok(bytes) => self.pending.extend(bytes),
                Err(_) => return Ok(0),
            }
        }
        let n = buf.len().min(self.pending.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}
