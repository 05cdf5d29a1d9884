//! Blocking query round-trips between the game thread and the reader thread.
//!
//! The requester marks a kind pending, writes the query, then waits on the
//! condition variable until the reader fills the matching slot. Replies for
//! kinds nobody asked for are dropped, so a late or unsolicited report cannot
//! satisfy a future request.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::error::{InputError, Result};
use crate::types::QueryKind;

#[derive(Debug, Default)]
struct Slots {
    pending: [bool; 3],
    device_attributes: Option<Vec<u32>>,
    cell_size: Option<(u32, u32)>,
    cursor_position: Option<(u32, u32)>,
    closed: bool,
}

impl Slots {
    fn clear(&mut self, kind: QueryKind) {
        match kind {
            QueryKind::DeviceAttributes => self.device_attributes = None,
            QueryKind::CellSize => self.cell_size = None,
            QueryKind::CursorPosition => self.cursor_position = None,
        }
    }
}

/// Result slots for the three query kinds, guarded by one mutex.
#[derive(Debug, Default)]
pub struct QuerySlots {
    slots: Mutex<Slots>,
    ready: Condvar,
}

impl QuerySlots {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark `kind` as outstanding. Fails if a request of that kind is pending.
    pub fn begin(&self, kind: QueryKind) -> Result<()> {
        let mut slots = self.lock();
        if slots.closed {
            return Err(InputError::ReaderClosed);
        }
        if slots.pending[kind.index()] {
            return Err(InputError::QueryPending(kind));
        }
        slots.pending[kind.index()] = true;
        slots.clear(kind);
        Ok(())
    }

    /// Abandon a request whose query bytes could not be sent.
    pub fn cancel(&self, kind: QueryKind) {
        let mut slots = self.lock();
        slots.pending[kind.index()] = false;
        slots.clear(kind);
    }

    pub fn is_pending(&self, kind: QueryKind) -> bool {
        self.lock().pending[kind.index()]
    }

    fn wait_for<T>(&self, kind: QueryKind, mut take: impl FnMut(&mut Slots) -> Option<T>) -> Result<T> {
        let mut slots = self.lock();
        loop {
            if let Some(value) = take(&mut *slots) {
                slots.pending[kind.index()] = false;
                return Ok(value);
            }
            if slots.closed {
                slots.pending[kind.index()] = false;
                return Err(InputError::ReaderClosed);
            }
            slots = self.ready.wait(slots).unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub fn wait_device_attributes(&self) -> Result<Vec<u32>> {
        self.wait_for(QueryKind::DeviceAttributes, |s| s.device_attributes.take())
    }

    pub fn wait_cursor_position(&self) -> Result<(u32, u32)> {
        self.wait_for(QueryKind::CursorPosition, |s| s.cursor_position.take())
    }

    /// Consume the cell size reply without blocking.
    pub fn take_cell_size(&self) -> Option<(u32, u32)> {
        let mut slots = self.lock();
        slots.pending[QueryKind::CellSize.index()] = false;
        slots.cell_size.take()
    }

    pub fn complete_device_attributes(&self, values: &[u32]) {
        let mut slots = self.lock();
        if !slots.pending[QueryKind::DeviceAttributes.index()] {
            debug!(?values, "unsolicited device attributes reply");
            return;
        }
        slots.device_attributes = Some(values.to_vec());
        drop(slots);
        self.ready.notify_all();
    }

    pub fn complete_cell_size(&self, height: u32, width: u32) {
        let mut slots = self.lock();
        if !slots.pending[QueryKind::CellSize.index()] {
            debug!(height, width, "unsolicited cell size reply");
            return;
        }
        slots.cell_size = Some((height, width));
        drop(slots);
        self.ready.notify_all();
    }

    pub fn complete_cursor_position(&self, row: u32, col: u32) {
        let mut slots = self.lock();
        if !slots.pending[QueryKind::CursorPosition.index()] {
            debug!(row, col, "unsolicited cursor position report");
            return;
        }
        slots.cursor_position = Some((row, col));
        drop(slots);
        self.ready.notify_all();
    }

    /// Wake every waiter with [`InputError::ReaderClosed`].
    pub fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_all();
    }
}
