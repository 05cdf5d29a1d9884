//! CSI parameter accumulation.
//!
//! Parameters arrive one byte at a time on the reader thread, so this keeps a
//! fixed-capacity list and never allocates.

use arrayvec::ArrayVec;

/// Maximum number of parameters we'll track. Extra ones are dropped.
pub const MAX_PARAMS: usize = 32;

/// Parameters of the CSI sequence currently being parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsiParams {
    values: ArrayVec<u32, MAX_PARAMS>,
    current: u32,
    prefix: u8,
}

impl CsiParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.values.clear();
        self.current = 0;
        self.prefix = 0;
    }

    /// Append an ASCII digit (`b'0'..=b'9'`) to the parameter being accumulated.
    pub(crate) fn push_digit(&mut self, digit: u8) {
        debug_assert!(digit.is_ascii_digit());
        self.current = self
            .current
            .saturating_mul(10)
            .saturating_add((digit - b'0') as u32);
    }

    /// Record a private-mode prefix byte (`<`, `=`, `>` or `?`).
    pub fn set_prefix(&mut self, byte: u8) {
        self.prefix = byte;
    }

    /// Close the current parameter and start the next one.
    pub fn finish_param(&mut self) {
        let _ = self.values.try_push(self.current);
        self.current = 0;
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    pub fn has_prefix(&self) -> bool {
        self.prefix != 0
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw value at `index` (0 if not present).
    pub fn raw(&self, index: usize) -> u32 {
        self.values.get(index).copied().unwrap_or(0)
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.values
    }
}
