//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types shared by the input decoder, the
//! Sixel renderer and the game host. All types are pure data structures with no
//! external dependencies, making them usable in any context (decoder thread,
//! render loop, tests).
//!
//! # Source Raster
//!
//! The game host renders into a fixed indexed-color raster:
//!
//! - **Width**: 320 pixels
//! - **Height**: 200 pixels
//! - **Palette**: 256 entries of 8-bit RGB (768 bytes)
//!
//! The terminal side only ever scales this raster up by an integer factor.
//!
//! # Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `KEY_RELEASE_MS` | 100 | Quiescence window before a synthesized key-up |
//! | `TICK_MS` | 28 | Default simulation step (~35 Hz) |
//!
//! # Terminal Geometry Fallback
//!
//! Terminals that do not answer the cell size query are assumed to use a
//! VT340-compatible cell of 20x10 pixels (`FALLBACK_CELL_HEIGHT` x
//! `FALLBACK_CELL_WIDTH`).
//!
//! # Examples
//!
//! ```
//! use vt_arcade_types::{KeyCode, KeyEvent, Modifiers, SOURCE_WIDTH};
//!
//! let down = KeyEvent::down(KeyCode::Char(b'w'));
//! assert!(down.pressed);
//!
//! // xterm modifier parameters are encoded as 1 + bitmask.
//! let mods = Modifiers::from_xterm(5);
//! assert!(mods.ctrl() && !mods.shift());
//!
//! assert_eq!(SOURCE_WIDTH, 320);
//! ```

/// Source raster width in pixels
pub const SOURCE_WIDTH: usize = 320;

/// Source raster height in pixels
pub const SOURCE_HEIGHT: usize = 200;

/// Number of palette entries
pub const PALETTE_SIZE: usize = 256;

/// Palette size in bytes (RGB triples)
pub const PALETTE_BYTES: usize = PALETTE_SIZE * 3;

/// Quiescence window before a held key is released (100ms)
pub const KEY_RELEASE_MS: u64 = 100;

/// Default simulation step interval in milliseconds (28ms ≈ 35 Hz)
pub const TICK_MS: u64 = 28;

/// Cell height assumed when the terminal does not report one
pub const FALLBACK_CELL_HEIGHT: u32 = 20;

/// Cell width assumed when the terminal does not report one
pub const FALLBACK_CELL_WIDTH: u32 = 10;

/// First device attribute value that announces a conformance level with extensions
pub const DA_EXTENSIONS_LEVEL: u32 = 60;

/// Device attribute extension number for Sixel graphics
pub const DA_SIXEL_EXTENSION: u32 = 4;

/// Keys understood by the game host.
///
/// Digits and letters are carried as their lowercase ASCII byte in
/// [`KeyCode::Char`]; everything else has a dedicated variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Tab,
    Enter,
    Escape,
    Space,
    Backspace,
    Apostrophe,
    Multiply,
    Comma,
    Minus,
    Period,
    Slash,
    Semicolon,
    Equals,
    LeftBracket,
    RightBracket,
    /// `0`-`9` or `a`-`z`
    Char(u8),
    Up,
    Down,
    Left,
    Right,
    /// F1-F12
    F(u8),
    Shift,
    Ctrl,
    Alt,
}

impl KeyCode {
    /// Build a digit or letter key, normalizing uppercase letters.
    ///
    /// # Examples
    ///
    /// ```
    /// use vt_arcade_types::KeyCode;
    ///
    /// assert_eq!(KeyCode::from_alnum(b'Q'), Some(KeyCode::Char(b'q')));
    /// assert_eq!(KeyCode::from_alnum(b'7'), Some(KeyCode::Char(b'7')));
    /// assert_eq!(KeyCode::from_alnum(b'!'), None);
    /// ```
    pub fn from_alnum(byte: u8) -> Option<Self> {
        match byte {
            b'0'..=b'9' | b'a'..=b'z' => Some(KeyCode::Char(byte)),
            b'A'..=b'Z' => Some(KeyCode::Char(byte.to_ascii_lowercase())),
            _ => None,
        }
    }

    /// Build a function key, `n` in 1..=12.
    pub fn function(n: u8) -> Option<Self> {
        (1..=12).contains(&n).then_some(KeyCode::F(n))
    }

    /// True for the Shift, Ctrl and Alt keys.
    pub fn is_modifier(&self) -> bool {
        matches!(self, KeyCode::Shift | KeyCode::Ctrl | KeyCode::Alt)
    }
}

/// A single key transition delivered to the game host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub pressed: bool,
}

impl KeyEvent {
    pub const fn down(code: KeyCode) -> Self {
        Self {
            code,
            pressed: true,
        }
    }

    pub const fn up(code: KeyCode) -> Self {
        Self {
            code,
            pressed: false,
        }
    }
}

/// Modifier mask in xterm order (Shift=1, Alt=2, Ctrl=4).
///
/// On the wire xterm sends `1 + mask`, so a parameter of 0 or 1 means "no
/// modifiers".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const SHIFT: Modifiers = Modifiers(1);
    pub const ALT: Modifiers = Modifiers(2);
    pub const CTRL: Modifiers = Modifiers(4);

    /// Decode an xterm modifier parameter (`1 + mask`).
    pub fn from_xterm(param: u32) -> Self {
        if param < 2 {
            return Self::NONE;
        }
        Modifiers(((param - 1) & 0x7) as u8)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn shift(&self) -> bool {
        self.0 & Self::SHIFT.0 != 0
    }

    pub fn alt(&self) -> bool {
        self.0 & Self::ALT.0 != 0
    }

    pub fn ctrl(&self) -> bool {
        self.0 & Self::CTRL.0 != 0
    }

    /// Modifier keys held by this mask, in Shift, Alt, Ctrl order.
    pub fn keys(self) -> impl Iterator<Item = KeyCode> {
        [
            (Self::SHIFT, KeyCode::Shift),
            (Self::ALT, KeyCode::Alt),
            (Self::CTRL, KeyCode::Ctrl),
        ]
        .into_iter()
        .filter(move |(m, _)| self.0 & m.0 != 0)
        .map(|(_, key)| key)
    }
}

/// Synchronous terminal queries issued by the orchestrator
///
/// At most one request per kind may be outstanding at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// Primary device attributes (`CSI c`)
    DeviceAttributes,
    /// Cell size in pixels (`CSI 16 t`)
    CellSize,
    /// Cursor position report (`CSI 6 n`)
    CursorPosition,
}

impl QueryKind {
    pub fn index(&self) -> usize {
        match self {
            QueryKind::DeviceAttributes => 0,
            QueryKind::CellSize => 1,
            QueryKind::CursorPosition => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::DeviceAttributes => "device attributes",
            QueryKind::CellSize => "cell size",
            QueryKind::CursorPosition => "cursor position",
        }
    }
}

impl std::fmt::Display for QueryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Borrowed view of one host frame: indexed pixels plus the palette.
///
/// The view is only valid for a single render call; renderers copy what they
/// need to keep (the palette snapshot).
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub pixels: &'a [u8; SOURCE_WIDTH * SOURCE_HEIGHT],
    pub palette: &'a [u8; PALETTE_BYTES],
}

impl<'a> FrameView<'a> {
    pub fn new(
        pixels: &'a [u8; SOURCE_WIDTH * SOURCE_HEIGHT],
        palette: &'a [u8; PALETTE_BYTES],
    ) -> Self {
        Self { pixels, palette }
    }

    /// Palette index at `(x, y)`.
    #[inline(always)]
    pub fn index_at(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * SOURCE_WIDTH + x]
    }

    /// RGB triple of palette entry `index`.
    pub fn rgb(&self, index: u8) -> (u8, u8, u8) {
        let i = index as usize * 3;
        (self.palette[i], self.palette[i + 1], self.palette[i + 2])
    }
}

/// True when a device attribute report announces Sixel graphics.
///
/// The first value must be a conformance level of 60 or more (meaning the rest
/// of the list are extension numbers) and extension 4 must be present.
///
/// # Examples
///
/// ```
/// use vt_arcade_types::supports_sixel;
///
/// assert!(supports_sixel(&[64, 1, 4]));
/// assert!(!supports_sixel(&[64, 1, 2]));
/// assert!(!supports_sixel(&[1, 2]));
/// assert!(!supports_sixel(&[]));
/// ```
pub fn supports_sixel(attributes: &[u32]) -> bool {
    match attributes.split_first() {
        Some((&level, extensions)) => {
            level >= DA_EXTENSIONS_LEVEL && extensions.contains(&DA_SIXEL_EXTENSION)
        }
        None => false,
    }
}
