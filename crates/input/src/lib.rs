//! Terminal input decoding (game-facing).
//!
//! This module turns the raw byte stream coming back from a VT-class terminal
//! into game key events and answers to synchronous terminal queries. It is
//! independent of any UI framework: bytes go in through [`Decoder::feed_byte`],
//! key transitions come out on a channel.
//!
//! # Module Structure
//!
//! - [`parser`]: ground / escape / SS3 / CSI state machine producing [`Dispatch`] items
//! - [`params`]: fixed-capacity CSI parameter list
//! - [`keymap`]: byte, SS3, CSI and virtual-key tables
//! - [`hold`]: key-up synthesis for protocols without release events
//! - [`query`]: blocking query slots shared with the reader thread
//! - [`decoder`]: applies parser output to keys, queries and flags
//! - [`terminal`]: reader thread lifecycle and the public query API
//!
//! # Example
//!
//! ```
//! use vt_arcade_input::parser::{Dispatch, Parser};
//!
//! let mut parser = Parser::new();
//! let replies: Vec<Dispatch> = b"\x1b[40;30R"
//!     .iter()
//!     .filter_map(|&b| parser.advance(b))
//!     .collect();
//! assert_eq!(replies, vec![Dispatch::CursorPosition { row: 40, col: 30 }]);
//! ```

pub mod decoder;
pub mod error;
pub mod hold;
pub mod keymap;
pub mod params;
pub mod parser;
pub mod query;
pub mod terminal;

pub use vt_arcade_types as types;

pub use decoder::{Decoder, InputFlags};
pub use error::{InputError, Result};
pub use hold::{KeyHoldScheduler, KeyHoldState};
pub use params::CsiParams;
pub use parser::{Dispatch, Parser, ParserState};
pub use query::QuerySlots;
pub use terminal::{InputConfig, TerminalInput};
pub use types::supports_sixel;
