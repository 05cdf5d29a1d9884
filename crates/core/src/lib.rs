//! Game-side half of VT Arcade.
//!
//! A game plugs into the runner through [`GameHost`]: it receives key
//! transitions, advances one tick per [`GameHost::step`] and exposes its
//! current 320x200 indexed frame. Nothing here touches the terminal.
//!
//! - [`frame`]: owned raster + palette that hosts draw into
//! - [`host`]: the host contract and exit status
//! - [`demo`]: the bundled demo game
//!
//! # Example
//!
//! ```
//! use vt_arcade_core::{DemoHost, GameHost, StepStatus};
//! use vt_arcade_core::types::KeyCode;
//!
//! let mut host = DemoHost::new();
//! assert_eq!(host.step(), StepStatus::Running);
//!
//! host.key_down(KeyCode::Escape);
//! assert!(matches!(host.step(), StepStatus::Exited(status) if status.is_clean()));
//! ```

pub use vt_arcade_types as types;

pub mod demo;
pub mod frame;
pub mod host;

pub use demo::DemoHost;
pub use frame::{IndexedFrame, FRAME_PIXELS};
pub use host::{ExitStatus, GameHost, StepStatus};
