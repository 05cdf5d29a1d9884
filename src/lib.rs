//! VT Arcade (workspace facade crate).
//!
//! Runs a paletted raster game inside a VT terminal: frames go out as Sixel
//! images, keys come back as terminal reports. The implementation lives in
//! the crates under `crates/`; this package re-exports them and adds the
//! pieces the binaries share.

pub use vt_arcade_core as core;
pub use vt_arcade_input as input;
pub use vt_arcade_term as term;
pub use vt_arcade_types as types;

pub mod config;
pub mod logging;
pub mod session;

pub use config::AppConfig;
