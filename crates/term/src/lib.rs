//! Sixel output for VT terminals.
//!
//! This is a small, game-oriented rendering layer that turns a paletted raster
//! into Sixel graphics. It avoids any widget/layout machinery: one frame in,
//! one escape sequence out, written with a single call.
//!
//! Goals:
//! - Keep per-frame cost independent of the integer scale factor
//! - Never reallocate the output buffer in steady state
//! - Only resend the palette when it changes

pub mod renderer;
pub mod sixel;

pub use vt_arcade_types as types;

pub use renderer::{RendererConfig, SixelRenderer};
pub use sixel::{color_register, SixelEncoder, BAND_HEIGHT, BUFFER_BYTES_PER_SCALE};
