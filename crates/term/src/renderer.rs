//! SixelRenderer: flushes encoded frames to a real terminal.
//!
//! The renderer owns the output handle and one [`SixelEncoder`]. Every frame is
//! assembled in the encoder's buffer and written with a single `write_all`.

use std::io::{self, Write};

use anyhow::Result;
use crossterm::{
    cursor,
    terminal::{Clear, ClearType},
    QueueableCommand,
};

use crate::sixel::SixelEncoder;
use crate::types::FrameView;

/// `CSI ? 80 h`: sixel display mode, so images never scroll the page.
const SIXEL_DISPLAY_ON: &[u8] = b"\x1b[?80h";
const SIXEL_DISPLAY_OFF: &[u8] = b"\x1b[?80l";
const RESET_TITLE: &[u8] = b"\x1b]21\x1b\\";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererConfig {
    /// Window title set while the game is running.
    pub title: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            title: "VT Arcade".to_string(),
        }
    }
}

pub struct SixelRenderer<W: Write> {
    out: W,
    encoder: SixelEncoder,
    config: RendererConfig,
}

impl SixelRenderer<io::Stdout> {
    pub fn stdout(screen_height: u32, screen_width: u32, config: RendererConfig) -> Self {
        Self::new(io::stdout(), screen_height, screen_width, config)
    }
}

impl<W: Write> SixelRenderer<W> {
    pub fn new(out: W, screen_height: u32, screen_width: u32, config: RendererConfig) -> Self {
        Self {
            out,
            encoder: SixelEncoder::new(screen_height, screen_width),
            config,
        }
    }

    pub fn encoder(&self) -> &SixelEncoder {
        &self.encoder
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Set the title, enable sixel display mode and clear the screen.
    pub fn enter(&mut self) -> Result<()> {
        write!(self.out, "\x1b]21;{}\x1b\\", self.config.title)?;
        self.out.write_all(SIXEL_DISPLAY_ON)?;
        self.out.queue(cursor::MoveTo(0, 0))?;
        self.out.queue(Clear(ClearType::All))?;
        self.out.flush()?;
        Ok(())
    }

    /// Undo [`SixelRenderer::enter`].
    pub fn exit(&mut self) -> Result<()> {
        self.out.write_all(RESET_TITLE)?;
        self.out.queue(cursor::MoveTo(0, 0))?;
        self.out.queue(Clear(ClearType::FromCursorDown))?;
        self.out.write_all(SIXEL_DISPLAY_OFF)?;
        self.out.flush()?;
        Ok(())
    }

    /// Encode and flush one frame.
    pub fn render_frame(&mut self, frame: FrameView<'_>) -> Result<()> {
        let bytes = self.encoder.encode(frame);
        self.out.write_all(bytes)?;
        self.out.flush()?;
        Ok(())
    }
}
