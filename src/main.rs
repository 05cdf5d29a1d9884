//! VT Arcade runner (default binary).
//!
//! Negotiates Sixel support with the terminal, sizes the output to the
//! window and runs the bundled demo host until it exits or Ctrl+C.

use std::io;
use std::process;

use anyhow::{Context, Result};
use crossterm::terminal;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::info;

use vt_arcade::core::{DemoHost, ExitStatus};
use vt_arcade::input::{supports_sixel, TerminalInput};
use vt_arcade::term::SixelRenderer;
use vt_arcade::types::KeyEvent;
use vt_arcade::{logging, session, AppConfig};

const SIXEL_REQUIRED: &str = "VT Arcade requires a terminal supporting Sixel graphics.";

fn main() -> Result<()> {
    let config = AppConfig::from_env();
    logging::init(config.log_path.as_deref())?;

    terminal::enable_raw_mode().context("enabling raw mode")?;
    let result = run(&config);

    // Always try to restore terminal state.
    let _ = terminal::disable_raw_mode();

    let status = result?;
    if !status.is_clean() {
        if let Some(message) = &status.message {
            println!("{message}");
        }
        process::exit(1);
    }
    Ok(())
}

fn run(config: &AppConfig) -> Result<ExitStatus> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut input = TerminalInput::start(io::stdin(), io::stdout(), tx, config.input())
        .context("starting terminal input")?;

    let status = play(config, &input, &mut rx);

    // The reader must be stopped before raw mode goes away.
    input.shutdown().context("stopping terminal input")?;
    status
}

fn play(
    config: &AppConfig,
    input: &TerminalInput<io::Stdout>,
    events: &mut UnboundedReceiver<KeyEvent>,
) -> Result<ExitStatus> {
    let attributes = input
        .request_device_attributes()
        .context("querying device attributes")?;
    if !supports_sixel(&attributes) {
        info!(?attributes, "no sixel support");
        return Ok(ExitStatus::failure(1, SIXEL_REQUIRED));
    }

    let (height, width) = input.request_screen_size().context("querying screen size")?;
    info!(height, width, "screen size");

    let mut renderer = SixelRenderer::stdout(height, width, config.renderer());
    renderer.enter()?;

    let mut host = DemoHost::new();
    let status = session::run(&mut host, input, events, &mut renderer, config.tick);

    let exited = renderer.exit();
    let status = status?;
    exited?;
    Ok(status)
}
