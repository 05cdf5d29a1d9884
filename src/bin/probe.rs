//! Input diagnostic: prints what the decoder makes of your keyboard.
//!
//! Reports the device attributes and screen size, then echoes every key
//! event until Ctrl+C.

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    cursor,
    terminal::{self, Clear, ClearType},
    QueueableCommand,
};
use tokio::runtime::Builder;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time;

use vt_arcade::input::{supports_sixel, TerminalInput};
use vt_arcade::types::KeyEvent;
use vt_arcade::{logging, AppConfig};

fn main() -> Result<()> {
    let config = AppConfig::from_env();
    logging::init(config.log_path.as_deref())?;

    terminal::enable_raw_mode().context("enabling raw mode")?;
    let result = run(&config);
    let _ = terminal::disable_raw_mode();
    result
}

fn run(config: &AppConfig) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut input = TerminalInput::start(io::stdin(), io::stdout(), tx, config.input())
        .context("starting terminal input")?;

    let result = probe(&input, &mut rx);
    input.shutdown().context("stopping terminal input")?;
    result
}

fn probe(input: &TerminalInput<io::Stdout>, events: &mut UnboundedReceiver<KeyEvent>) -> Result<()> {
    let attributes = input.request_device_attributes()?;
    let (height, width) = input.request_screen_size()?;

    let mut out = io::stdout();
    out.queue(cursor::MoveTo(0, 0))?;
    out.queue(Clear(ClearType::All))?;
    write!(
        out,
        "device attributes: {attributes:?} (sixel: {})\r\n",
        supports_sixel(&attributes)
    )?;
    write!(out, "screen: {width}x{height} px\r\n")?;
    write!(out, "press keys, Ctrl+C to quit\r\n")?;
    out.flush()?;

    // Ctrl+C produces no key event, so the exit flag is checked on a timer too.
    let rt = Builder::new_current_thread().enable_time().build()?;
    rt.block_on(async {
        let mut exit_check = time::interval(Duration::from_millis(20));
        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    let edge = if event.pressed { "down" } else { "up  " };
                    write!(out, "{edge} {:?}\r\n", event.code)?;
                    out.flush()?;
                }
                _ = exit_check.tick() => {
                    if input.exit_requested() {
                        break;
                    }
                }
            }
        }
        Ok::<(), anyhow::Error>(())
    })
}
