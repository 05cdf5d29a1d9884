//! The play loop: feed keys, step the host, render, wait for the next tick.

use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

use crate::core::{ExitStatus, GameHost, StepStatus};
use crate::input::TerminalInput;
use crate::term::SixelRenderer;
use crate::types::KeyEvent;

/// Run `host` until it exits or Ctrl+C is pressed.
///
/// Ctrl+C counts as a clean exit. Key events queued since the previous tick
/// are delivered before each step; a step that keeps running is rendered
/// immediately.
pub fn run<H, T, W>(
    host: &mut H,
    input: &TerminalInput<T>,
    events: &mut UnboundedReceiver<KeyEvent>,
    renderer: &mut SixelRenderer<W>,
    tick: Duration,
) -> Result<ExitStatus>
where
    H: GameHost,
    T: Write,
    W: Write,
{
    let mut next_tick = Instant::now();

    loop {
        loop {
            match events.try_recv() {
                Ok(event) => host.key_event(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        if input.exit_requested() {
            debug!("interrupt received");
            return Ok(ExitStatus::clean());
        }

        if let StepStatus::Exited(status) = host.step() {
            debug!(code = status.code, "host exited");
            return Ok(status);
        }
        renderer.render_frame(host.frame())?;

        next_tick += tick;
        let now = Instant::now();
        if next_tick > now {
            thread::sleep(next_tick - now);
        } else {
            // Running behind; don't try to catch up.
            next_tick = now;
        }
    }
}
