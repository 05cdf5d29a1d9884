//! The game host contract.

use crate::types::{FrameView, KeyCode, KeyEvent};

/// How a simulation step ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    /// Keep going.
    Running,
    /// The game asked to terminate.
    Exited(ExitStatus),
}

/// Termination code plus the last diagnostic the host printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitStatus {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitStatus {
    pub fn clean() -> Self {
        Self {
            code: 0,
            message: None,
        }
    }

    pub fn failure(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.code == 0
    }
}

/// A real-time game that renders into a paletted raster.
///
/// The orchestrator feeds key transitions, calls [`GameHost::step`] once per
/// tick and renders [`GameHost::frame`] after every step that keeps running.
pub trait GameHost {
    fn key_down(&mut self, key: KeyCode);

    fn key_up(&mut self, key: KeyCode);

    /// Advance the simulation by one tick.
    fn step(&mut self) -> StepStatus;

    /// The frame produced by the last step.
    fn frame(&self) -> FrameView<'_>;

    /// Route a decoded key event to the matching sink.
    fn key_event(&mut self, event: KeyEvent) {
        if event.pressed {
            self.key_down(event.code);
        } else {
            self.key_up(event.code);
        }
    }
}
