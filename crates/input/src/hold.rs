//! Key-up synthesis for terminals that only report key presses.
//!
//! Plain VT key sequences carry no release events. Every press starts a
//! delayed task that releases the key once the quiescence window elapses. A
//! repeated press of the held key (terminal auto-repeat) emits nothing but bumps
//! the generation counter, which invalidates the pending task so the hold
//! window is extended by the fresh one. Only one regular key is held at a time:
//! pressing a different key releases the previous one first.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;

use crate::types::{KeyCode, KeyEvent, Modifiers, KEY_RELEASE_MS};

/// Currently held key plus the generation guarding delayed releases.
#[derive(Debug, Clone, Default)]
pub struct KeyHoldState {
    held: Option<(KeyCode, Modifiers)>,
    generation: u64,
}

impl KeyHoldState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn held(&self) -> Option<(KeyCode, Modifiers)> {
        self.held
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Register a press and return the generation the release task must match.
    pub fn press(
        &mut self,
        code: KeyCode,
        mods: Modifiers,
        mut emit: impl FnMut(KeyEvent),
    ) -> u64 {
        if self.held.map(|(held, _)| held) != Some(code) {
            if let Some((last, last_mods)) = self.held.take() {
                emit(KeyEvent::up(last));
                last_mods.keys().for_each(|m| emit(KeyEvent::up(m)));
            }
            mods.keys().for_each(|m| emit(KeyEvent::down(m)));
            emit(KeyEvent::down(code));
            self.held = Some((code, mods));
        }

        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    /// Release the held key if no press happened since `generation`.
    ///
    /// Returns true when a release was emitted.
    pub fn expire(&mut self, generation: u64, mut emit: impl FnMut(KeyEvent)) -> bool {
        if generation != self.generation {
            return false;
        }
        let Some((code, mods)) = self.held.take() else {
            return false;
        };
        emit(KeyEvent::up(code));
        mods.keys().for_each(|m| emit(KeyEvent::up(m)));
        true
    }
}

/// Schedules delayed releases on a tokio runtime.
///
/// The state mutex serializes presses with release tasks, so events reach the
/// channel in the order they were decided.
#[derive(Debug, Clone)]
pub struct KeyHoldScheduler {
    state: Arc<Mutex<KeyHoldState>>,
    window: Duration,
    runtime: Handle,
    events: UnboundedSender<KeyEvent>,
}

impl KeyHoldScheduler {
    pub fn new(runtime: Handle, events: UnboundedSender<KeyEvent>) -> Self {
        Self::with_window(runtime, events, Duration::from_millis(KEY_RELEASE_MS))
    }

    pub fn with_window(
        runtime: Handle,
        events: UnboundedSender<KeyEvent>,
        window: Duration,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(KeyHoldState::new())),
            window,
            runtime,
            events,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Snapshot of the hold state (for diagnostics and tests).
    pub fn state(&self) -> KeyHoldState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn press(&self, code: KeyCode, mods: Modifiers) {
        let generation = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.press(code, mods, |ev| {
                let _ = self.events.send(ev);
            })
        };

        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let window = self.window;
        self.runtime.spawn(async move {
            tokio::time::sleep(window).await;
            let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
            state.expire(generation, |ev| {
                let _ = events.send(ev);
            });
        });
    }
}
