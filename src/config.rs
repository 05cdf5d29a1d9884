//! Runtime configuration read from the environment.

use std::env;
use std::time::Duration;

use crate::input::InputConfig;
use crate::term::RendererConfig;
use crate::types::{KEY_RELEASE_MS, TICK_MS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Simulation step interval.
    pub tick: Duration,
    /// Quiescence window before a synthesized key release.
    pub key_release: Duration,
    pub title: String,
    /// Log file; no logging without one.
    pub log_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(TICK_MS),
            key_release: Duration::from_millis(KEY_RELEASE_MS),
            title: RendererConfig::default().title,
            log_path: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unparsable values fall back to
    /// the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let millis = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|s| s.trim().parse::<u64>().ok())
                .filter(|&ms| ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(default)
        };
        let tick = millis("VT_ARCADE_TICK_MS", defaults.tick);
        let key_release = millis("VT_ARCADE_KEY_RELEASE_MS", defaults.key_release);

        let title = lookup("VT_ARCADE_TITLE")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.title);

        let log_path = lookup("VT_ARCADE_LOG_PATH")
            .map(|s| s.trim().to_string())
            .and_then(|s| if s.is_empty() { None } else { Some(s) });

        Self {
            tick,
            key_release,
            title,
            log_path,
        }
    }

    pub fn input(&self) -> InputConfig {
        InputConfig {
            key_release: self.key_release,
        }
    }

    pub fn renderer(&self) -> RendererConfig {
        RendererConfig {
            title: self.title.clone(),
        }
    }
}
