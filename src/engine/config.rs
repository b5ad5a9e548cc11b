//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default debounce window for out-of-band triggers.
pub const DEFAULT_DEBOUNCE_WINDOW_MS: u64 = 5_000;

/// Default bound on redirects during entry resolution.
pub const DEFAULT_MAX_REDIRECTS: usize = 16;

/// Explicit, per-engine configuration.
///
/// # Example
///
/// ```rust
/// use traversal::engine::EngineConfig;
/// use std::time::Duration;
///
/// let config: EngineConfig = serde_json::from_str(r#"{"debounce_window_ms": 250}"#).unwrap();
/// assert_eq!(config.debounce_window(), Duration::from_millis(250));
/// assert_eq!(config.max_redirects, 16);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Triggers arriving within this many milliseconds of the traverser's
    /// last state entry are queued instead of applied.
    pub debounce_window_ms: u64,

    /// Maximum number of entry redirects before resolution fails.
    pub max_redirects: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce_window_ms: DEFAULT_DEBOUNCE_WINDOW_MS,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl EngineConfig {
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_window_ms)
    }

    pub fn with_debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }
}
