use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default confirmation radius around the preview anchor, in world units.
pub const DEFAULT_CONFIRM_TOLERANCE: f64 = 25.0;

/// Default delay before an errored session returns to destination selection.
pub const DEFAULT_ERROR_RECOVERY_MS: u64 = 2_000;

/// Behaviour of one movement controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// A tap at most this far from the anchor confirms the preview.
    pub confirm_tolerance: f64,
    pub error_recovery_ms: u64,
    /// Post a summary to chat after each completed move.
    pub chat_summary: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            confirm_tolerance: DEFAULT_CONFIRM_TOLERANCE,
            error_recovery_ms: DEFAULT_ERROR_RECOVERY_MS,
            chat_summary: true,
        }
    }
}

impl SessionConfig {
    pub fn error_recovery(&self) -> Duration {
        Duration::from_millis(self.error_recovery_ms)
    }
}
