use crate::errors::AutomationError;
use crate::script::ScriptRunner;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_POLL_INTERVAL_MS: u64 = 100;
const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_NEW_WINDOW_TIMEOUT_MS: u64 = 10_000;
/// Pause between the two window waits of a duplicate. Without it some
/// application versions crash while the duplicate window is still settling.
pub const DUPLICATE_SETTLE_DELAY_MS: u64 = 400;

/// Timing and host configuration shared by a control and everything scoped from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Delay between two probes of a polling wait
    pub poll_interval_ms: u64,
    /// Budget for `wait_until_exists` and friends
    pub wait_timeout_ms: u64,
    /// Budget for `do_and_wait_for_new_window`
    pub new_window_timeout_ms: u64,
    pub duplicate_settle_delay_ms: u64,
    /// Program used to run AppleScript
    pub osascript_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            wait_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            new_window_timeout_ms: DEFAULT_NEW_WINDOW_TIMEOUT_MS,
            duplicate_settle_delay_ms: DUPLICATE_SETTLE_DELAY_MS,
            osascript_path: "osascript".to_string(),
        }
    }
}

impl Settings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    pub fn new_window_timeout(&self) -> Duration {
        Duration::from_millis(self.new_window_timeout_ms)
    }

    pub fn duplicate_settle_delay(&self) -> Duration {
        Duration::from_millis(self.duplicate_settle_delay_ms)
    }

    pub fn from_json_str(json: &str) -> Result<Self, AutomationError> {
        serde_json::from_str(json)
            .map_err(|e| AutomationError::InvalidArgument(format!("Invalid settings: {e}")))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AutomationError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            AutomationError::InvalidArgument(format!(
                "Failed to read settings {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&text)
    }

    /// Defaults overlaid with `SCRIPTDESK_*` environment variables.
    ///
    /// A truthy `SCRIPTDESK_DEBUG` also turns on the process-wide debug prints.
    pub fn from_env() -> Result<Self, AutomationError> {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AutomationError> {
        let millis = |key: &str, target: &mut u64| -> Result<(), AutomationError> {
            if let Some(value) = lookup(key) {
                *target = value.trim().parse().map_err(|e| {
                    AutomationError::InvalidArgument(format!("{key}={value:?}: {e}"))
                })?;
            }
            Ok(())
        };
        millis("SCRIPTDESK_POLL_INTERVAL_MS", &mut self.poll_interval_ms)?;
        millis("SCRIPTDESK_WAIT_TIMEOUT_MS", &mut self.wait_timeout_ms)?;
        millis("SCRIPTDESK_NEW_WINDOW_TIMEOUT_MS", &mut self.new_window_timeout_ms)?;
        millis("SCRIPTDESK_SETTLE_DELAY_MS", &mut self.duplicate_settle_delay_ms)?;

        if let Some(path) = lookup("SCRIPTDESK_OSASCRIPT") {
            self.osascript_path = path;
        }
        if let Some(flag) = lookup("SCRIPTDESK_DEBUG") {
            if matches!(flag.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on") {
                ScriptRunner::enable_debug_prints();
            }
        }
        Ok(self)
    }
}
