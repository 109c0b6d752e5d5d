//! AppleScript execution
//!
//! [`ScriptExecutor`] is the seam between command composition and the OS.
//! [`Osascript`] runs commands through the `osascript` binary; tests plug in
//! their own executor. [`ScriptRunner`] sits in front of either and adds the
//! process-wide debug tracing.

use crate::command::split_statements;
use crate::errors::AutomationError;
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, trace};

static DEBUG_PRINTS: AtomicBool = AtomicBool::new(false);

/// Runs a complete script command and returns its textual result
pub trait ScriptExecutor: Send + Sync {
    fn execute(&self, command: &str) -> Result<String, AutomationError>;
}

/// Executes through `osascript`, one `-e` argument per statement
#[derive(Debug, Clone)]
pub struct Osascript {
    program: String,
}

impl Osascript {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn arguments(command: &str) -> Vec<String> {
        split_statements(command)
            .into_iter()
            .flat_map(|statement| ["-e".to_string(), statement])
            .collect()
    }
}

impl Default for Osascript {
    fn default() -> Self {
        Self::new("osascript")
    }
}

impl ScriptExecutor for Osascript {
    fn execute(&self, command: &str) -> Result<String, AutomationError> {
        let output = Command::new(&self.program)
            .args(Self::arguments(command))
            .output()
            .map_err(|e| {
                AutomationError::execution(command, format!("Failed to run {}: {e}", self.program))
            })?;

        if output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            Ok(stdout.trim_end_matches(['\r', '\n']).to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(AutomationError::execution(command, stderr))
        }
    }
}

/// Front door for every command a control sends
#[derive(Clone)]
pub struct ScriptRunner {
    executor: Arc<dyn ScriptExecutor>,
}

impl std::fmt::Debug for ScriptRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptRunner").finish_non_exhaustive()
    }
}

impl ScriptRunner {
    pub fn new(executor: Arc<dyn ScriptExecutor>) -> Self {
        Self { executor }
    }

    pub fn enable_debug_prints() {
        DEBUG_PRINTS.store(true, Ordering::SeqCst);
    }

    pub fn disable_debug_prints() {
        DEBUG_PRINTS.store(false, Ordering::SeqCst);
    }

    pub fn debug_prints_enabled() -> bool {
        DEBUG_PRINTS.load(Ordering::SeqCst)
    }

    /// Blocks until the command has finished. Errors are returned as-is, never retried.
    pub fn execute(&self, command: &str) -> Result<String, AutomationError> {
        let result = self.executor.execute(command);

        if Self::debug_prints_enabled() {
            match &result {
                Ok(output) => info!(target: "scriptdesk::script", command, output = %output, "executed"),
                Err(e) => info!(target: "scriptdesk::script", command, error = %e, "failed"),
            }
        } else {
            trace!(target: "scriptdesk::script", command, ok = result.is_ok(), "executed");
        }

        result
    }
}
