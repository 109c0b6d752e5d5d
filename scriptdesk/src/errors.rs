use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutomationError {
    /// The scripting host rejected or failed a command.
    #[error("Script execution failed: {message} (command: {command})")]
    Execution { command: String, message: String },

    /// A bounded wait ran out of time.
    #[error("Operation timed out after {elapsed:?} waiting for {condition}")]
    Timeout { condition: String, elapsed: Duration },

    /// A feature the operation needs is missing on this OS/application version.
    #[error("MacOS Versioning Error: {0}")]
    Versioning(String),

    #[error("More than one new window appeared: {0:?}")]
    AmbiguousWindows(Vec<String>),

    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    #[error("Unexpected script output: {0}")]
    Parse(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl AutomationError {
    pub(crate) fn execution(command: impl Into<String>, message: impl Into<String>) -> Self {
        AutomationError::Execution {
            command: command.into(),
            message: message.into(),
        }
    }

    /// True for errors a caller may answer with a fallback path instead of
    /// generic failure handling.
    pub fn is_versioning(&self) -> bool {
        matches!(self, AutomationError::Versioning(_))
    }
}
