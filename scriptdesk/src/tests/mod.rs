mod control_tests;

use crate::command::ScriptCommand;
use crate::control::{RemoteControl, WINDOW_LIST_STATEMENT};
use crate::errors::AutomationError;
use crate::script::ScriptExecutor;
use crate::settings::Settings;
use std::sync::{Arc, Mutex};

pub(crate) const APP: &str = "ApplicationName";

type Responder = Box<dyn FnMut(&str) -> Result<String, AutomationError> + Send>;

/// Scripting host stand-in: records every command and answers through a closure.
pub(crate) struct FakeScripting {
    log: Mutex<Vec<String>>,
    responder: Mutex<Responder>,
}

impl FakeScripting {
    pub(crate) fn new(
        responder: impl FnMut(&str) -> Result<String, AutomationError> + Send + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            log: Mutex::new(Vec::new()),
            responder: Mutex::new(Box::new(responder)),
        })
    }

    /// Answers every command with an empty reply.
    pub(crate) fn silent() -> Arc<Self> {
        Self::new(|_| Ok(String::new()))
    }

    pub(crate) fn commands(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, needle: &str) -> usize {
        self.commands().iter().filter(|c| c.contains(needle)).count()
    }

    pub(crate) fn position(&self, needle: &str) -> Option<usize> {
        self.commands().iter().position(|c| c.contains(needle))
    }
}

impl ScriptExecutor for FakeScripting {
    fn execute(&self, command: &str) -> Result<String, AutomationError> {
        self.log.lock().unwrap().push(command.to_string());
        let mut responder = self.responder.lock().unwrap();
        (*responder)(command)
    }
}

pub(crate) fn fast_settings() -> Settings {
    Settings {
        poll_interval_ms: 1,
        wait_timeout_ms: 300,
        new_window_timeout_ms: 300,
        duplicate_settle_delay_ms: 0,
        ..Settings::default()
    }
}

pub(crate) fn control_for(name: &str, fake: &Arc<FakeScripting>) -> RemoteControl {
    init_tracing();
    RemoteControl::with_executor(name, fake.clone(), fast_settings())
}

pub(crate) fn tell(statement: &str) -> String {
    ScriptCommand::application(APP, statement).to_string()
}

pub(crate) fn system_event(statement: &str) -> String {
    ScriptCommand::system_event(APP, statement).to_string()
}

/// True when `command` is the System Events statement `exists <location>`.
pub(crate) fn asks_exists(command: &str, location: &str) -> bool {
    command.contains(&format!("; exists {location}; end tell"))
}

pub(crate) fn is_window_list(command: &str) -> bool {
    command.contains(WINDOW_LIST_STATEMENT)
}

pub(crate) fn is_running_check(command: &str) -> bool {
    command.contains("(name of processes) contains")
}

pub(crate) fn reply_bool(value: bool) -> Result<String, AutomationError> {
    Ok(value.to_string())
}

pub(crate) fn reply_list(items: &[String]) -> Result<String, AutomationError> {
    Ok(items.join("\n"))
}

// Initialize tracing for tests
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_test_writer()
        .try_init();
}
