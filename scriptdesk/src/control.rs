use crate::command::ScriptCommand;
use crate::errors::AutomationError;
use crate::keys::{Key, Modifier};
use crate::location::{at, quote, Location};
use crate::script::{Osascript, ScriptExecutor, ScriptRunner};
use crate::settings::Settings;
use crate::wait::WaitPolicy;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Window titles, one per line. A comma-joined reply cannot tell
/// `"Budget, 2024"` from two windows.
pub(crate) const WINDOW_LIST_STATEMENT: &str =
    "set AppleScript's text item delimiters to linefeed; (name of every window) as text";

/// Remote control of one scriptable application
///
/// Everything above this layer (applications, dialogs, the spreadsheet
/// helpers) talks to the scripting host through a `RemoteControl`. It owns
/// the name of the window it currently works in and, optionally, a base
/// location that relative locations are resolved against.
///
/// Cloning copies that state: the clone and the original can change their
/// current window independently. Only the script runner is shared.
#[derive(Debug, Clone)]
pub struct RemoteControl {
    name: String,
    current_window_name: String,
    base_location: Option<Location>,
    runner: ScriptRunner,
    settings: Settings,
}

impl RemoteControl {
    /// A control that runs commands through `osascript`.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_settings(name, Settings::default())
    }

    pub fn with_settings(name: impl Into<String>, settings: Settings) -> Self {
        let executor = Arc::new(Osascript::new(settings.osascript_path.clone()));
        Self::with_executor(name, executor, settings)
    }

    pub fn with_executor(
        name: impl Into<String>,
        executor: Arc<dyn ScriptExecutor>,
        settings: Settings,
    ) -> Self {
        Self {
            name: name.into(),
            current_window_name: String::new(),
            base_location: None,
            runner: ScriptRunner::new(executor),
            settings,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn base_location(&self) -> Option<&Location> {
        self.base_location.as_ref()
    }

    pub fn set_base_location(&mut self, base: Option<Location>) {
        self.base_location = base;
    }

    /// A control for the same application rooted at `base`, e.g. a dialog sheet.
    pub fn scoped(&self, base: Location) -> RemoteControl {
        let mut control = self.clone();
        control.base_location = Some(base);
        control
    }

    pub fn current_window_name(&self) -> &str {
        &self.current_window_name
    }

    /// Record which window the application is working in. This is local
    /// state; nothing is sent to the application.
    pub fn set_current_window(&mut self, name: impl Into<String>) {
        self.current_window_name = name.into();
        debug!(app = %self.name, window = %self.current_window_name, "current window changed");
    }

    pub fn current_window_location(&self) -> Location {
        at().window(self.current_window_name.as_str())
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy::new(self.settings.wait_timeout(), self.settings.poll_interval())
    }

    pub fn execute(&self, command: &ScriptCommand) -> Result<String, AutomationError> {
        self.runner.execute(&command.to_string())
    }

    /// Run `statement` inside `tell application "<name>"`.
    pub fn tell(&self, statement: impl Into<String>) -> Result<String, AutomationError> {
        self.execute(&ScriptCommand::application(&self.name, statement))
    }

    /// Run `statement` nested in `scopes` (outermost first) inside the application.
    pub fn tell_scoped<S: AsRef<str>>(
        &self,
        scopes: &[S],
        statement: impl Into<String>,
    ) -> Result<String, AutomationError> {
        let inner = ScriptCommand::nested(scopes, statement);
        self.tell(inner.to_string())
    }

    /// Run `statement` in System Events, addressed to this application's process.
    pub fn system_event(&self, statement: impl Into<String>) -> Result<String, AutomationError> {
        self.execute(&ScriptCommand::system_event(&self.name, statement))
    }

    pub fn running(&self) -> Result<bool, AutomationError> {
        let command = ScriptCommand::application(
            "System Events",
            format!("(name of processes) contains {}", quote(&self.name)),
        );
        parse_bool(&self.execute(&command)?)
    }

    pub fn launch(&self) -> Result<(), AutomationError> {
        self.tell("launch").map(drop)
    }

    pub fn activate(&self) -> Result<(), AutomationError> {
        self.tell("activate").map(drop)
    }

    pub fn quit(&self) -> Result<(), AutomationError> {
        self.tell("quit").map(drop)
    }

    /// Raise the current window. When it is unknown or gone, the frontmost
    /// window is raised instead.
    pub fn focus(&self) -> Result<(), AutomationError> {
        let windows = self.window_list()?;
        let target = if windows.iter().any(|w| *w == self.current_window_name) {
            Some(self.current_window_name.as_str())
        } else {
            windows.first().map(String::as_str)
        };

        if let Some(window) = target {
            self.system_event(format!(
                "set value of attribute \"AXMain\" of window {} to true",
                quote(window)
            ))?;
        }
        Ok(())
    }

    pub fn get(&self, property: &str) -> Result<String, AutomationError> {
        self.tell(format!("get {property}"))
    }

    pub fn set(&self, property: &str, value: &str) -> Result<(), AutomationError> {
        self.tell(format!("set {property} to {}", quote(value)))
            .map(drop)
    }

    /// Top-level locations (windows, the menu bar) are taken as they are;
    /// anything else is nested in the base location, or in the current
    /// window when no base is set.
    pub fn resolve(&self, location: &Location) -> Result<Location, AutomationError> {
        location.validate()?;
        if location.has_top_level_element() {
            return Ok(location.clone());
        }
        Ok(match &self.base_location {
            Some(base) => location.join(base),
            None if !self.current_window_name.is_empty() => {
                location.join(&self.current_window_location())
            }
            None => location.clone(),
        })
    }

    pub fn exists(&self, location: &Location) -> Result<bool, AutomationError> {
        let location = self.resolve(location)?;
        parse_bool(&self.system_event(format!("exists {location}"))?)
    }

    pub fn not_exists(&self, location: &Location) -> Result<bool, AutomationError> {
        self.exists(location).map(|exists| !exists)
    }

    pub fn wait_until_exists(&self, location: &Location) -> Result<(), AutomationError> {
        self.wait_until_exists_for(location, self.settings.wait_timeout())
    }

    #[instrument(level = "debug", skip(self, location), fields(app = %self.name, location = %location))]
    pub fn wait_until_exists_for(
        &self,
        location: &Location,
        timeout: Duration,
    ) -> Result<(), AutomationError> {
        WaitPolicy::new(timeout, self.settings.poll_interval()).poll(
            format_args!("{location} to exist"),
            || Ok(self.exists(location)?.then_some(())),
        )
    }

    /// Wait until any of `locations` exists and return the first one that does.
    pub fn wait_until_any_exists(
        &self,
        locations: &[Location],
    ) -> Result<Location, AutomationError> {
        let description = locations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" or ");
        self.wait_policy()
            .poll(format_args!("{description} to exist"), || {
                for location in locations {
                    if self.exists(location)? {
                        return Ok(Some(location.clone()));
                    }
                }
                Ok(None)
            })
    }

    pub fn wait_until_not_exists(&self, location: &Location) -> Result<(), AutomationError> {
        self.wait_until_not_exists_for(location, self.settings.wait_timeout())
    }

    #[instrument(level = "debug", skip(self, location), fields(app = %self.name, location = %location))]
    pub fn wait_until_not_exists_for(
        &self,
        location: &Location,
        timeout: Duration,
    ) -> Result<(), AutomationError> {
        WaitPolicy::new(timeout, self.settings.poll_interval()).poll(
            format_args!("{location} to disappear"),
            || Ok(self.not_exists(location)?.then_some(())),
        )
    }

    pub fn click(&self, location: &Location) -> Result<(), AutomationError> {
        let location = self.resolve(location)?;
        self.system_event(format!("click {location}")).map(drop)
    }

    /// Wait for the element to exist, then click it.
    pub fn click_when_exists(&self, location: &Location) -> Result<(), AutomationError> {
        self.wait_until_exists(location)?;
        self.click(location)
    }

    /// Open the menu-bar menu `menu_name` and click `item` inside it.
    /// `item` is relative to that menu, e.g. `at().menu_item("Header Columns")`.
    pub fn click_menu_bar(&self, item: &Location, menu_name: &str) -> Result<(), AutomationError> {
        self.activate()?;
        let menu_bar = at().menu_bar_item(menu_name).menu_bar(1);
        self.click_when_exists(&menu_bar)?;
        let menu = at().menu(1) + &menu_bar;
        self.wait_until_exists(&menu)?;
        self.click_when_exists(&(item.clone() + &menu))
    }

    /// Bring the application and its current window forward, then press the key.
    #[instrument(level = "debug", skip(self, key), fields(app = %self.name))]
    pub fn keystroke(
        &self,
        key: impl Into<Key>,
        modifiers: &[Modifier],
    ) -> Result<(), AutomationError> {
        let key = key.into();
        self.activate()?;
        self.focus()?;
        self.system_event(key.statement(modifiers)).map(drop)
    }

    /// Wait until the current window exists, then press the key in whatever
    /// has keyboard focus right now. Focus is left alone so that an inline
    /// editor (a title being renamed, say) receives the key.
    pub fn keystroke_when_ready(
        &self,
        key: impl Into<Key>,
        modifiers: &[Modifier],
    ) -> Result<(), AutomationError> {
        let key = key.into();
        if !self.current_window_name.is_empty() {
            self.wait_until_exists(&self.current_window_location())?;
        }
        self.system_event(key.statement(modifiers)).map(drop)
    }

    pub fn set_value(&self, location: &Location, value: &str) -> Result<(), AutomationError> {
        let location = self.resolve(location)?;
        self.system_event(format!("set value of {location} to {}", quote(value)))
            .map(drop)
    }

    pub fn value_of(&self, location: &Location) -> Result<String, AutomationError> {
        let location = self.resolve(location)?;
        self.system_event(format!("get value of {location}"))
    }

    /// Titles of the application's windows, front to back.
    pub fn window_list(&self) -> Result<Vec<String>, AutomationError> {
        let output = self.system_event(WINDOW_LIST_STATEMENT)?;
        Ok(parse_lines(&output))
    }

    pub fn do_and_wait_for_new_window(
        &self,
        action: impl FnOnce() -> Result<(), AutomationError>,
    ) -> Result<String, AutomationError> {
        self.do_and_wait_for_new_window_within(self.settings.new_window_timeout(), action)
    }

    /// Run `action` and return the title of the single window it opened.
    ///
    /// The window list is snapshotted before `action` runs and then polled
    /// until exactly one title not in the snapshot shows up. If several new
    /// titles show up in the same poll the wait fails with
    /// [`AutomationError::AmbiguousWindows`] rather than guessing.
    #[instrument(level = "debug", skip(self, action), fields(app = %self.name))]
    pub fn do_and_wait_for_new_window_within(
        &self,
        timeout: Duration,
        action: impl FnOnce() -> Result<(), AutomationError>,
    ) -> Result<String, AutomationError> {
        let before = self.window_list()?;
        self.activate()?;
        action()?;

        let window = WaitPolicy::new(timeout, self.settings.poll_interval()).poll(
            "a new window",
            || {
                let mut appeared: Vec<String> = self
                    .window_list()?
                    .into_iter()
                    .filter(|w| !before.contains(w))
                    .collect();
                match appeared.len() {
                    0 => Ok(None),
                    1 => Ok(appeared.pop()),
                    _ => Err(AutomationError::AmbiguousWindows(appeared)),
                }
            },
        )?;
        debug!(app = %self.name, window = %window, "new window appeared");
        Ok(window)
    }
}

pub(crate) fn parse_bool(output: &str) -> Result<bool, AutomationError> {
    match output.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(AutomationError::Parse(format!(
            "expected true or false, got {other:?}"
        ))),
    }
}

/// One item per line. Blank lines are skipped, so an empty reply is an empty list.
pub(crate) fn parse_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}
