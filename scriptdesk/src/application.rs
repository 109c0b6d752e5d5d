use crate::control::RemoteControl;
use crate::dialog::{TypicalPrintDialog, TypicalSaveDialog};
use crate::errors::AutomationError;
use crate::info::ApplicationInfo;
use crate::keys::{Key, Modifier};
use crate::location::{at, quote, Location};
use std::path::{Component, Path, PathBuf};
use std::thread;
use tracing::{debug, info, instrument};

const DONT_SAVE: &str = "Don’t Save";

/// What to do when closing runs into unsaved changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloseMode {
    /// Leave any confirmation sheet to the user
    #[default]
    UserChose,
    /// Answer a confirmation sheet with "Don’t Save"
    DontSave,
}

/// The document life cycle shared by most document-based applications:
/// open, new, save, save as, duplicate, close, quit.
///
/// Cloning gives an independent application object with its own copy of
/// the remote control state.
#[derive(Debug, Clone)]
pub struct TypicalApplication {
    control: RemoteControl,
}

impl TypicalApplication {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_control(RemoteControl::new(name))
    }

    pub fn with_control(control: RemoteControl) -> Self {
        Self { control }
    }

    pub fn name(&self) -> &str {
        self.control.name()
    }

    pub fn control(&self) -> &RemoteControl {
        &self.control
    }

    pub fn control_mut(&mut self) -> &mut RemoteControl {
        &mut self.control
    }

    pub fn set_control(&mut self, control: RemoteControl) {
        self.control = control;
    }

    /// Open a file by absolute path. The current window becomes the file's
    /// base name, which is what the window title shows.
    #[instrument(skip(self, filename), fields(app = %self.name()))]
    pub fn open(&mut self, filename: impl AsRef<Path>) -> Result<(), AutomationError> {
        let path = absolute_path(filename.as_ref())?;
        self.control
            .tell(format!("open {}", quote(&path.to_string_lossy())))?;
        self.control.set_current_window(base_name(&path)?);
        Ok(())
    }

    #[instrument(skip(self), fields(app = %self.name()))]
    pub fn new_document(&mut self) -> Result<(), AutomationError> {
        let control = &self.control;
        let window =
            control.do_and_wait_for_new_window(|| control.keystroke("n", &[Modifier::Command]))?;
        self.control.set_current_window(window);
        self.control.focus()
    }

    pub fn do_and_wait_for_new_window(
        &self,
        action: impl FnOnce() -> Result<(), AutomationError>,
    ) -> Result<String, AutomationError> {
        self.control.do_and_wait_for_new_window(action)
    }

    pub fn running(&self) -> Result<bool, AutomationError> {
        self.control.running()
    }

    pub fn launch(&self) -> Result<(), AutomationError> {
        self.control.launch()
    }

    pub fn activate(&self) -> Result<(), AutomationError> {
        self.control.activate()
    }

    pub fn focus(&self) -> Result<(), AutomationError> {
        self.control.focus()
    }

    /// Quit the application if it is running and wait until it is gone.
    ///
    /// With [`CloseMode::DontSave`] a confirmation sheet that shows up while
    /// quitting is answered with "Don’t Save", once.
    #[instrument(skip(self), fields(app = %self.name()))]
    pub fn quit(&self, mode: CloseMode) -> Result<(), AutomationError> {
        if !self.control.running()? {
            debug!("not running, nothing to quit");
            return Ok(());
        }
        self.control.quit()?;

        let mut dismissed = false;
        self.control
            .wait_policy()
            .poll(format_args!("{} to quit", self.name()), || {
                if !self.control.running()? {
                    return Ok(Some(()));
                }
                if mode == CloseMode::DontSave && !dismissed {
                    dismissed = self.dismiss_confirmation_sheet()?;
                }
                Ok(None)
            })?;
        info!(app = %self.name(), "quit");
        Ok(())
    }

    pub fn save(&self) -> Result<(), AutomationError> {
        self.control.keystroke("s", &[Modifier::Command])
    }

    /// An ellipsis on the File menu's Save item means saving goes through a dialog.
    pub fn save_pops_up_dialog(&self) -> Result<bool, AutomationError> {
        self.control.exists(&file_menu_item("Save…"))
    }

    /// Bring up the save sheet, either through plain Save (when that asks
    /// for a location) or through Save As.
    pub fn save_dialog(&self) -> Result<TypicalSaveDialog, AutomationError> {
        if self.save_pops_up_dialog()? {
            self.save()?;
        } else {
            self.control
                .keystroke("s", &[Modifier::Command, Modifier::Shift])?;
        }
        let sheet = at().sheet(1);
        self.control.wait_until_exists(&sheet)?;
        Ok(TypicalSaveDialog::with_control(
            self.control.scoped(self.control.resolve(&sheet)?),
        ))
    }

    /// Save the document under a new name.
    ///
    /// Where Duplicate exists the native Save As is unreliable, so the live
    /// document is duplicated, the original window closed, and the duplicate
    /// saved instead. This object then drives the duplicate.
    #[instrument(skip(self, filename), fields(app = %self.name()))]
    pub fn save_as(&mut self, filename: impl AsRef<Path>) -> Result<(), AutomationError> {
        let filename = filename.as_ref();
        if self.duplicate_available()? {
            let duplicate = self.duplicate()?;
            self.close(CloseMode::UserChose)?;
            self.control = duplicate.control().clone();
        }
        self.save_dialog()?.save(filename)?;
        self.control.set_current_window(base_name(filename)?);
        Ok(())
    }

    pub fn duplicate_available(&self) -> Result<bool, AutomationError> {
        self.control.exists(&file_menu_item("Duplicate"))
    }

    /// Duplicate the current document and return an application object for
    /// the copy. Nothing is rolled back if a step fails half way.
    #[instrument(skip(self), fields(app = %self.name()))]
    pub fn duplicate(&self) -> Result<TypicalApplication, AutomationError> {
        if !self.duplicate_available()? {
            return Err(AutomationError::Versioning(
                "Duplicate is not available on this Mac version".to_string(),
            ));
        }

        let control = &self.control;
        let first = control.do_and_wait_for_new_window(|| {
            control.keystroke("s", &[Modifier::Command, Modifier::Shift])
        })?;
        debug!(window = %first, "duplicate window opened");

        let mut duplicate = self.clone();
        let settle = control.settings().duplicate_settle_delay();
        let renamed = control.do_and_wait_for_new_window(|| {
            thread::sleep(settle);
            control.keystroke_when_ready(Key::Return, &[])
        })?;
        duplicate.control.set_current_window(renamed);
        Ok(duplicate)
    }

    pub fn close(&self, mode: CloseMode) -> Result<(), AutomationError> {
        self.control.keystroke("w", &[Modifier::Command])?;
        if mode == CloseMode::DontSave {
            self.wait_for_window_and_dialogs_to_close(mode)?;
        }
        Ok(())
    }

    /// Wait for the current window to close, answering a confirmation sheet
    /// with "Don’t Save" on the way. A no-op for [`CloseMode::UserChose`].
    pub fn wait_for_window_and_dialogs_to_close(
        &self,
        mode: CloseMode,
    ) -> Result<(), AutomationError> {
        if mode == CloseMode::UserChose {
            return Ok(());
        }
        let window = self.control.current_window_location();
        let mut dismissed = false;
        self.control
            .wait_policy()
            .poll(format_args!("{window} to close"), || {
                if !self.control.exists(&window)? {
                    return Ok(Some(()));
                }
                if !dismissed {
                    dismissed = self.dismiss_confirmation_sheet()?;
                }
                Ok(None)
            })
    }

    fn dismiss_confirmation_sheet(&self) -> Result<bool, AutomationError> {
        if !self.control.exists(&at().sheet(1))? {
            return Ok(false);
        }
        self.control
            .click_when_exists(&at().button(DONT_SAVE).sheet(1))?;
        Ok(true)
    }

    pub fn copy(&self) -> Result<(), AutomationError> {
        self.control.keystroke("c", &[Modifier::Command])
    }

    pub fn cut(&self) -> Result<(), AutomationError> {
        self.control.keystroke("x", &[Modifier::Command])
    }

    pub fn paste(&self) -> Result<(), AutomationError> {
        self.control.keystroke("v", &[Modifier::Command])
    }

    pub fn select_all(&self) -> Result<(), AutomationError> {
        self.control.keystroke("a", &[Modifier::Command])
    }

    pub fn print_dialog(&self) -> Result<TypicalPrintDialog, AutomationError> {
        self.control.keystroke("p", &[Modifier::Command])?;
        let sheet = at().sheet(1);
        self.control.wait_until_exists(&sheet)?;
        Ok(TypicalPrintDialog::with_control(
            self.control.scoped(self.control.resolve(&sheet)?),
        ))
    }

    pub fn get_info(&self) -> Result<ApplicationInfo, AutomationError> {
        let reply = self.control.tell(format!(
            "get info for (path to application {})",
            quote(self.name())
        ))?;
        ApplicationInfo::parse(&reply)
    }

    /// New document, fill it in with `fill`, save it as `filename`, close it.
    pub fn create_document(
        &mut self,
        filename: impl AsRef<Path>,
        fill: impl FnOnce(&mut Self) -> Result<(), AutomationError>,
    ) -> Result<(), AutomationError> {
        self.new_document()?;
        fill(self)?;
        self.save_as(filename)?;
        self.close(CloseMode::UserChose)
    }
}

fn file_menu_item(name: &str) -> Location {
    at().menu_item(name)
        .menu(1)
        .menu_bar_item("File")
        .menu_bar(1)
}

pub(crate) fn base_name(path: &Path) -> Result<String, AutomationError> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| AutomationError::InvalidArgument(format!("{} has no file name", path.display())))
}

/// Absolute, with `.` and `..` folded away.
pub(crate) fn absolute_path(path: &Path) -> Result<PathBuf, AutomationError> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| {
                AutomationError::InvalidArgument(format!("Cannot resolve {}: {e}", path.display()))
            })?
            .join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}
