//! Dialogs that hang off an application window
//!
//! A dialog is a [`RemoteControl`] scoped to the dialog's own window or
//! sheet, so every relative location it uses resolves inside the dialog.

use crate::control::RemoteControl;
use crate::errors::AutomationError;
use crate::keys::Modifier;
use crate::location::{at, Location};
use std::path::Path;
use tracing::{debug, instrument};

/// The standard save panel
#[derive(Debug, Clone)]
pub struct TypicalSaveDialog {
    control: RemoteControl,
}

impl TypicalSaveDialog {
    pub fn new(app_name: &str, location: Location) -> Self {
        Self::with_control(RemoteControl::new(app_name).scoped(location))
    }

    /// Use an already scoped control.
    pub fn with_control(control: RemoteControl) -> Self {
        Self { control }
    }

    pub fn control(&self) -> &RemoteControl {
        &self.control
    }

    fn location(&self) -> Location {
        self.control.base_location().cloned().unwrap_or_default()
    }

    pub fn set_filename(&self, filename: &str) -> Result<(), AutomationError> {
        self.control.set_value(&at().text_field(1), filename)
    }

    /// Navigate through the Go To Folder sheet.
    pub fn set_folder(&self, folder: &Path) -> Result<(), AutomationError> {
        let go_to_folder = at().sheet(1);
        self.control
            .keystroke("g", &[Modifier::Command, Modifier::Shift])?;
        self.control.wait_until_exists(&go_to_folder)?;
        self.control
            .set_value(&at().text_field(1).sheet(1), &folder.to_string_lossy())?;
        self.control.click(&at().button("Go").sheet(1))?;
        self.control.wait_until_not_exists(&go_to_folder)
    }

    pub fn click_save(&self) -> Result<(), AutomationError> {
        self.control.click(&at().button("Save"))?;
        self.control.wait_until_not_exists(&self.location())
    }

    #[instrument(level = "debug", skip(self, filename), fields(dialog = %self.location()))]
    pub fn save(&self, filename: impl AsRef<Path>) -> Result<(), AutomationError> {
        let path = filename.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                AutomationError::InvalidArgument(format!("{} has no file name", path.display()))
            })?;

        self.set_filename(&name)?;
        if let Some(folder) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.set_folder(folder)?;
        }
        self.click_save()
    }
}

/// The standard print panel
#[derive(Debug, Clone)]
pub struct TypicalPrintDialog {
    control: RemoteControl,
}

impl TypicalPrintDialog {
    pub fn new(app_name: &str, location: Location) -> Self {
        Self::with_control(RemoteControl::new(app_name).scoped(location))
    }

    pub fn with_control(control: RemoteControl) -> Self {
        Self { control }
    }

    pub fn control(&self) -> &RemoteControl {
        &self.control
    }

    fn location(&self) -> Location {
        self.control.base_location().cloned().unwrap_or_default()
    }

    pub fn print(&self) -> Result<(), AutomationError> {
        self.control.click_when_exists(&at().button("Print"))?;
        self.control.wait_until_not_exists(&self.location())
    }

    /// Save through the PDF menu: pick "Save as PDF…", fill in the save
    /// panel that opens, and wait for the print panel to go away.
    #[instrument(level = "debug", skip(self, filename), fields(dialog = %self.location()))]
    pub fn save_as_pdf(&self, filename: impl AsRef<Path>) -> Result<(), AutomationError> {
        let pdf_button = at().menu_button("PDF");
        self.control.click_when_exists(&pdf_button)?;

        let pdf_menu = at().menu(1) + &pdf_button;
        self.control.wait_until_exists(&pdf_menu)?;
        self.control
            .click_when_exists(&(at().menu_item(2) + &pdf_menu))?;

        // The save panel is either its own window or a sheet on the print panel.
        let save_location = self
            .control
            .wait_until_any_exists(&[at().window("Save"), at().sheet(1) + self.location()])?;
        debug!(location = %save_location, "save panel appeared");

        self.create_save_dialog(save_location).save(filename)?;
        self.control.wait_until_not_exists(&self.location())?;

        let confirm = at().checkbox(1);
        if self.control.exists(&confirm)? {
            self.control.click_when_exists(&confirm)?;
        }
        Ok(())
    }

    fn create_save_dialog(&self, location: Location) -> TypicalSaveDialog {
        TypicalSaveDialog::with_control(self.control.scoped(location))
    }
}
