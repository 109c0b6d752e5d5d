//! Numbers spreadsheet helpers
//!
//! Cell commands address the first table of the first sheet of the front
//! document.

use crate::application::{CloseMode, TypicalApplication};
use crate::command::table_scopes;
use crate::control::RemoteControl;
use crate::errors::AutomationError;
use crate::keys::{Key, Modifier};
use crate::location::{at, quote};
use std::path::Path;
use tracing::debug;

pub const APPLICATION_NAME: &str = "Numbers";

#[derive(Debug, Clone)]
pub struct Numbers {
    app: TypicalApplication,
}

impl Default for Numbers {
    fn default() -> Self {
        Self::new()
    }
}

impl Numbers {
    pub fn new() -> Self {
        Self::with_control(RemoteControl::new(APPLICATION_NAME))
    }

    pub fn with_control(control: RemoteControl) -> Self {
        Self {
            app: TypicalApplication::with_control(control),
        }
    }

    pub fn app(&self) -> &TypicalApplication {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut TypicalApplication {
        &mut self.app
    }

    fn tell_table(&self, statement: String) -> Result<String, AutomationError> {
        self.app
            .control()
            .tell_scoped(&table_scopes(1, 1, 1), statement)
    }

    pub fn column_count(&self) -> Result<usize, AutomationError> {
        let reply = self.tell_table("get column count".to_string())?;
        reply.trim().parse().map_err(|e| {
            AutomationError::Parse(format!("column count {reply:?} is not a number: {e}"))
        })
    }

    pub fn set_column_count(&self, count: usize) -> Result<(), AutomationError> {
        self.tell_table(format!("set column count to {count}"))
            .map(drop)
    }

    /// Set a cell, growing the table first when `column` is past its last column.
    pub fn fill_cell(&self, column: usize, row: usize, value: &str) -> Result<(), AutomationError> {
        let columns = self.column_count()?;
        if column > columns {
            debug!(columns, column, "extending table");
            self.set_column_count(column)?;
        }
        self.tell_table(format!(
            "set value of cell {column} of row {row} to {}",
            quote(value)
        ))
        .map(drop)
    }

    /// New opens the template chooser first; Return picks the selected blank template.
    pub fn new_document(&mut self) -> Result<(), AutomationError> {
        let control = self.app.control();
        let chooser =
            control.do_and_wait_for_new_window(|| control.keystroke("n", &[Modifier::Command]))?;
        self.app.control_mut().set_current_window(chooser);

        let control = self.app.control();
        let document =
            control.do_and_wait_for_new_window(|| control.keystroke(Key::Return, &[]))?;
        self.app.control_mut().set_current_window(document);
        Ok(())
    }

    pub fn set_header_columns(&self, count: usize) -> Result<(), AutomationError> {
        let item = at()
            .menu_item(count.to_string())
            .menu(1)
            .menu_item("Header Columns");
        self.app.control().click_menu_bar(&item, "Table")
    }

    pub fn create_document(
        &mut self,
        filename: impl AsRef<Path>,
        fill: impl FnOnce(&mut Self) -> Result<(), AutomationError>,
    ) -> Result<(), AutomationError> {
        self.new_document()?;
        fill(self)?;
        self.app.save_as(filename)?;
        self.app.close(CloseMode::UserChose)
    }

    /// Start Numbers and build one document in a single call.
    pub fn create(
        filename: impl AsRef<Path>,
        fill: impl FnOnce(&mut Self) -> Result<(), AutomationError>,
    ) -> Result<Self, AutomationError> {
        let mut numbers = Self::new();
        numbers.create_document(filename, fill)?;
        Ok(numbers)
    }
}
