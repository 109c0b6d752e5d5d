//! Remote control of scriptable macOS document applications
//!
//! Commands are composed as nested AppleScript `tell` blocks and run
//! through `osascript`. Where an application has no scripting command for
//! an action, keystrokes and menu clicks are synthesized through System
//! Events and the result is observed by polling the accessibility tree.
//!
//! ```no_run
//! use scriptdesk::{CloseMode, TypicalApplication};
//!
//! let mut keynote = TypicalApplication::new("Keynote");
//! keynote.open("talk.key")?;
//! keynote.save_as("/tmp/talk-copy.key")?;
//! keynote.quit(CloseMode::DontSave)?;
//! # Ok::<(), scriptdesk::AutomationError>(())
//! ```

pub mod application;
pub mod command;
pub mod control;
pub mod dialog;
pub mod errors;
pub mod info;
pub mod keys;
pub mod location;
pub mod numbers;
pub mod script;
pub mod settings;
#[cfg(test)]
mod tests;
pub mod wait;

pub use application::{CloseMode, TypicalApplication};
pub use command::ScriptCommand;
pub use control::RemoteControl;
pub use dialog::{TypicalPrintDialog, TypicalSaveDialog};
pub use errors::AutomationError;
pub use info::ApplicationInfo;
pub use keys::{Key, Modifier};
pub use location::{at, ElementKind, Identifier, Location};
pub use numbers::Numbers;
pub use script::{Osascript, ScriptExecutor, ScriptRunner};
pub use settings::Settings;
pub use wait::WaitPolicy;
