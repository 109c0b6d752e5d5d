//! Script command composition
//!
//! Commands are written on one line with `;` between statements. Every
//! `tell <scope>` opens a block that is closed by exactly one `end tell`,
//! innermost first. Nothing here checks that a command makes sense to the
//! target application; this layer is purely syntactic.

use crate::location::quote;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    Statement(String),
    Tell {
        scope: String,
        body: Vec<ScriptCommand>,
    },
}

impl ScriptCommand {
    pub fn statement(text: impl Into<String>) -> Self {
        ScriptCommand::Statement(text.into())
    }

    pub fn tell(scope: impl Into<String>, body: Vec<ScriptCommand>) -> Self {
        ScriptCommand::Tell {
            scope: scope.into(),
            body,
        }
    }

    /// Wrap `statement` in one tell block per scope, outermost scope first.
    pub fn nested<S: AsRef<str>>(scopes: &[S], statement: impl Into<String>) -> Self {
        scopes
            .iter()
            .rev()
            .fold(ScriptCommand::statement(statement), |inner, scope| {
                ScriptCommand::tell(scope.as_ref(), vec![inner])
            })
    }

    /// `tell application "<name>"; …; end tell`
    pub fn application(name: &str, statement: impl Into<String>) -> Self {
        ScriptCommand::nested(&[application_scope(name)], statement)
    }

    /// Wraps a statement for System Events, scoped to the application's process.
    pub fn system_event(process: &str, statement: impl Into<String>) -> Self {
        ScriptCommand::nested(
            &[application_scope("System Events"), process_scope(process)],
            statement,
        )
    }
}

impl fmt::Display for ScriptCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptCommand::Statement(text) => f.write_str(text),
            ScriptCommand::Tell { scope, body } => {
                write!(f, "tell {scope}; ")?;
                for command in body {
                    write!(f, "{command}; ")?;
                }
                f.write_str("end tell")
            }
        }
    }
}

pub fn application_scope(name: &str) -> String {
    format!("application {}", quote(name))
}

pub fn process_scope(name: &str) -> String {
    format!("process {}", quote(name))
}

/// The document → sheet → table scopes used by spreadsheet commands.
pub fn table_scopes(document: usize, sheet: usize, table: usize) -> [String; 3] {
    [
        format!("document {document}"),
        format!("sheet {sheet}"),
        format!("table {table}"),
    ]
}

/// Split a `;`-separated command into its statements. Semicolons inside
/// quoted strings belong to the string.
pub fn split_statements(command: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in command.chars() {
        match c {
            _ if escaped => {
                escaped = false;
                current.push(c);
            }
            '\\' if in_string => {
                escaped = true;
                current.push(c);
            }
            '"' => {
                in_string = !in_string;
                current.push(c);
            }
            ';' if !in_string => {
                statements.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    statements.push(current.trim().to_string());
    statements.retain(|s| !s.is_empty());
    statements
}
