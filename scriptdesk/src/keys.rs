//! Keystroke vocabulary for System Events input synthesis
use crate::errors::AutomationError;
use crate::location::quote;
use std::fmt;

/// A key to press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// Typed text, sent as `keystroke "<text>"`
    Text(String),
    Return,
    Tab,
    Space,
    Escape,
    Delete,
    LeftArrow,
    RightArrow,
    UpArrow,
    DownArrow,
}

impl Key {
    /// Parse a key by name, falling back to literal text for single characters.
    pub fn from_name(name: &str) -> Result<Key, AutomationError> {
        match name.to_lowercase().as_str() {
            "return" | "enter" => Ok(Key::Return),
            "tab" => Ok(Key::Tab),
            "space" => Ok(Key::Space),
            "escape" | "esc" => Ok(Key::Escape),
            "delete" | "backspace" => Ok(Key::Delete),
            "left" | "leftarrow" => Ok(Key::LeftArrow),
            "right" | "rightarrow" => Ok(Key::RightArrow),
            "up" | "uparrow" => Ok(Key::UpArrow),
            "down" | "downarrow" => Ok(Key::DownArrow),
            _ if name.chars().count() == 1 => Ok(Key::Text(name.to_string())),
            _ => Err(AutomationError::InvalidArgument(format!(
                "Unknown key: {name}"
            ))),
        }
    }

    /// The System Events statement that presses this key.
    pub fn statement(&self, modifiers: &[Modifier]) -> String {
        let press = match self {
            Key::Text(text) => format!("keystroke {}", quote(text)),
            Key::Return => "keystroke return".to_string(),
            Key::Tab => "keystroke tab".to_string(),
            Key::Space => "keystroke space".to_string(),
            Key::Escape => "key code 53".to_string(),
            Key::Delete => "key code 51".to_string(),
            Key::LeftArrow => "key code 123".to_string(),
            Key::RightArrow => "key code 124".to_string(),
            Key::DownArrow => "key code 125".to_string(),
            Key::UpArrow => "key code 126".to_string(),
        };
        if modifiers.is_empty() {
            return press;
        }
        let using = modifiers
            .iter()
            .map(|m| format!("{m} down"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{press} using {{{using}}}")
    }
}

impl From<&str> for Key {
    fn from(text: &str) -> Self {
        Key::Text(text.to_string())
    }
}

impl From<char> for Key {
    fn from(c: char) -> Self {
        Key::Text(c.to_string())
    }
}

/// Keyboard modifier keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Command,
    Shift,
    Option,
    Control,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Modifier::Command => "command",
            Modifier::Shift => "shift",
            Modifier::Option => "option",
            Modifier::Control => "control",
        })
    }
}
