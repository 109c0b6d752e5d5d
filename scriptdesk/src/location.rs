//! Accessibility locations
//!
//! A [`Location`] is the path System Events uses to reach a UI element. It
//! reads inner-to-outer, the same way AppleScript expresses containment:
//! `button "Save" of sheet 1 of window "Report"`. Builder calls append in
//! that textual order, so the first call names the innermost element.

use crate::errors::AutomationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

/// The kind of a UI element as System Events names it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Window,
    Sheet,
    Menu,
    MenuItem,
    MenuBar,
    MenuBarItem,
    MenuButton,
    Button,
    Checkbox,
    TextField,
    PopUpButton,
    Group,
    ScrollArea,
    StaticText,
    SplitterGroup,
    RadioGroup,
    RadioButton,
    Toolbar,
    Row,
    Outline,
    UiElement,
}

impl ElementKind {
    pub const ALL: [ElementKind; 21] = [
        ElementKind::Window,
        ElementKind::Sheet,
        ElementKind::Menu,
        ElementKind::MenuItem,
        ElementKind::MenuBar,
        ElementKind::MenuBarItem,
        ElementKind::MenuButton,
        ElementKind::Button,
        ElementKind::Checkbox,
        ElementKind::TextField,
        ElementKind::PopUpButton,
        ElementKind::Group,
        ElementKind::ScrollArea,
        ElementKind::StaticText,
        ElementKind::SplitterGroup,
        ElementKind::RadioGroup,
        ElementKind::RadioButton,
        ElementKind::Toolbar,
        ElementKind::Row,
        ElementKind::Outline,
        ElementKind::UiElement,
    ];

    /// The AppleScript class name
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Window => "window",
            ElementKind::Sheet => "sheet",
            ElementKind::Menu => "menu",
            ElementKind::MenuItem => "menu item",
            ElementKind::MenuBar => "menu bar",
            ElementKind::MenuBarItem => "menu bar item",
            ElementKind::MenuButton => "menu button",
            ElementKind::Button => "button",
            ElementKind::Checkbox => "checkbox",
            ElementKind::TextField => "text field",
            ElementKind::PopUpButton => "pop up button",
            ElementKind::Group => "group",
            ElementKind::ScrollArea => "scroll area",
            ElementKind::StaticText => "static text",
            ElementKind::SplitterGroup => "splitter group",
            ElementKind::RadioGroup => "radio group",
            ElementKind::RadioButton => "radio button",
            ElementKind::Toolbar => "toolbar",
            ElementKind::Row => "row",
            ElementKind::Outline => "outline",
            ElementKind::UiElement => "UI element",
        }
    }

    pub fn from_name(name: &str) -> Option<ElementKind> {
        ElementKind::ALL.iter().copied().find(|k| k.as_str() == name)
    }

    /// Windows and the menu bar are rooted at the application process itself.
    pub fn is_top_level(&self) -> bool {
        matches!(self, ElementKind::Window | ElementKind::MenuBar)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a segment addresses its element: by 1-based index or by name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Identifier {
    Index(i64),
    Name(String),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Index(index) => write!(f, "{index}"),
            Identifier::Name(name) => f.write_str(&quote(name)),
        }
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Identifier::Name(name.to_string())
    }
}

impl From<String> for Identifier {
    fn from(name: String) -> Self {
        Identifier::Name(name)
    }
}

impl From<&String> for Identifier {
    fn from(name: &String) -> Self {
        Identifier::Name(name.clone())
    }
}

impl From<i32> for Identifier {
    fn from(index: i32) -> Self {
        Identifier::Index(index as i64)
    }
}

impl From<i64> for Identifier {
    fn from(index: i64) -> Self {
        Identifier::Index(index)
    }
}

impl From<u32> for Identifier {
    fn from(index: u32) -> Self {
        Identifier::Index(index as i64)
    }
}

/// Indexes past `i64::MAX` saturate rather than wrap negative.
impl From<usize> for Identifier {
    fn from(index: usize) -> Self {
        Identifier::Index(i64::try_from(index).unwrap_or(i64::MAX))
    }
}

/// One `<kind> <identifier>` step of a location
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    pub kind: ElementKind,
    pub id: Identifier,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// An immutable accessibility path, innermost segment first
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    segments: Vec<Segment>,
}

/// Start an empty location: `at().button("OK").sheet(1)`
pub fn at() -> Location {
    Location::default()
}

macro_rules! element_builders {
    ($($method:ident => $kind:ident),* $(,)?) => {
        impl Location {
            $(
                pub fn $method(self, id: impl Into<Identifier>) -> Self {
                    self.push(ElementKind::$kind, id.into())
                }
            )*
        }
    };
}

element_builders! {
    window => Window,
    sheet => Sheet,
    menu => Menu,
    menu_item => MenuItem,
    menu_bar => MenuBar,
    menu_bar_item => MenuBarItem,
    menu_button => MenuButton,
    button => Button,
    checkbox => Checkbox,
    text_field => TextField,
    pop_up_button => PopUpButton,
    group => Group,
    scroll_area => ScrollArea,
    static_text => StaticText,
    splitter_group => SplitterGroup,
    radio_group => RadioGroup,
    radio_button => RadioButton,
    toolbar => Toolbar,
    row => Row,
    outline => Outline,
    ui_element => UiElement,
}

impl Location {
    pub fn push(mut self, kind: ElementKind, id: Identifier) -> Self {
        self.segments.push(Segment { kind, id });
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// This location nested inside `base`.
    pub fn join(&self, base: &Location) -> Location {
        let mut segments = self.segments.clone();
        segments.extend(base.segments.iter().cloned());
        Location { segments }
    }

    pub fn has_top_level_element(&self) -> bool {
        self.segments.iter().any(|s| s.kind.is_top_level())
    }

    /// Index segments are 1-based.
    pub fn validate(&self) -> Result<(), AutomationError> {
        for segment in &self.segments {
            if let Identifier::Index(index) = segment.id {
                if index < 1 {
                    return Err(AutomationError::InvalidLocation(format!(
                        "{} index {index} in `{self}` must be 1 or greater",
                        segment.kind
                    )));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(" of ")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl Add for Location {
    type Output = Location;

    fn add(self, base: Location) -> Location {
        self.join(&base)
    }
}

impl Add<&Location> for Location {
    type Output = Location;

    fn add(self, base: &Location) -> Location {
        self.join(base)
    }
}

static SEGMENT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    // Longest names first so "menu bar item" wins over "menu bar" and "menu".
    let mut kinds: Vec<&str> = ElementKind::ALL.iter().map(|k| k.as_str()).collect();
    kinds.sort_by_key(|k| std::cmp::Reverse(k.len()));
    let alternation = kinds
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(
        r#"^({alternation}) (?:(-?\d+)|"((?:[^"\\]|\\.)*)")(?: of |$)"#
    ))
    .expect("segment pattern is a valid regex")
});

impl FromStr for Location {
    type Err = AutomationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut location = at();
        let mut rest = s.trim();

        while !rest.is_empty() {
            let caps = SEGMENT_PATTERN.captures(rest).ok_or_else(|| {
                AutomationError::InvalidLocation(format!("cannot parse {rest:?} in {s:?}"))
            })?;
            let whole = caps.get(0).map_or("", |m| m.as_str());
            let kind = ElementKind::from_name(&caps[1]).ok_or_else(|| {
                AutomationError::InvalidLocation(format!("unknown element kind {:?}", &caps[1]))
            })?;
            let id = match (caps.get(2), caps.get(3)) {
                (Some(index), _) => Identifier::Index(index.as_str().parse().map_err(|e| {
                    AutomationError::InvalidLocation(format!("bad index {:?}: {e}", index.as_str()))
                })?),
                (None, name) => Identifier::Name(unquote(name.map_or("", |m| m.as_str()))),
            };
            location = location.push(kind, id);
            rest = &rest[whole.len()..];

            if rest.is_empty() && whole.ends_with(" of ") {
                return Err(AutomationError::InvalidLocation(format!(
                    "{s:?} ends with a dangling `of`"
                )));
            }
        }

        location.validate()?;
        Ok(location)
    }
}

/// Quote a string as an AppleScript literal.
pub(crate) fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

fn unquote(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}
