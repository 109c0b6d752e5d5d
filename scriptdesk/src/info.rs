//! Parsing of `get info for` replies

use crate::errors::AutomationError;
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// Values are a quoted date, a quoted string, a bare date or anything up to
// the next comma. A bare date keeps its commas; it only stops at a comma that
// starts the next `key:`.
static FIELD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"([A-Za-z][A-Za-z ]*):\s*("#,
        r#"date\s+"(?:[^"\\]|\\.)*""#,
        r#"|"(?:[^"\\]|\\.)*""#,
        r#"|date\s+[^",{}]*(?:,\s*(?:[^A-Za-z\s,{}]|[A-Za-z][A-Za-z ]*[^A-Za-z :,{}])[^,{}]*)*"#,
        r#"|[^,{}]*)"#,
    ))
    .expect("field pattern is a valid regex")
});

const DATE_FORMATS: [&str; 2] = ["%A, %B %d, %Y %p %I:%M:%S", "%A, %B %d, %Y at %I:%M:%S %p"];

/// Information about an application bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationInfo {
    pub name: String,
    /// The date text as the scripting host printed it
    pub creation_date: Option<String>,
    /// Every `key:value` pair in the reply, unquoted
    pub fields: BTreeMap<String, String>,
}

impl ApplicationInfo {
    /// Parse the record text, e.g.
    /// `name:Numbers.app, creation date:date "Sunday, December 21, 2008 PM 06:14:11"}`.
    /// Stray braces and quotes around values are ignored.
    pub fn parse(text: &str) -> Result<Self, AutomationError> {
        let fields: BTreeMap<String, String> = FIELD_PATTERN
            .captures_iter(text)
            .map(|caps| (caps[1].trim().to_string(), clean_value(&caps[2])))
            .collect();

        let name = fields
            .get("name")
            .filter(|name| !name.is_empty())
            .cloned()
            .ok_or_else(|| AutomationError::Parse(format!("no name in info record {text:?}")))?;
        let creation_date = fields.get("creation date").cloned();

        Ok(Self {
            name,
            creation_date,
            fields,
        })
    }

    /// The creation date, when it is in one of the US English formats.
    pub fn creation_timestamp(&self) -> Option<NaiveDateTime> {
        let raw = self.creation_date.as_deref()?;
        DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    }
}

fn clean_value(raw: &str) -> String {
    let value = raw.trim();
    let value = match value.strip_prefix("date") {
        Some(rest) if rest.starts_with(char::is_whitespace) => rest.trim_start(),
        _ => value,
    };
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    value.replace("\\\"", "\"").replace("\\\\", "\\")
}
