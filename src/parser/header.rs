//! `:key: value` header blocks, parsed against a declarative field schema.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::DebugMessage;

static FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:([^:]+):\s*(.*)$").expect("valid field pattern"));

/// Markers that let a feed declare its title with native Markdown/AsciiDoc syntax.
const TITLE_MARKERS: [&str; 2] = ["# ", "= "];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub label: String,
    /// Accumulate values into a `<label>s` list instead of overwriting.
    pub multi: bool,
    pub required: bool,
    /// A second key that satisfies `required`.
    pub alias: Option<String>,
}

impl FieldConfig {
    pub fn single(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            multi: false,
            required: false,
            alias: None,
        }
    }

    pub fn multi(label: impl Into<String>) -> Self {
        Self {
            multi: true,
            ..Self::single(label)
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Key under which a multi field's values are collected.
    pub fn list_key(&self) -> String {
        format!("{}s", self.label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    pub fields: Vec<FieldConfig>,
}

impl ParserConfig {
    pub fn new(fields: Vec<FieldConfig>) -> Self {
        Self { fields }
    }

    /// Schema for the document header.
    pub fn feed_default() -> Self {
        Self::new(vec![
            FieldConfig::single("title").required(),
            FieldConfig::single("author").required().alias("nick"),
            FieldConfig::single("description"),
            FieldConfig::single("lang"),
            FieldConfig::single("avatar"),
            FieldConfig::multi("link"),
            FieldConfig::multi("follow"),
            FieldConfig::multi("page"),
        ])
    }

    /// Schema for a post's metadata block.
    pub fn post_default() -> Self {
        Self::new(vec![
            FieldConfig::single("id").required(),
            FieldConfig::single("date"),
            FieldConfig::single("lang"),
            FieldConfig::single("tags"),
            FieldConfig::single("mood"),
            FieldConfig::single("content_warning"),
        ])
    }

    fn field(&self, key: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|f| f.label == key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    Multi(Vec<String>),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Single(s) => Some(s),
            FieldValue::Multi(_) => None,
        }
    }

    pub fn into_list(self) -> Vec<String> {
        match self {
            FieldValue::Single(s) => vec![s],
            FieldValue::Multi(v) => v,
        }
    }
}

pub type HeaderContent = BTreeMap<String, FieldValue>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderResult {
    pub content: HeaderContent,
    pub warnings: Vec<DebugMessage>,
    pub errors: Vec<DebugMessage>,
}

/// Parses a header block. Lines that are not `:key: value` are skipped.
///
/// Diagnostics carry the 0-based index of the offending line within `lines`.
/// The result is always returned; `errors` tells the caller whether it is usable.
pub fn parse_header<S: AsRef<str>>(lines: &[S], config: &ParserConfig) -> HeaderResult {
    let mut result = HeaderResult::default();

    for field in config.fields.iter().filter(|f| f.multi) {
        result
            .content
            .insert(field.list_key(), FieldValue::Multi(Vec::new()));
    }

    let mut start = 0;
    if let Some(first) = lines.first() {
        let first = first.as_ref();
        if let Some(title) = TITLE_MARKERS.iter().find_map(|m| first.strip_prefix(m)) {
            result
                .content
                .insert("title".to_string(), FieldValue::Single(title.trim().to_string()));
            start = 1;
        }
    }

    for (idx, line) in lines.iter().enumerate().skip(start) {
        let Some(caps) = FIELD_RE.captures(line.as_ref()) else {
            continue;
        };
        let key = caps[1].to_string();
        let value = caps[2].trim_end().to_string();

        match config.field(&key) {
            Some(field) if field.multi => {
                match result
                    .content
                    .entry(field.list_key())
                    .or_insert_with(|| FieldValue::Multi(Vec::new()))
                {
                    FieldValue::Multi(values) => values.push(value),
                    single => *single = FieldValue::Multi(vec![value]),
                }
            }
            Some(_) => {
                let previous = result.content.insert(key.clone(), FieldValue::Single(value));
                if previous.is_some() {
                    result.warnings.push(DebugMessage::warning(
                        format!(
                            "Field \"{}\" is defined more than once, using the last value",
                            key
                        ),
                        idx as i64,
                    ));
                }
            }
            None => {
                result.content.insert(key, FieldValue::Single(value));
            }
        }
    }

    for field in config.fields.iter().filter(|f| f.required) {
        if result.content.contains_key(&field.label) {
            continue;
        }
        let aliased = field
            .alias
            .as_ref()
            .and_then(|alias| result.content.remove(alias));
        match aliased {
            Some(value) => {
                result.content.insert(field.label.clone(), value);
            }
            None => result.errors.push(DebugMessage::error(
                format!("Required field \"{}\" not defined!", field.label),
                -1,
            )),
        }
    }

    result
}
