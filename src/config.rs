//! Filter configuration
//!
//! A [`FilterSpec`] holds the optional parameters of every filter stage. Parameters are
//! kept as loosely typed JSON values: they come from spec files and command lines as well
//! as from the typed `with_*` builders, and each stage checks the type of its own
//! parameter only when it is about to run.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{FilterError, Result};

/// Verbosity of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<String>")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Critical,
    /// Only the most severe messages are emitted
    None,
}

impl LogLevel {
    /// Parse a level name, case-insensitively. Unknown names behave like `none`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "debug" => Self::Debug,
            "info" => Self::Info,
            "warning" | "warn" => Self::Warning,
            "critical" => Self::Critical,
            _ => Self::None,
        }
    }

    /// Most verbose `log` level this run emits
    pub fn threshold(self) -> log::Level {
        match self {
            Self::Debug => log::Level::Debug,
            Self::Info => log::Level::Info,
            Self::Warning => log::Level::Warn,
            Self::Critical | Self::None => log::Level::Error,
        }
    }

    #[inline]
    pub fn allows(self, level: log::Level) -> bool {
        level <= self.threshold()
    }

    pub fn level_filter(self) -> log::LevelFilter {
        self.threshold().to_level_filter()
    }
}

impl From<Option<String>> for LogLevel {
    fn from(name: Option<String>) -> Self {
        name.map_or(Self::None, |n| Self::from_name(&n))
    }
}

impl FromStr for LogLevel {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
            Self::None => "none",
        };
        f.write_str(name)
    }
}

/// Parameters of a filtering run. `None` disables a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterSpec {
    /// Remove compound words (containing whitespace or a hyphen)
    pub no_comp: bool,
    /// Exact length in characters
    pub length: Option<Value>,
    /// Required prefix, capitalized before comparison
    pub start_with: Option<Value>,
    /// Required suffix, compared literally
    pub end_with: Option<Value>,
    /// `[[rank, letter], ...]` with 1-based ranks
    pub nth_letters: Option<Value>,
    /// Letters that must all appear
    pub contains: Option<Value>,
    /// Letters that must not appear
    pub not_contain: Option<Value>,
    /// Letters the word must be an arrangement of (any non-empty subset)
    pub anagram: Option<Value>,
    pub log_level: LogLevel,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            no_comp: true,
            length: None,
            start_with: None,
            end_with: None,
            nth_letters: None,
            contains: None,
            not_contain: None,
            anagram: None,
            log_level: LogLevel::default(),
        }
    }
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a spec from a JSON document
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Load a JSON spec file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read filter spec {:?}: {}", path, e))?;
        Self::from_json_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid filter spec {:?}: {}", path, e))
    }

    pub fn with_no_comp(mut self, no_comp: bool) -> Self {
        self.no_comp = no_comp;
        self
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = Some(Value::from(length));
        self
    }

    pub fn with_start_with(mut self, prefix: impl Into<String>) -> Self {
        self.start_with = Some(Value::String(prefix.into()));
        self
    }

    pub fn with_end_with(mut self, suffix: impl Into<String>) -> Self {
        self.end_with = Some(Value::String(suffix.into()));
        self
    }

    pub fn with_nth_letters<I>(mut self, letters: I) -> Self
    where
        I: IntoIterator<Item = (usize, char)>,
    {
        let entries = letters
            .into_iter()
            .map(|(rank, letter)| Value::Array(vec![Value::from(rank), Value::from(letter.to_string())]))
            .collect();
        self.nth_letters = Some(Value::Array(entries));
        self
    }

    pub fn with_contains<I, S>(mut self, letters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.contains = Some(string_list(letters));
        self
    }

    pub fn with_not_contain<I, S>(mut self, letters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.not_contain = Some(string_list(letters));
        self
    }

    pub fn with_anagram<I, S>(mut self, letters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.anagram = Some(string_list(letters));
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }
}

fn string_list<I, S>(items: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Value::Array(items.into_iter().map(|s| Value::String(s.into())).collect())
}

/// Python-style name of a value's type, used in error messages
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "None",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "int",
        Value::Number(_) => "float",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

pub(crate) fn expect_uint(param: &'static str, value: &Value) -> Result<usize> {
    value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| {
            let found = match value.as_i64() {
                Some(n) => format!("{}", n),
                None => value_kind(value).to_string(),
            };
            FilterError::invalid_param(param, "a non-negative int", found)
        })
}

pub(crate) fn expect_str<'a>(param: &'static str, value: &'a Value) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| FilterError::invalid_param(param, "of type str", value_kind(value)))
}

pub(crate) fn expect_str_list<'a>(param: &'static str, value: &'a Value) -> Result<Vec<&'a str>> {
    let items = value
        .as_array()
        .ok_or_else(|| FilterError::invalid_param(param, "of type list", value_kind(value)))?;

    items
        .iter()
        .map(|item| {
            item.as_str().ok_or_else(|| {
                FilterError::invalid_param(
                    param,
                    "a list of str",
                    format!("an element of type {}", value_kind(item)),
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let spec = FilterSpec::default();
        assert!(spec.no_comp);
        assert_eq!(spec.log_level, LogLevel::Info);
        assert!(spec.length.is_none());
    }

    #[test]
    fn test_from_json() {
        let spec = FilterSpec::from_json_str(
            r#"{
                "length": 7,
                "start_with": "g",
                "nth_letters": [[4, "t"]],
                "contains": ["a", "u"],
                "log_level": "DEBUG"
            }"#,
        )
        .unwrap();

        assert!(spec.no_comp);
        assert_eq!(spec.length, Some(json!(7)));
        assert_eq!(spec.nth_letters, Some(json!([[4, "t"]])));
        assert_eq!(spec.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_from_json_rejects_unknown_fields() {
        assert!(FilterSpec::from_json_str(r#"{"lenght": 7}"#).is_err());
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_name("Warning"), LogLevel::Warning);
        assert_eq!(LogLevel::from_name("CRITICAL"), LogLevel::Critical);
        assert_eq!(LogLevel::from_name("verbose"), LogLevel::None);

        let spec = FilterSpec::from_json_str(r#"{"log_level": null}"#).unwrap();
        assert_eq!(spec.log_level, LogLevel::None);
    }

    #[test]
    fn test_log_level_threshold() {
        assert!(LogLevel::Debug.allows(log::Level::Debug));
        assert!(LogLevel::Info.allows(log::Level::Info));
        assert!(!LogLevel::Info.allows(log::Level::Debug));
        assert!(!LogLevel::None.allows(log::Level::Warn));
        assert!(LogLevel::None.allows(log::Level::Error));
    }

    #[test]
    fn test_builders() {
        let spec = FilterSpec::new()
            .with_length(3)
            .with_nth_letters([(2, 'a')])
            .with_anagram(["c", "a", "t"]);

        assert_eq!(spec.length, Some(json!(3)));
        assert_eq!(spec.nth_letters, Some(json!([[2, "a"]])));
        assert_eq!(spec.anagram, Some(json!(["c", "a", "t"])));
    }

    #[test]
    fn test_expect_helpers() {
        assert_eq!(expect_uint("length", &json!(7)).unwrap(), 7);
        assert!(expect_uint("length", &json!(-1)).is_err());
        assert!(expect_uint("length", &json!("7")).is_err());
        assert!(expect_uint("length", &json!(7.5)).is_err());

        assert_eq!(expect_str("start_with", &json!("g")).unwrap(), "g");
        assert!(expect_str("start_with", &json!(1)).is_err());

        assert_eq!(expect_str_list("contains", &json!(["a", "u"])).unwrap(), vec!["a", "u"]);
        assert!(expect_str_list("contains", &json!("au")).is_err());
        assert!(expect_str_list("contains", &json!(["a", 1])).is_err());
    }
}
