use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use common::Result;

/// String-keyed, string-valued strategy configuration.
///
/// Values are parsed on access; a value that does not parse falls back to the
/// caller's default and logs a warning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyParams(HashMap<String, String>);

impl StrategyParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object. Scalar values of any JSON type are accepted and
    /// stored as text; `null` entries are skipped.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: HashMap<String, serde_json::Value> = serde_json::from_str(text)?;
        Ok(raw
            .into_iter()
            .filter_map(|(key, value)| {
                let text = match value {
                    serde_json::Value::Null => return None,
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                Some((key, text))
            })
            .collect())
    }

    /// Convert a TOML parameter table. Strings are taken verbatim, other
    /// scalars use their TOML rendering.
    pub fn from_toml(table: &HashMap<String, toml::Value>) -> Self {
        table
            .iter()
            .map(|(key, value)| {
                let text = match value {
                    toml::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), text)
            })
            .collect()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.insert(key.into(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Typed lookup. Missing keys yield `default` silently; present values
    /// that fail to parse yield `default` with a warning.
    pub fn get_or<T>(&self, key: &str, default: T) -> T
    where
        T: FromStr + Display,
    {
        let Some(raw) = self.0.get(key) else {
            return default;
        };
        match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(key, value = %raw, default = %default, "Unparseable strategy parameter, using default");
                default
            }
        }
    }

    /// Boolean flag lookup accepting `true`/`false` in any case.
    pub fn flag(&self, key: &str, default: bool) -> bool {
        match self.0.get(key) {
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" => true,
                "false" => false,
                _ => {
                    warn!(key, value = %raw, default, "Unparseable strategy flag, using default");
                    default
                }
            },
            None => default,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for StrategyParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<HashMap<String, String>> for StrategyParams {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_lookup_with_defaults() {
        let params = StrategyParams::new()
            .with("period", 20)
            .with("threshold", "1.5")
            .with("broken", "abc");
        assert_eq!(params.get_or("period", 14usize), 20);
        assert_eq!(params.get_or("threshold", 0.0f64), 1.5);
        assert_eq!(params.get_or("missing", 7usize), 7);
        assert_eq!(params.get_or("broken", 3usize), 3);
    }

    #[test]
    fn flags_are_case_insensitive() {
        let params = StrategyParams::new().with("a", "TRUE").with("b", "False").with("c", "yes");
        assert!(params.flag("a", false));
        assert!(!params.flag("b", true));
        assert!(params.flag("c", true));
        assert!(!params.flag("missing", false));
    }

    #[test]
    fn parses_json_objects() {
        let params =
            StrategyParams::from_json(r#"{"sma1": 100, "tp": 1.5, "name": "x", "skip": null}"#)
                .unwrap();
        assert_eq!(params.get_or("sma1", 0usize), 100);
        assert_eq!(params.get_or("tp", 0.0f64), 1.5);
        assert_eq!(params.get("name"), Some("x"));
        assert_eq!(params.get("skip"), None);
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn rejects_non_object_json() {
        assert!(StrategyParams::from_json("[1, 2]").is_err());
    }

    #[test]
    fn converts_toml_tables() {
        let table: HashMap<String, toml::Value> = toml::from_str(
            r#"
            period = 14
            ratio = 1.8
            use_sma50 = true
            label = "fast"
            "#,
        )
        .unwrap();
        let params = StrategyParams::from_toml(&table);
        assert_eq!(params.get_or("period", 0usize), 14);
        assert_eq!(params.get_or("ratio", 0.0f64), 1.8);
        assert!(params.flag("use_sma50", false));
        assert_eq!(params.get("label"), Some("fast"));
    }
}
