use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Settings for a scan sweep, loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Upper bound on instruments evaluated at the same time.
    pub max_concurrency: usize,
    /// Minimum score applied when a request does not carry its own.
    pub default_min_score: Option<f64>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            max_concurrency: Self::DEFAULT_MAX_CONCURRENCY,
            default_min_score: None,
        }
    }
}

impl ScanSettings {
    pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

    /// Load settings from the environment. Loads `.env` if present.
    ///
    /// `SCAN_MAX_CONCURRENCY` defaults to 8, `SCAN_MIN_SCORE` is optional.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // ignore error if .env not present
        let settings = Self::from_lookup(optional_env)?;
        debug!(
            max_concurrency = settings.max_concurrency,
            min_score = ?settings.default_min_score,
            "Loaded scan settings"
        );
        Ok(settings)
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_concurrency = match lookup("SCAN_MAX_CONCURRENCY") {
            Some(raw) => {
                let value: usize = raw.trim().parse().map_err(|_| {
                    Error::Config(format!(
                        "SCAN_MAX_CONCURRENCY must be a positive integer, got: '{raw}'"
                    ))
                })?;
                if value == 0 {
                    return Err(Error::Config(
                        "SCAN_MAX_CONCURRENCY must be at least 1".into(),
                    ));
                }
                value
            }
            None => Self::DEFAULT_MAX_CONCURRENCY,
        };

        let default_min_score = match lookup("SCAN_MIN_SCORE") {
            Some(raw) => {
                let value: f64 = raw.trim().parse().map_err(|_| {
                    Error::Config(format!("SCAN_MIN_SCORE must be a number, got: '{raw}'"))
                })?;
                if !(0.0..=100.0).contains(&value) {
                    return Err(Error::Config(format!(
                        "SCAN_MIN_SCORE must be within 0..=100, got: {value}"
                    )));
                }
                Some(value)
            }
            None => None,
        };

        Ok(Self {
            max_concurrency,
            default_min_score,
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let settings = ScanSettings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings, ScanSettings::default());
    }

    #[test]
    fn reads_both_keys() {
        let settings = ScanSettings::from_lookup(lookup_from(&[
            ("SCAN_MAX_CONCURRENCY", "3"),
            ("SCAN_MIN_SCORE", "65.5"),
        ]))
        .unwrap();
        assert_eq!(settings.max_concurrency, 3);
        assert_eq!(settings.default_min_score, Some(65.5));
    }

    #[test]
    fn rejects_zero_concurrency() {
        let err = ScanSettings::from_lookup(lookup_from(&[("SCAN_MAX_CONCURRENCY", "0")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_out_of_range_min_score() {
        let err =
            ScanSettings::from_lookup(lookup_from(&[("SCAN_MIN_SCORE", "140")])).unwrap_err();
        assert!(err.to_string().contains("SCAN_MIN_SCORE"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(ScanSettings::from_lookup(lookup_from(&[("SCAN_MAX_CONCURRENCY", "many")])).is_err());
    }
}
