//! Runtime configuration, loadable from JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AdrtError, Result};

/// Top-level settings shared by the library and the CLI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdrtConfig {
    /// Run independent quadrant planes on the rayon pool.
    pub threading: bool,
    pub fmg: FmgOptions,
}

impl Default for AdrtConfig {
    fn default() -> Self {
        Self {
            threading: true,
            fmg: FmgOptions::default(),
        }
    }
}

/// Settings for [`StepEngine::iadrt_fmg`](crate::StepEngine::iadrt_fmg).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FmgOptions {
    /// Upper bound on FMG step evaluations.
    ///
    /// - `None` (default): iterate until the residual stops decreasing.
    /// - `Some(k)`: additionally stop after `k` steps; `k` must be positive.
    pub max_iters: Option<usize>,
}

impl AdrtConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(data: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fmg.max_iters == Some(0) {
            return Err(AdrtError::InvalidArgument {
                arg: "max_iters",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn empty_document_gives_defaults() {
        let config = AdrtConfig::from_json_str("{}").unwrap();
        assert_eq!(config, AdrtConfig::default());
        assert!(config.threading);
        assert_eq!(config.fmg.max_iters, None);
    }

    #[test]
    fn parses_all_fields() {
        let config =
            AdrtConfig::from_json_str(r#"{"threading": false, "fmg": {"max_iters": 12}}"#).unwrap();
        assert!(!config.threading);
        assert_eq!(config.fmg.max_iters, Some(12));
    }

    #[test]
    fn rejects_fractional_max_iters() {
        let err = AdrtConfig::from_json_str(r#"{"fmg": {"max_iters": 2.0}}"#).unwrap_err();
        assert!(matches!(err, AdrtError::Config(_)));
    }

    #[test]
    fn rejects_zero_max_iters() {
        let err = AdrtConfig::from_json_str(r#"{"fmg": {"max_iters": 0}}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(AdrtConfig::from_json_str(r#"{"threads": 4}"#).is_err());
    }

    #[test]
    fn round_trips_through_json() {
        let config = AdrtConfig {
            threading: false,
            fmg: FmgOptions { max_iters: Some(3) },
        };
        let text = serde_json::to_string(&config).unwrap();
        assert_eq!(AdrtConfig::from_json_str(&text).unwrap(), config);
    }
}
