//! Optional TOML settings file.
//!
//! ```toml
//! [affordability]
//! front_end_ratio = "0.28"
//! back_end_ratio = "0.36"
//!
//! [[affordability.term_rates]]
//! term_years = 30
//! rate = "6.25"
//!
//! [logging]
//! level = "debug"
//! file = "afford.log"
//! ```
//!
//! Every table and key is optional; missing values take their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use afford_core::AffordabilityConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub affordability: AffordabilityConfig,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Bare level or full `EnvFilter` directive. `RUST_LOG` wins when set.
    #[serde(default = "default_level")]
    pub level: String,
    /// Appends log records to this file in addition to stderr.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: None,
        }
    }
}

impl Settings {
    /// Reads settings from `path`, or returns defaults when no path is given.
    ///
    /// The affordability section is validated before it is returned.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let settings = Self::from_toml(&data)
            .with_context(|| format!("invalid config: {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn from_toml(data: &str) -> Result<Self> {
        let settings: Self = toml::from_str(data).context("failed parsing TOML")?;
        settings.affordability.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let settings = Settings::from_toml("").unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.logging.level, "warn");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let settings = Settings::from_toml(
            r#"
            [affordability]
            front_end_ratio = "0.30"

            [logging]
            file = "afford.log"
            "#,
        )
        .unwrap();

        assert_eq!(settings.affordability.front_end_ratio, dec!(0.30));
        assert_eq!(settings.affordability.back_end_ratio, dec!(0.36));
        assert_eq!(settings.logging.level, "warn");
        assert_eq!(settings.logging.file, Some(PathBuf::from("afford.log")));
    }

    #[test]
    fn term_rates_replace_defaults() {
        let settings = Settings::from_toml(
            r#"
            [[affordability.term_rates]]
            term_years = 20
            rate = "6.1"
            "#,
        )
        .unwrap();

        assert_eq!(settings.affordability.term_rates.len(), 1);
        assert_eq!(settings.affordability.term_rates[0].term_years, 20);
        assert_eq!(settings.affordability.term_rates[0].rate, dec!(6.1));
    }

    #[test]
    fn invalid_ratio_is_rejected() {
        let err = Settings::from_toml(
            r#"
            [affordability]
            back_end_ratio = "1.5"
            "#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("back-end ratio"), "{err}");
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Settings::load(Some(Path::new("/no/such/afford.toml"))).unwrap_err();

        assert!(err.to_string().contains("/no/such/afford.toml"), "{err}");
    }

    #[test]
    fn no_path_is_defaults() {
        assert_eq!(Settings::load(None).unwrap(), Settings::default());
    }
}
