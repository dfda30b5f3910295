// Analysis parameters. Loaded from an optional TOML file, otherwise defaults.
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::error::{AnalysisError, Result};
use crate::transform::{Remainder, UnknownCategory};

pub const CONFIG_FILE_PATH: &str = "fraud_analysis.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub data_path: PathBuf,
    pub target_column: String,
    pub amount_column: String,
    // Seconds since the first transaction. Optional in the input file.
    pub time_column: Option<String>,
    pub interaction_columns: Vec<String>,
    pub polynomial_degree: u32,
    pub test_fraction: f64,
    pub random_seed: u64,
    pub var_smoothing: f64,
    pub unknown_category: UnknownCategory,
    pub remainder: Remainder,
    pub chart_dir: PathBuf,
    pub log_level: String,
    pub preview_rows: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("credit_card_fraud.csv"),
            target_column: "Is Fraud".to_string(),
            amount_column: "Transaction Amount".to_string(),
            time_column: Some("Time".to_string()),
            interaction_columns: (1..=5).map(|i| format!("V{i}")).collect(),
            polynomial_degree: 2,
            test_fraction: 0.2,
            random_seed: 42,
            var_smoothing: 1e-9,
            unknown_category: UnknownCategory::Ignore,
            remainder: Remainder::Passthrough,
            chart_dir: PathBuf::from("charts"),
            log_level: "info".to_string(),
            preview_rows: 5,
        }
    }
}

impl AnalysisConfig {
    // Reads `path` if it exists, falling back to the defaults otherwise.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| AnalysisError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(AnalysisError::Config(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.var_smoothing < 0.0 {
            return Err(AnalysisError::Config(format!(
                "var_smoothing must be non-negative, got {}",
                self.var_smoothing
            )));
        }
        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(AnalysisError::Config(format!(
                "log_level must be one of trace, debug, info, warn, error, got '{}'",
                self.log_level
            )));
        }
        Ok(())
    }

    // Falls back to INFO for a level that slipped past `validate`.
    pub fn log_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}
