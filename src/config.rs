use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::clean::CleaningRules;
use crate::data::model::{Schema, columns};
use crate::error::ConfigurationError;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "BANK_INSIGHTS_CONFIG";
/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "bank_insights.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Source loaded at startup.
    pub data_path: PathBuf,
    pub cleaning: CleaningRules,
    /// Columns offered as filters in the side panel.
    pub filter_columns: Vec<String>,
    /// Canonical order for month-grouped charts.
    pub month_order: Vec<String>,
    /// Length of "top customers" rankings.
    pub top_n: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("Banking Data Set - Marketing.csv"),
            cleaning: CleaningRules::default(),
            filter_columns: vec![
                columns::MONTH.to_string(),
                columns::OCCUPATION.to_string(),
                columns::TYPE_OF_LOAN.to_string(),
            ],
            month_order: [
                "January", "February", "March", "April", "May", "June", "July", "August",
            ]
            .map(String::from)
            .to_vec(),
            top_n: 10,
        }
    }
}

impl DashboardConfig {
    /// Resolve the config: `$BANK_INSIGHTS_CONFIG`, else `bank_insights.json`
    /// if present, else defaults.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::from_file(local);
        }
        log::info!("no config file found, using defaults");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_json(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a JSON document; absent keys take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.cleaning.validate()?;
        let schema = Schema::bank_marketing();
        for column in &self.filter_columns {
            if schema.index_of(column).is_none() {
                return Err(ConfigurationError::UnknownColumn(column.clone()));
            }
        }
        if self.month_order.is_empty() {
            return Err(ConfigurationError::InvalidSetting {
                name: "month_order".into(),
                reason: "must name at least one month".into(),
            });
        }
        if self.top_n == 0 {
            return Err(ConfigurationError::InvalidSetting {
                name: "top_n".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}
