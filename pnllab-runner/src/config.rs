//! TOML analysis configuration.
//!
//! ```toml
//! [analysis]
//! strategy = "sts"
//! slippage_pct = 2.0
//!
//! [source]
//! kind = "csv"
//! path = "data/ledgers"
//! ```
//!
//! Every table except `[analysis]` is optional, as is every key except
//! `strategy`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pnllab_core::domain::{strategy_key, DEFAULT_PER_SIGNAL_STRATEGIES};
use pnllab_core::{AnalysisMode, Analyzer, SlippageModel, TradeTypePolicy};

use crate::logging::LogConfig;
use crate::source::SourceConfig;

/// Errors from loading or validating a config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// The `[analysis]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSection {
    /// Strategy identifier or display name.
    pub strategy: String,

    /// Record shape. Inferred from `per_signal_strategies` when absent.
    #[serde(default)]
    pub mode: Option<AnalysisMode>,

    #[serde(default = "default_per_signal_strategies")]
    pub per_signal_strategies: Vec<String>,

    /// Adverse entry slippage in percent.
    #[serde(default = "default_slippage_pct")]
    pub slippage_pct: f64,

    #[serde(default)]
    pub trade_type_policy: TradeTypePolicy,
}

fn default_per_signal_strategies() -> Vec<String> {
    DEFAULT_PER_SIGNAL_STRATEGIES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_slippage_pct() -> f64 {
    2.0
}

/// The `[output]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Where artifact directories are created.
    pub dir: PathBuf,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("results"),
        }
    }
}

/// A full analysis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub analysis: AnalysisSection,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub logging: LogConfig,
}

impl AnalysisConfig {
    /// Defaults for everything but the strategy.
    pub fn new(strategy: impl Into<String>) -> Self {
        Self {
            analysis: AnalysisSection {
                strategy: strategy.into(),
                mode: None,
                per_signal_strategies: default_per_signal_strategies(),
                slippage_pct: default_slippage_pct(),
                trade_type_policy: TradeTypePolicy::default(),
            },
            source: SourceConfig::default(),
            output: OutputSection::default(),
            logging: LogConfig::default(),
        }
    }

    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if strategy_key(&self.analysis.strategy).is_empty() {
            return Err(ConfigError::Invalid("strategy must not be empty".into()));
        }
        let pct = self.analysis.slippage_pct;
        if !pct.is_finite() || !(0.0..100.0).contains(&pct) {
            return Err(ConfigError::Invalid(format!(
                "slippage_pct must be in [0, 100), got {pct}"
            )));
        }
        Ok(())
    }

    /// The same config pointed at another strategy. The mode is re-inferred
    /// unless it was set explicitly.
    pub fn for_strategy(&self, strategy: &str) -> Self {
        let mut config = self.clone();
        config.analysis.strategy = strategy.to_string();
        config
    }

    pub fn strategy(&self) -> &str {
        &self.analysis.strategy
    }

    /// Normalized strategy key, e.g. `"sts"`.
    pub fn strategy_key(&self) -> String {
        strategy_key(&self.analysis.strategy)
    }

    /// Explicit mode, or the one implied by the strategy.
    pub fn mode(&self) -> AnalysisMode {
        self.analysis.mode.unwrap_or_else(|| {
            AnalysisMode::for_strategy(
                &self.analysis.strategy,
                &self.analysis.per_signal_strategies,
            )
        })
    }

    pub fn slippage(&self) -> SlippageModel {
        SlippageModel::from_pct(self.analysis.slippage_pct)
    }

    pub fn analyzer(&self) -> Analyzer {
        Analyzer::new(self.slippage(), self.analysis.trade_type_policy)
    }
}
