//! Analysis configuration, loadable from TOML.
//!
//! Every section and field is optional; absent values take the defaults
//! below.
//!
//! ```toml
//! [losses]
//! current_amps = 100.0
//!
//! [flow]
//! max_iterations = 10000
//! tolerance = 1e-9
//!
//! [centrality]
//! weight = "hops"      # or "length"
//! normalized = false
//!
//! [mst]
//! method = "kruskal"   # or "prim"
//!
//! [logging]
//! level = "info"
//! ```

use crate::graph::centrality::CentralityWeight;
use crate::graph::mst::MstMethod;
use gridopt_core::{Amperes, GridError, GridResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration for every analysis.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub losses: LossConfig,
    #[serde(default)]
    pub flow: FlowConfig,
    #[serde(default)]
    pub centrality: CentralityConfig,
    #[serde(default)]
    pub mst: MstConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Joule loss model parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LossConfig {
    /// Assumed constant current through every line (A)
    #[serde(default = "default_current_amps")]
    pub current_amps: f64,
}

impl Default for LossConfig {
    fn default() -> Self {
        Self {
            current_amps: default_current_amps(),
        }
    }
}

impl LossConfig {
    pub fn current(&self) -> Amperes {
        Amperes(self.current_amps)
    }
}

fn default_current_amps() -> f64 {
    100.0
}

/// Min-cost flow solver limits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowConfig {
    /// Maximum number of augmenting paths before giving up
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Residual amounts at or below this are treated as zero
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
        }
    }
}

fn default_max_iterations() -> usize {
    10_000
}

fn default_tolerance() -> f64 {
    1e-9
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CentralityConfig {
    #[serde(default)]
    pub weight: CentralityWeight,
    /// Divide betweenness by the number of node pairs that exclude the node
    #[serde(default)]
    pub normalized: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MstConfig {
    #[serde(default)]
    pub method: MstMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AnalysisConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(input: &str) -> GridResult<Self> {
        let config: AnalysisConfig =
            toml::from_str(input).map_err(|e| GridError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> GridResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> GridResult<String> {
        toml::to_string_pretty(self).map_err(|e| GridError::Config(e.to_string()))
    }

    pub fn validate(&self) -> GridResult<()> {
        if !(self.losses.current_amps.is_finite() && self.losses.current_amps >= 0.0) {
            return Err(GridError::Config(format!(
                "losses.current_amps must be finite and >= 0, got {}",
                self.losses.current_amps
            )));
        }
        if self.flow.max_iterations == 0 {
            return Err(GridError::Config(
                "flow.max_iterations must be at least 1".to_string(),
            ));
        }
        if !(self.flow.tolerance.is_finite() && self.flow.tolerance > 0.0) {
            return Err(GridError::Config(format!(
                "flow.tolerance must be finite and > 0, got {}",
                self.flow.tolerance
            )));
        }
        Ok(())
    }
}
