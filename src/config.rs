//! Analysis configuration.
//!
//! Every tunable of the pipeline lives here with the documented defaults, so
//! a missing file or a partial TOML table keeps the stock behaviour:
//!
//! ```toml
//! [estimator]
//! r = 0.01
//! order = 1
//! smooth = 10
//!
//! [classifier]
//! iqr_multiplier = 3.0
//! overconsumption_ratio = 1.5
//! malfunction_ratio = 0.5
//! ```

use crate::changepoint::ChangeFinderConfig;
use crate::detection::ClassifierConfig;
use crate::error::{GreenwaveError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Configuration shared by every appliance in a run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Change-score estimator parameters.
    pub estimator: ChangeFinderConfig,
    /// Threshold classifier parameters.
    pub classifier: ClassifierConfig,
}

impl AnalysisConfig {
    /// Set the estimator configuration.
    pub fn estimator(mut self, estimator: ChangeFinderConfig) -> Self {
        self.estimator = estimator;
        self
    }

    /// Set the classifier configuration.
    pub fn classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.estimator.validate()?;
        self.classifier.validate()
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| GreenwaveError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            GreenwaveError::Config(format!("{}: {e}", path.display()))
        })?;
        let config = Self::from_toml_str(&contents)?;
        info!(
            path = %path.display(),
            r = config.estimator.r,
            order = config.estimator.order,
            smooth = config.estimator.smooth,
            "loaded analysis config"
        );
        Ok(config)
    }

    /// Serialize to pretty TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| GreenwaveError::Config(e.to_string()))
    }
}
