//! Fault classification from a change-score series and its daily signal.

use super::threshold::{ThresholdBand, MIN_BAND_POINTS};
use crate::core::DailySignal;
use crate::error::{GreenwaveError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default IQR multiplier. Daily means are already smooth, so the band is
/// twice as wide as the conventional 1.5.
pub const DEFAULT_IQR_MULTIPLIER: f64 = 3.0;
/// Default last/average ratio above which an anomaly is overconsumption.
pub const DEFAULT_OVERCONSUMPTION_RATIO: f64 = 1.5;
/// Default last/average ratio below which an anomaly is a malfunction.
pub const DEFAULT_MALFUNCTION_RATIO: f64 = 0.5;

/// Final state of an appliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaultStatus {
    Normal,
    /// Latest consumption well above the historical mean after a change.
    Overconsumption,
    /// Latest consumption well below the historical mean after a change.
    Malfunction,
}

impl FaultStatus {
    pub fn is_fault(&self) -> bool {
        !matches!(self, FaultStatus::Normal)
    }

    /// Human-readable status line.
    pub fn message(&self) -> &'static str {
        match self {
            FaultStatus::Normal => "Functioning normally",
            FaultStatus::Overconsumption => "Overconsumption issue - possible fault",
            FaultStatus::Malfunction => "Possible malfunction - underperforming or disconnected",
        }
    }
}

impl fmt::Display for FaultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Configuration for the threshold classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Band half-width in IQRs beyond Q1/Q3.
    pub iqr_multiplier: f64,
    /// `last > ratio * avg` classifies an anomaly as overconsumption.
    pub overconsumption_ratio: f64,
    /// `last < ratio * avg` classifies an anomaly as malfunction.
    pub malfunction_ratio: f64,
    /// Fewest daily points an appliance needs to be classified at all.
    pub min_points: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            iqr_multiplier: DEFAULT_IQR_MULTIPLIER,
            overconsumption_ratio: DEFAULT_OVERCONSUMPTION_RATIO,
            malfunction_ratio: DEFAULT_MALFUNCTION_RATIO,
            min_points: MIN_BAND_POINTS,
        }
    }
}

impl ClassifierConfig {
    /// Set the IQR multiplier.
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = multiplier;
        self
    }

    /// Set the overconsumption and malfunction ratios.
    pub fn ratios(mut self, overconsumption: f64, malfunction: f64) -> Self {
        self.overconsumption_ratio = overconsumption;
        self.malfunction_ratio = malfunction;
        self
    }

    /// Set the minimum number of daily points.
    pub fn min_points(mut self, min_points: usize) -> Self {
        self.min_points = min_points;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.iqr_multiplier >= 0.0 && self.iqr_multiplier.is_finite()) {
            return Err(GreenwaveError::InvalidParameter(format!(
                "iqr_multiplier must be a non-negative number, got {}",
                self.iqr_multiplier
            )));
        }
        if !(self.malfunction_ratio >= 0.0
            && self.overconsumption_ratio.is_finite()
            && self.malfunction_ratio <= self.overconsumption_ratio)
        {
            return Err(GreenwaveError::InvalidParameter(format!(
                "ratios must satisfy 0 <= malfunction ({}) <= overconsumption ({})",
                self.malfunction_ratio, self.overconsumption_ratio
            )));
        }
        if self.min_points < MIN_BAND_POINTS {
            return Err(GreenwaveError::InvalidParameter(format!(
                "min_points must be at least {MIN_BAND_POINTS}, got {}",
                self.min_points
            )));
        }
        Ok(())
    }
}

/// Classification outcome for one appliance.
#[derive(Debug, Clone, PartialEq)]
pub struct FaultVerdict {
    pub appliance: String,
    pub status: FaultStatus,
    /// Daily signal the verdict was reached on.
    pub signal: DailySignal,
    /// Change score per daily point.
    pub scores: Vec<f64>,
    pub band: ThresholdBand,
    /// Indices of scores outside the band.
    pub out_of_band: Vec<usize>,
    /// Mean of the daily signal.
    pub avg_power: f64,
    /// Most recent daily value.
    pub last_power: f64,
    /// Out-of-band scores were found but the power ratio fell between the thresholds.
    pub anomalous_unclassified: bool,
}

impl FaultVerdict {
    /// At least one change score left the band.
    pub fn is_abnormal(&self) -> bool {
        !self.out_of_band.is_empty()
    }

    pub fn is_fault(&self) -> bool {
        self.status.is_fault()
    }

    /// `last_power / avg_power`, NaN when the average is zero.
    pub fn power_ratio(&self) -> f64 {
        if self.avg_power == 0.0 {
            f64::NAN
        } else {
            self.last_power / self.avg_power
        }
    }
}

/// Classify an appliance from its daily signal and change-score series.
///
/// The power ratio is only consulted when at least one score is out of band;
/// otherwise the verdict is [`FaultStatus::Normal`] however far the last
/// value strays from the mean.
///
/// # Errors
/// * [`GreenwaveError::DimensionMismatch`] if the two series differ in length
/// * [`GreenwaveError::InsufficientData`] below `config.min_points` points
/// * [`GreenwaveError::InvalidInput`] for non-finite scores
/// * [`GreenwaveError::InvalidParameter`] for an invalid configuration
pub fn classify(
    signal: &DailySignal,
    scores: &[f64],
    config: &ClassifierConfig,
) -> Result<FaultVerdict> {
    config.validate()?;

    if scores.len() != signal.len() {
        return Err(GreenwaveError::DimensionMismatch {
            expected: signal.len(),
            got: scores.len(),
        });
    }
    if signal.len() < config.min_points {
        return Err(GreenwaveError::InsufficientData {
            needed: config.min_points,
            got: signal.len(),
        });
    }

    let band = ThresholdBand::from_scores(scores, config.iqr_multiplier)?;
    let out_of_band = band.out_of_band(scores);

    let avg_power = signal.mean();
    let last_power = signal.last().ok_or(GreenwaveError::EmptyData)?;

    let status = if out_of_band.is_empty() {
        FaultStatus::Normal
    } else if last_power > avg_power * config.overconsumption_ratio {
        FaultStatus::Overconsumption
    } else if last_power < avg_power * config.malfunction_ratio {
        FaultStatus::Malfunction
    } else {
        FaultStatus::Normal
    };
    let anomalous_unclassified = !out_of_band.is_empty() && status == FaultStatus::Normal;

    Ok(FaultVerdict {
        appliance: signal.appliance().to_string(),
        status,
        signal: signal.clone(),
        scores: scores.to_vec(),
        band,
        out_of_band,
        avg_power,
        last_power,
        anomalous_unclassified,
    })
}
