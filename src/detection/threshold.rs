//! Robust IQR threshold band over a change-score series.

use crate::error::{GreenwaveError, Result};
use crate::utils::stats::quartiles;
use serde::{Deserialize, Serialize};

/// Fewest scores for which quartiles are meaningful.
pub const MIN_BAND_POINTS: usize = 4;

/// `(lower, upper)` band of unremarkable change scores.
///
/// `upper = Q3 + multiplier * IQR` and `lower = Q1 - multiplier * IQR`.
/// Immutable once computed; `lower <= upper` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBand {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ThresholdBand {
    /// Compute the band from a complete change-score series.
    pub fn from_scores(scores: &[f64], multiplier: f64) -> Result<Self> {
        if !(multiplier >= 0.0 && multiplier.is_finite()) {
            return Err(GreenwaveError::InvalidParameter(format!(
                "IQR multiplier must be a non-negative number, got {multiplier}"
            )));
        }
        if scores.len() < MIN_BAND_POINTS {
            return Err(GreenwaveError::InsufficientData {
                needed: MIN_BAND_POINTS,
                got: scores.len(),
            });
        }
        if scores.iter().any(|s| !s.is_finite()) {
            return Err(GreenwaveError::InvalidInput(
                "change scores must be finite".to_string(),
            ));
        }

        let (q1, q3) = quartiles(scores);
        let iqr = q3 - q1;

        Ok(Self {
            q1,
            q3,
            iqr,
            lower: q1 - multiplier * iqr,
            upper: q3 + multiplier * iqr,
        })
    }

    /// True if `score` lies within `[lower, upper]`.
    pub fn contains(&self, score: f64) -> bool {
        score >= self.lower && score <= self.upper
    }

    /// Indices of scores strictly above `upper` or strictly below `lower`.
    pub fn out_of_band(&self, scores: &[f64]) -> Vec<usize> {
        scores
            .iter()
            .enumerate()
            .filter(|(_, &s)| !self.contains(s))
            .map(|(i, _)| i)
            .collect()
    }

    /// Width of the band.
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}
