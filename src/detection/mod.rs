//! Robust threshold classification of change scores.
//!
//! This module provides:
//! - IQR threshold bands over a change-score series
//! - Fault classification (normal, overconsumption, malfunction)

mod classifier;
mod threshold;

pub use classifier::{
    classify, ClassifierConfig, FaultStatus, FaultVerdict, DEFAULT_IQR_MULTIPLIER,
    DEFAULT_MALFUNCTION_RATIO, DEFAULT_OVERCONSUMPTION_RATIO,
};
pub use threshold::{ThresholdBand, MIN_BAND_POINTS};
