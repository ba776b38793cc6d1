//! Utility functions shared by the scoring and classification stages.

pub mod stats;

pub use stats::{mean, percentile, percentile_sorted, quartiles};
