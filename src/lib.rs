//! # greenwave
//!
//! Appliance fault detection from household power-consumption data.
//!
//! Per-minute readings are averaged into a daily signal per appliance, the
//! daily signal is scored online by ChangeFinder (two cascaded discounted
//! autoregressive models), and the resulting change scores are thresholded
//! with a wide IQR band. When a score leaves the band, the ratio of the
//! latest daily value to the historical mean decides between
//! overconsumption, malfunction and normal.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use greenwave::prelude::*;
//!
//! let mut values = vec![5.0; 29];
//! values.push(20.0);
//! let start = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap();
//! let signal = DailySignal::from_values("Furnace", start, values).unwrap();
//!
//! let verdict = analyze_signal(&signal, &AnalysisConfig::default()).unwrap();
//! assert_eq!(verdict.status, FaultStatus::Overconsumption);
//! ```

pub mod changepoint;
pub mod config;
pub mod core;
pub mod detection;
pub mod error;
pub mod pipeline;
pub mod utils;

pub use error::{GreenwaveError, Result};

pub mod prelude {
    pub use crate::changepoint::{ChangeFinder, ChangeFinderConfig};
    pub use crate::config::AnalysisConfig;
    pub use crate::core::{DailySignal, PowerReadings};
    pub use crate::detection::{
        classify, ClassifierConfig, FaultStatus, FaultVerdict, ThresholdBand,
    };
    pub use crate::error::{GreenwaveError, Result};
    pub use crate::pipeline::{analyze_household, analyze_readings, analyze_signal, HouseholdReport};
}
