//! Online change-point scoring.
//!
//! # Algorithms
//!
//! - **SDAR**: sequentially discounting autoregressive model scoring each
//!   point by its negative log-likelihood
//! - **ChangeFinder**: two cascaded SDAR models with a moving average between
//!   them, emitting one change score per point
//!
//! # Example
//!
//! ```
//! use greenwave::changepoint::{ChangeFinder, ChangeFinderConfig};
//!
//! let mut finder = ChangeFinder::new(ChangeFinderConfig::default()).unwrap();
//! let mut scores = Vec::new();
//! for day in 0..30 {
//!     let kw = if day < 29 { 5.0 } else { 20.0 };
//!     scores.push(finder.update(kw));
//! }
//!
//! // The jump on the last day is the most surprising point
//! let last = scores[29];
//! assert!(scores[..29].iter().all(|&s| s < last));
//! ```

pub mod change_finder;
pub mod sdar;

pub use change_finder::{change_scores, ChangeFinder, ChangeFinderConfig};
pub use sdar::{levinson_durbin, Sdar, SdarStep, VARIANCE_FLOOR};
