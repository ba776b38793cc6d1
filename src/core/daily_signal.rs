//! Daily mean power signal for a single appliance.

use crate::error::{GreenwaveError, Result};
use crate::utils::stats;
use chrono::{Days, NaiveDate};

/// Ordered `(date, mean_power)` pairs for one appliance.
///
/// Dates are strictly increasing. Missing days are simply absent, never
/// interpolated. Values are always finite: NaN and infinite values are
/// rejected at construction so they never reach the change-score estimator.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySignal {
    appliance: String,
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl DailySignal {
    /// Create a daily signal, validating alignment, ordering and finiteness.
    pub fn new(
        appliance: impl Into<String>,
        dates: Vec<NaiveDate>,
        values: Vec<f64>,
    ) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(GreenwaveError::DimensionMismatch {
                expected: dates.len(),
                got: values.len(),
            });
        }

        for i in 1..dates.len() {
            if dates[i] <= dates[i - 1] {
                return Err(GreenwaveError::TimestampError(
                    "dates must be strictly increasing".to_string(),
                ));
            }
        }

        if values.iter().any(|v| !v.is_finite()) {
            return Err(GreenwaveError::MissingValues);
        }

        Ok(Self {
            appliance: appliance.into(),
            dates,
            values,
        })
    }

    /// Create a signal on consecutive days starting at `start`.
    pub fn from_values(
        appliance: impl Into<String>,
        start: NaiveDate,
        values: Vec<f64>,
    ) -> Result<Self> {
        let dates = (0..values.len())
            .map(|i| {
                start.checked_add_days(Days::new(i as u64)).ok_or_else(|| {
                    GreenwaveError::TimestampError("date range overflows the calendar".to_string())
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(appliance, dates, values)
    }

    /// Appliance identifier.
    pub fn appliance(&self) -> &str {
        &self.appliance
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Historical mean of the daily values (NaN when empty).
    pub fn mean(&self) -> f64 {
        stats::mean(&self.values)
    }

    /// Most recent daily value.
    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }
}
