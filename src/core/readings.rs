//! Raw per-appliance power readings and their daily resampling.

use super::DailySignal;
use crate::error::{GreenwaveError, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::debug;

/// Sub-daily power samples (kW) for one appliance.
///
/// Timestamps are strictly increasing. Individual samples may be NaN or
/// infinite (meter dropouts); resampling ignores them.
#[derive(Debug, Clone)]
pub struct PowerReadings {
    appliance: String,
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
}

impl PowerReadings {
    /// Create readings, validating alignment and timestamp ordering.
    pub fn new(
        appliance: impl Into<String>,
        timestamps: Vec<DateTime<Utc>>,
        values: Vec<f64>,
    ) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(GreenwaveError::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }
        if timestamps.is_empty() {
            return Err(GreenwaveError::EmptyData);
        }

        for i in 1..timestamps.len() {
            if timestamps[i] <= timestamps[i - 1] {
                return Err(GreenwaveError::TimestampError(
                    "timestamps must be strictly increasing".to_string(),
                ));
            }
        }

        Ok(Self {
            appliance: appliance.into(),
            timestamps,
            values,
        })
    }

    /// Create readings sampled at a fixed step from `start`.
    ///
    /// Meter exports often carry an unusable clock column; the samples are then
    /// known to be one minute apart and are re-stamped from a start instant.
    pub fn at_fixed_frequency(
        appliance: impl Into<String>,
        start: DateTime<Utc>,
        step: Duration,
        values: Vec<f64>,
    ) -> Result<Self> {
        if step <= Duration::zero() {
            return Err(GreenwaveError::InvalidParameter(
                "sampling step must be positive".to_string(),
            ));
        }
        let timestamps = (0..values.len())
            .map(|i| {
                step_offset(step, i)
                    .and_then(|offset| start.checked_add_signed(offset))
                    .ok_or_else(|| {
                        GreenwaveError::TimestampError("timestamp range overflows".to_string())
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(appliance, timestamps, values)
    }

    pub fn appliance(&self) -> &str {
        &self.appliance
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
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

    /// Number of NaN or infinite samples.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_finite()).count()
    }

    /// Resample to one mean value per UTC calendar day.
    ///
    /// Non-finite samples are ignored. Days without a single finite sample are
    /// dropped, as are days with no samples at all; nothing is interpolated.
    pub fn resample_daily(&self) -> Result<DailySignal> {
        let mut dates: Vec<NaiveDate> = Vec::new();
        let mut means: Vec<f64> = Vec::new();
        let mut dropped_days = 0usize;

        let mut current: Option<NaiveDate> = None;
        let mut sum = 0.0;
        let mut count = 0usize;

        let mut flush = |day: NaiveDate, sum: f64, count: usize| {
            if count > 0 {
                dates.push(day);
                means.push(sum / count as f64);
            } else {
                dropped_days += 1;
            }
        };

        for (ts, &value) in self.timestamps.iter().zip(self.values.iter()) {
            let day = ts.date_naive();
            match current {
                Some(d) if d == day => {}
                Some(d) => {
                    flush(d, sum, count);
                    sum = 0.0;
                    count = 0;
                    current = Some(day);
                }
                None => current = Some(day),
            }
            if value.is_finite() {
                sum += value;
                count += 1;
            }
        }
        if let Some(d) = current {
            flush(d, sum, count);
        }

        if dates.is_empty() {
            return Err(GreenwaveError::EmptyData);
        }

        debug!(
            appliance = %self.appliance,
            samples = self.len(),
            missing = self.missing_count(),
            days = dates.len(),
            dropped_days,
            "resampled readings to daily means"
        );

        DailySignal::new(self.appliance.clone(), dates, means)
    }
}

/// Offset of the `index`-th sample, `None` past the representable range.
fn step_offset(step: Duration, index: usize) -> Option<Duration> {
    i32::try_from(index).ok().and_then(|i| step.checked_mul(i))
}
