//! ChangeFinder: online change scoring with two cascaded SDAR models.
//!
//! The first model learns the signal itself; its per-point surprise is
//! averaged over a window of `smooth` points and fed to a second model that
//! learns the *level of surprise*. The second model's surprise is the emitted
//! change score, so a lasting shift in behaviour scores higher than a single
//! noisy reading.

use super::sdar::Sdar;
use crate::core::DailySignal;
use crate::error::{GreenwaveError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

/// Configuration for the change-score estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeFinderConfig {
    /// Discount rate in (0, 1); larger values forget the past faster.
    pub r: f64,
    /// Autoregressive order of both models.
    pub order: usize,
    /// Length of the moving average applied to first-stage scores.
    pub smooth: usize,
    /// Starting residual variance. The first model scales it by the square
    /// of the first value it sees, so detection does not depend on the units
    /// or magnitude of the signal; the second model, which sees
    /// log-likelihood scores, uses it as is.
    pub initial_variance: f64,
}

impl Default for ChangeFinderConfig {
    fn default() -> Self {
        Self {
            r: 0.01,
            order: 1,
            smooth: 10,
            initial_variance: 0.01,
        }
    }
}

impl ChangeFinderConfig {
    /// Set the discount rate.
    pub fn r(mut self, r: f64) -> Self {
        self.r = r;
        self
    }

    /// Set the autoregressive order.
    pub fn order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    /// Set the smoothing window.
    pub fn smooth(mut self, smooth: usize) -> Self {
        self.smooth = smooth;
        self
    }

    /// Set the starting residual variance.
    pub fn initial_variance(mut self, variance: f64) -> Self {
        self.initial_variance = variance;
        self
    }

    /// Number of leading points that score `0.0` while the models fill up.
    pub fn warmup_len(&self) -> usize {
        2 * self.order + self.smooth - 1
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.r > 0.0 && self.r < 1.0) {
            return Err(GreenwaveError::InvalidParameter(format!(
                "r must lie in (0, 1), got {}",
                self.r
            )));
        }
        if self.order == 0 {
            return Err(GreenwaveError::InvalidParameter(
                "order must be at least 1".to_string(),
            ));
        }
        if self.smooth == 0 {
            return Err(GreenwaveError::InvalidParameter(
                "smooth must be at least 1".to_string(),
            ));
        }
        if !(self.initial_variance > 0.0 && self.initial_variance.is_finite()) {
            return Err(GreenwaveError::InvalidParameter(format!(
                "initial_variance must be positive, got {}",
                self.initial_variance
            )));
        }
        Ok(())
    }
}

/// Online change-score estimator for one appliance.
///
/// State is mutated on every [`update`](Self::update) and never reset, so an
/// instance must see exactly one appliance's points, once each, in time
/// order. [`score_signal`](Self::score_signal) enforces both rules: the
/// estimator binds to the first appliance it scores and remembers the last
/// date it has seen.
#[derive(Debug, Clone)]
pub struct ChangeFinder {
    config: ChangeFinderConfig,
    first: Sdar,
    second: Sdar,
    /// Last `order` raw inputs.
    inputs: VecDeque<f64>,
    /// Last `smooth` first-stage scores.
    first_scores: VecDeque<f64>,
    /// Last `order` smoothed scores.
    smoothed: VecDeque<f64>,
    appliance: Option<String>,
    /// Last date scored through `score_signal`.
    last_date: Option<NaiveDate>,
    observed: usize,
}

impl Default for ChangeFinder {
    fn default() -> Self {
        Self::build(ChangeFinderConfig::default())
    }
}

impl ChangeFinder {
    /// Create an unbound estimator.
    pub fn new(config: ChangeFinderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Create an estimator bound to `appliance` from the start.
    pub fn for_appliance(appliance: impl Into<String>, config: ChangeFinderConfig) -> Result<Self> {
        let mut finder = Self::new(config)?;
        finder.appliance = Some(appliance.into());
        Ok(finder)
    }

    fn build(config: ChangeFinderConfig) -> Self {
        Self {
            first: Sdar::relative_to_first(config.r, config.order, config.initial_variance),
            second: Sdar::new(config.r, config.order, config.initial_variance),
            inputs: VecDeque::with_capacity(config.order + 1),
            first_scores: VecDeque::with_capacity(config.smooth + 1),
            smoothed: VecDeque::with_capacity(config.order + 1),
            appliance: None,
            last_date: None,
            observed: 0,
            config,
        }
    }

    pub fn config(&self) -> &ChangeFinderConfig {
        &self.config
    }

    /// Appliance this estimator is bound to, if any.
    pub fn appliance(&self) -> Option<&str> {
        self.appliance.as_deref()
    }

    /// Last date scored through [`score_signal`](Self::score_signal).
    pub fn last_scored_date(&self) -> Option<NaiveDate> {
        self.last_date
    }

    /// Number of points consumed so far.
    pub fn observed(&self) -> usize {
        self.observed
    }

    /// Whether scores are now produced by the second model.
    pub fn is_warmed_up(&self) -> bool {
        self.observed > self.config.warmup_len()
    }

    /// Consume the next point and return its change score.
    ///
    /// Returns `0.0` during warm-up. The input must be finite; use
    /// [`try_update`](Self::try_update) when that is not guaranteed.
    pub fn update(&mut self, value: f64) -> f64 {
        self.observed += 1;

        if self.inputs.len() == self.config.order {
            let step = self.first.update(value, &self.inputs);
            push_bounded(&mut self.first_scores, step.score, self.config.smooth);
        }
        push_bounded(&mut self.inputs, value, self.config.order);

        if self.first_scores.len() < self.config.smooth {
            return 0.0;
        }
        let smoothed = self.first_scores.iter().sum::<f64>() / self.first_scores.len() as f64;

        let mut score = 0.0;
        if self.smoothed.len() == self.config.order {
            score = self.second.update(smoothed, &self.smoothed).score;
        }
        push_bounded(&mut self.smoothed, smoothed, self.config.order);

        score
    }

    /// Like [`update`](Self::update) but rejects NaN and infinite input without touching state.
    pub fn try_update(&mut self, value: f64) -> Result<f64> {
        if !value.is_finite() {
            return Err(GreenwaveError::InvalidInput(format!(
                "change scores need finite input, got {value}"
            )));
        }
        Ok(self.update(value))
    }

    /// Score every point of an appliance's daily signal, in order.
    ///
    /// Binds the estimator to the signal's appliance; a signal from any other
    /// appliance is refused with [`GreenwaveError::EstimatorReuse`]. A signal
    /// that does not start after the last scored date is refused with
    /// [`GreenwaveError::TimestampError`]. A refused signal leaves the state
    /// untouched.
    pub fn score_signal(&mut self, signal: &DailySignal) -> Result<Vec<f64>> {
        if let Some(bound) = &self.appliance {
            if bound != signal.appliance() {
                return Err(GreenwaveError::EstimatorReuse {
                    bound: bound.clone(),
                    attempted: signal.appliance().to_string(),
                });
            }
        }
        if let (Some(last), Some(&first)) = (self.last_date, signal.dates().first()) {
            if first <= last {
                return Err(GreenwaveError::TimestampError(format!(
                    "{} already scored up to {last}, signal starts at {first}",
                    signal.appliance()
                )));
            }
        }

        self.appliance.get_or_insert_with(|| signal.appliance().to_string());
        let scores: Vec<f64> = signal.values().iter().map(|&v| self.update(v)).collect();
        if let Some(&last) = signal.dates().last() {
            self.last_date = Some(last);
        }

        debug!(
            appliance = %signal.appliance(),
            points = scores.len(),
            observed = self.observed,
            "scored daily signal"
        );

        Ok(scores)
    }
}

/// Score a whole series with a freshly constructed estimator.
pub fn change_scores(values: &[f64], config: &ChangeFinderConfig) -> Result<Vec<f64>> {
    let mut finder = ChangeFinder::new(*config)?;
    values.iter().map(|&v| finder.try_update(v)).collect()
}

fn push_bounded(buffer: &mut VecDeque<f64>, value: f64, capacity: usize) {
    buffer.push_back(value);
    if buffer.len() > capacity {
        buffer.pop_front();
    }
}
