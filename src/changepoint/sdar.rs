//! Sequentially Discounting AutoRegressive (SDAR) model.
//!
//! An AR model whose mean, autocovariances and residual variance are all
//! exponentially discounted with rate `r`, so older observations are
//! gradually forgotten. Each update returns the negative log-likelihood of
//! the new observation under the model fitted on everything before it.

use statrs::distribution::{Continuous, Normal};
use std::collections::VecDeque;
use tracing::warn;

/// Residual variance never drops below this, keeping scores finite on flat signals.
pub const VARIANCE_FLOOR: f64 = 1e-12;

/// Outcome of one SDAR update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SdarStep {
    /// Negative Gaussian log-density of the observation (higher = more surprising).
    pub score: f64,
    /// One-step-ahead prediction the observation was compared against.
    pub prediction: f64,
}

/// Discounted AR model of a fixed order.
#[derive(Debug, Clone)]
pub struct Sdar {
    r: f64,
    order: usize,
    /// Seeded from the first observation.
    mu: Option<f64>,
    sigma: f64,
    /// Multiply the starting variance by the first observation squared.
    relative: bool,
    /// Discounted autocovariances at lags `0..=order`.
    autocov: Vec<f64>,
}

impl Sdar {
    /// Create a model with discount rate `r`, AR `order` and starting residual variance.
    ///
    /// Parameters are validated by [`ChangeFinderConfig`](super::ChangeFinderConfig).
    pub fn new(r: f64, order: usize, initial_variance: f64) -> Self {
        Self {
            r,
            order,
            mu: None,
            sigma: initial_variance.max(VARIANCE_FLOOR),
            relative: false,
            autocov: vec![0.0; order + 1],
        }
    }

    /// Create a model whose starting variance is `factor * x0^2`, `x0` being
    /// the first observation it receives.
    ///
    /// The model then behaves the same on a signal and on any rescaled copy
    /// of it. A first observation of zero leaves `factor` as the variance.
    pub fn relative_to_first(r: f64, order: usize, factor: f64) -> Self {
        Self {
            relative: true,
            ..Self::new(r, order, factor)
        }
    }

    /// Current discounted mean, if any observation has been seen.
    pub fn mean(&self) -> Option<f64> {
        self.mu
    }

    /// Current discounted residual variance.
    pub fn variance(&self) -> f64 {
        self.sigma
    }

    /// Absorb `x` given the previous `order` inputs (oldest first) and score it.
    ///
    /// The score is NaN if the prediction itself is not finite, which only
    /// happens when intermediate products overflow.
    pub fn update(&mut self, x: f64, history: &VecDeque<f64>) -> SdarStep {
        debug_assert!(history.len() >= self.order);
        let r = self.r;
        let n = history.len();

        let mu = match self.mu {
            Some(mu) => (1.0 - r) * mu + r * x,
            None => {
                if self.relative && x * x > VARIANCE_FLOOR {
                    self.sigma = (self.sigma * x * x).max(VARIANCE_FLOOR);
                }
                x
            }
        };
        self.mu = Some(mu);

        for k in 1..=self.order {
            self.autocov[k] = (1.0 - r) * self.autocov[k] + r * (x - mu) * (history[n - k] - mu);
        }
        self.autocov[0] = (1.0 - r) * self.autocov[0] + r * (x - mu) * (x - mu);

        let coeffs = levinson_durbin(&self.autocov, self.order);
        let ar: f64 = (1..=self.order)
            .map(|k| coeffs[k] * (history[n - k] - mu))
            .sum();
        let prediction = mu - ar;

        let residual = x - prediction;
        self.sigma = ((1.0 - r) * self.sigma + r * residual * residual).max(VARIANCE_FLOOR);

        let score = match Normal::new(prediction, self.sigma.sqrt()) {
            Ok(normal) => -normal.ln_pdf(x),
            Err(e) => {
                warn!(
                    prediction,
                    variance = self.sigma,
                    error = %e,
                    "invalid predictive distribution"
                );
                f64::NAN
            }
        };

        SdarStep { score, prediction }
    }
}

/// Solve the Yule-Walker equations by Levinson-Durbin recursion.
///
/// Returns the prediction-error filter `a` of length `order + 1` with
/// `a[0] = 1`; the AR prediction is `-sum(a[k] * x[t - k])`. A degenerate
/// autocovariance (zero variance, or a vanishing prediction error) leaves
/// the remaining coefficients at zero.
///
/// Reflection coefficients are clamped to `[-1, 1]`: early discounted
/// estimates are not always a valid autocovariance sequence.
pub fn levinson_durbin(autocov: &[f64], order: usize) -> Vec<f64> {
    let mut a = vec![0.0; order + 1];
    a[0] = 1.0;
    if order == 0 || autocov.len() <= order || autocov[0] <= f64::MIN_POSITIVE {
        return a;
    }

    a[1] = (-autocov[1] / autocov[0]).clamp(-1.0, 1.0);
    let mut error = autocov[0] + autocov[1] * a[1];

    for k in 1..order {
        if error <= f64::MIN_POSITIVE {
            break;
        }
        let reflection = -(0..=k).map(|j| a[j] * autocov[k + 1 - j]).sum::<f64>() / error;
        let lambda = reflection.clamp(-1.0, 1.0);

        let prev = a.clone();
        for i in 0..=k + 1 {
            a[i] = prev[i] + lambda * prev[k + 1 - i];
        }
        error *= 1.0 - lambda * lambda;
    }

    a
}
