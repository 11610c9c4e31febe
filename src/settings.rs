//! Configuration for the robust estimation engine.
//!
//! A single [`RansacOptions`] value is read (never written) by every estimation
//! call, so one instance can be shared freely between threads.

use crate::error::EstimationError;

/// Seed used by [`RansacOptions::default`]. Repeated calls with identical inputs
/// draw the same sequence of minimal samples.
pub const DEFAULT_RANDOM_SEED: u64 = 0;

/// Options controlling sampling, scoring and termination of [`LoRansac`].
///
/// [`LoRansac`]: crate::core::LoRansac
#[derive(Debug, Clone, PartialEq)]
pub struct RansacOptions {
    /// Maximum error for a correspondence to count as inlier, in the units of the
    /// estimator's error (distance, pixels, ...).
    pub max_error: f64,
    /// Minimum fraction of inliers required for a successful estimate.
    pub min_inlier_ratio: f64,
    /// Probability of drawing at least one outlier-free minimal sample.
    pub confidence: f64,
    /// Hard upper bound on the number of sampling trials.
    pub max_num_trials: usize,
    /// Lower bound for the adaptive number of trials.
    pub min_num_trials: usize,
    /// Refine every improving hypothesis on its inliers.
    pub local_optimization: bool,
    /// Maximum refinement rounds per improving hypothesis.
    pub max_num_local_trials: usize,
    /// Seed for the per-call sampler; `None` seeds from OS entropy.
    pub random_seed: Option<u64>,
}

impl Default for RansacOptions {
    fn default() -> Self {
        Self {
            max_error: 4.0,
            min_inlier_ratio: 0.1,
            confidence: 0.99,
            max_num_trials: 10_000,
            min_num_trials: 0,
            local_optimization: true,
            max_num_local_trials: 10,
            random_seed: Some(DEFAULT_RANDOM_SEED),
        }
    }
}

impl RansacOptions {
    /// Squared inlier threshold, the value residuals are compared against.
    pub fn max_residual(&self) -> f64 {
        self.max_error * self.max_error
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), EstimationError> {
        if !(self.max_error > 0.0 && self.max_error.is_finite()) {
            return Err(EstimationError::InvalidOptions(format!(
                "max_error must be positive and finite, got {}",
                self.max_error
            )));
        }
        if !(self.min_inlier_ratio > 0.0 && self.min_inlier_ratio <= 1.0) {
            return Err(EstimationError::InvalidOptions(format!(
                "min_inlier_ratio must be in (0, 1], got {}",
                self.min_inlier_ratio
            )));
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(EstimationError::InvalidOptions(format!(
                "confidence must be in (0, 1), got {}",
                self.confidence
            )));
        }
        if self.max_num_trials == 0 {
            return Err(EstimationError::InvalidOptions(
                "max_num_trials must be positive".to_string(),
            ));
        }
        if self.min_num_trials > self.max_num_trials {
            return Err(EstimationError::InvalidOptions(format!(
                "min_num_trials ({}) exceeds max_num_trials ({})",
                self.min_num_trials, self.max_num_trials
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_valid() {
        let options = RansacOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.max_num_trials, 10_000);
        assert_eq!(options.min_num_trials, 0);
        assert!(options.local_optimization);
        assert_eq!(options.random_seed, Some(DEFAULT_RANDOM_SEED));
        assert!((options.max_residual() - 16.0).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let bad = [
            RansacOptions {
                max_error: 0.0,
                ..RansacOptions::default()
            },
            RansacOptions {
                max_error: f64::NAN,
                ..RansacOptions::default()
            },
            RansacOptions {
                min_inlier_ratio: 0.0,
                ..RansacOptions::default()
            },
            RansacOptions {
                min_inlier_ratio: 1.5,
                ..RansacOptions::default()
            },
            RansacOptions {
                confidence: 1.0,
                ..RansacOptions::default()
            },
            RansacOptions {
                max_num_trials: 0,
                ..RansacOptions::default()
            },
            RansacOptions {
                min_num_trials: 20,
                max_num_trials: 10,
                ..RansacOptions::default()
            },
        ];
        for options in bad {
            assert!(
                matches!(options.validate(), Err(EstimationError::InvalidOptions(_))),
                "{options:?} should be rejected"
            );
        }
    }

    #[test]
    fn full_inlier_ratio_is_allowed() {
        let options = RansacOptions {
            min_inlier_ratio: 1.0,
            ..RansacOptions::default()
        };
        assert!(options.validate().is_ok());
    }
}
