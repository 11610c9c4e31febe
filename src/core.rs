//! Core traits and the LO-RANSAC pipeline.
//!
//! - [`Estimator`]: plugin producing model hypotheses and residuals.
//! - [`Sampler`]: strategy drawing minimal samples.
//! - [`LoRansac`]: the sampling/scoring/refinement loop, generic over a minimal
//!   estimator and a (possibly different) local estimator used for refinement.

use log::{debug, trace};

use crate::error::EstimationError;
use crate::samplers::UniformRandomSampler;
use crate::scoring::Support;
use crate::settings::RansacOptions;

/// Estimator responsible for generating model hypotheses from samples.
///
/// `X` and `Y` are the two sides of a correspondence; the engine always passes
/// slices of equal length.
pub trait Estimator {
    type X: Clone;
    type Y: Clone;
    /// Model type produced by this estimator.
    type Model: Clone;

    /// Size of a minimal sample.
    fn sample_size(&self) -> usize;

    /// Upper bound on the number of models a minimal sample yields.
    fn max_num_models(&self) -> usize {
        1
    }

    /// Estimate candidate models. Degenerate input yields no models.
    fn estimate(&self, x: &[Self::X], y: &[Self::Y]) -> Vec<Self::Model>;

    /// Squared residual of every correspondence, in input order.
    fn residuals(
        &self,
        x: &[Self::X],
        y: &[Self::Y],
        model: &Self::Model,
        residuals: &mut Vec<f64>,
    );
}

/// Sampler responsible for drawing minimal samples.
pub trait Sampler {
    /// Fill `out_indices` with distinct indices below `num_data`.
    ///
    /// Returns `false` if a valid sample could not be drawn.
    fn sample(&mut self, num_data: usize, out_indices: &mut [usize]) -> bool;
}

/// Outcome of a robust estimation.
#[derive(Debug, Clone)]
pub struct Report<M> {
    /// Whether a model satisfying the options was found.
    pub success: bool,
    /// Number of sampling trials performed.
    pub num_trials: usize,
    /// Support of the returned model, default when unsuccessful.
    pub support: Support,
    /// `true` for inliers, aligned with the input; empty when unsuccessful.
    pub inlier_mask: Vec<bool>,
    /// Best model, present only when successful.
    pub model: Option<M>,
}

impl<M> Report<M> {
    fn failure(num_trials: usize) -> Self {
        Self {
            success: false,
            num_trials,
            support: Support::default(),
            inlier_mask: Vec::new(),
            model: None,
        }
    }
}

/// Number of trials needed to draw one outlier-free sample with the given
/// confidence, i.e. the smallest `T` with `1 - (1 - w^k)^T >= confidence`.
pub fn compute_num_trials(
    num_inliers: usize,
    num_samples: usize,
    confidence: f64,
    sample_size: usize,
) -> usize {
    if num_samples == 0 || num_inliers == 0 {
        return usize::MAX;
    }
    let inlier_ratio = (num_inliers as f64 / num_samples as f64).min(1.0);

    let nom = 1.0 - confidence;
    if nom <= 0.0 {
        return usize::MAX;
    }

    let denom = 1.0 - inlier_ratio.powi(sample_size as i32);
    if denom <= 0.0 {
        return 1;
    }
    if denom >= 1.0 {
        return usize::MAX;
    }

    // Saturating float-to-int cast: infinity maps to usize::MAX.
    (nom.ln() / denom.ln()).ceil().max(1.0) as usize
}

/// LO-RANSAC engine.
///
/// `E` hypothesizes from minimal samples, `L` refits on inlier sets. Each call to
/// [`estimate`](Self::estimate) owns its sampler, so an engine can be shared by
/// reference across threads.
#[derive(Debug, Clone)]
pub struct LoRansac<E, L = E> {
    options: RansacOptions,
    estimator: E,
    local_estimator: L,
}

impl<E> LoRansac<E, E>
where
    E: Estimator + Clone,
{
    /// Use `estimator` for hypotheses and refinement alike.
    pub fn with_estimator(options: RansacOptions, estimator: E) -> Self {
        Self::new(options, estimator.clone(), estimator)
    }
}

impl<E, L> LoRansac<E, L>
where
    E: Estimator,
    L: Estimator<X = E::X, Y = E::Y, Model = E::Model>,
{
    pub fn new(options: RansacOptions, estimator: E, local_estimator: L) -> Self {
        Self {
            options,
            estimator,
            local_estimator,
        }
    }

    pub fn options(&self) -> &RansacOptions {
        &self.options
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    pub fn local_estimator(&self) -> &L {
        &self.local_estimator
    }

    /// Robustly estimate a model, sampling with a generator seeded from
    /// `options.random_seed`.
    pub fn estimate(
        &self,
        x: &[E::X],
        y: &[E::Y],
    ) -> Result<Report<E::Model>, EstimationError> {
        let mut sampler = UniformRandomSampler::from_optional_seed(self.options.random_seed);
        self.estimate_with_sampler(x, y, &mut sampler)
    }

    /// Robustly estimate a model with a caller-provided sampler.
    pub fn estimate_with_sampler<S: Sampler>(
        &self,
        x: &[E::X],
        y: &[E::Y],
        sampler: &mut S,
    ) -> Result<Report<E::Model>, EstimationError> {
        if x.len() != y.len() {
            return Err(EstimationError::MismatchedLengths {
                x: x.len(),
                y: y.len(),
            });
        }
        let sample_size = self.estimator.sample_size();
        let num_samples = x.len();
        if num_samples < sample_size {
            return Err(EstimationError::InsufficientData {
                required: sample_size,
                actual: num_samples,
            });
        }
        self.options.validate()?;

        let max_residual = self.options.max_residual();
        let max_num_trials = self.options.max_num_trials;
        let mut dyn_max_num_trials = max_num_trials;

        let mut sample = vec![0usize; sample_size];
        let mut x_rand = Vec::with_capacity(sample_size);
        let mut y_rand = Vec::with_capacity(sample_size);
        let mut residuals = Vec::with_capacity(num_samples);

        let mut best: Option<(E::Model, Support)> = None;
        let mut num_trials = 0usize;

        while num_trials < dyn_max_num_trials && num_trials < max_num_trials {
            num_trials += 1;

            if !sampler.sample(num_samples, &mut sample) {
                continue;
            }

            x_rand.clear();
            y_rand.clear();
            for &idx in &sample {
                x_rand.push(x[idx].clone());
                y_rand.push(y[idx].clone());
            }

            let models = self.estimator.estimate(&x_rand, &y_rand);
            if models.is_empty() {
                continue;
            }

            let mut improved = false;
            for model in models {
                self.estimator.residuals(x, y, &model, &mut residuals);
                let support = Support::measure(&residuals, max_residual);

                let better = match &best {
                    None => true,
                    Some((_, best_support)) => support.is_better_than(best_support),
                };
                if !better {
                    continue;
                }

                let (model, support) = if self.options.local_optimization {
                    self.local_optimize(x, y, model, support, &residuals)
                } else {
                    (model, support)
                };
                trace!(
                    "trial {}: support improved to {} inliers (residual sum {:.6e})",
                    num_trials,
                    support.num_inliers,
                    support.residual_sum
                );
                best = Some((model, support));
                improved = true;
            }

            if improved {
                if let Some((_, support)) = &best {
                    dyn_max_num_trials = compute_num_trials(
                        support.num_inliers,
                        num_samples,
                        self.options.confidence,
                        sample_size,
                    )
                    .clamp(self.options.min_num_trials, max_num_trials);
                }
            }
        }

        let Some((model, _)) = best else {
            debug!("no model found after {} trials", num_trials);
            return Ok(Report::failure(num_trials));
        };

        self.estimator.residuals(x, y, &model, &mut residuals);
        let support = Support::measure(&residuals, max_residual);
        let inlier_ratio = support.inlier_ratio(num_samples);

        if support.num_inliers < sample_size || inlier_ratio < self.options.min_inlier_ratio {
            debug!(
                "rejecting best model after {} trials: {}/{} inliers below ratio {}",
                num_trials, support.num_inliers, num_samples, self.options.min_inlier_ratio
            );
            return Ok(Report::failure(num_trials));
        }

        debug!(
            "estimated model after {} trials with {}/{} inliers",
            num_trials, support.num_inliers, num_samples
        );

        Ok(Report {
            success: true,
            num_trials,
            support,
            inlier_mask: residuals.iter().map(|&r| r < max_residual).collect(),
            model: Some(model),
        })
    }

    /// Refit on inliers while that strictly improves the support.
    ///
    /// A refined model replaces the current one when it is at least as good;
    /// `residuals` holds the residuals of `model`.
    fn local_optimize(
        &self,
        x: &[E::X],
        y: &[E::Y],
        mut model: E::Model,
        mut support: Support,
        residuals: &[f64],
    ) -> (E::Model, Support) {
        let max_residual = self.options.max_residual();
        let min_inliers = self.local_estimator.sample_size();

        let mut current_residuals = residuals.to_vec();
        let mut local_residuals = Vec::with_capacity(x.len());
        let mut x_inlier = Vec::new();
        let mut y_inlier = Vec::new();

        for _ in 0..self.options.max_num_local_trials {
            x_inlier.clear();
            y_inlier.clear();
            for (i, &r) in current_residuals.iter().enumerate() {
                if r < max_residual {
                    x_inlier.push(x[i].clone());
                    y_inlier.push(y[i].clone());
                }
            }
            if x_inlier.len() < min_inliers {
                break;
            }

            let mut refined: Option<(E::Model, Support, Vec<f64>)> = None;
            for local_model in self.local_estimator.estimate(&x_inlier, &y_inlier) {
                self.local_estimator
                    .residuals(x, y, &local_model, &mut local_residuals);
                let local_support = Support::measure(&local_residuals, max_residual);
                let better = match &refined {
                    None => true,
                    Some((_, s, _)) => local_support.is_better_than(s),
                };
                if better {
                    refined = Some((local_model, local_support, local_residuals.clone()));
                }
            }

            match refined {
                Some((local_model, local_support, local_res))
                    if !support.is_better_than(&local_support) =>
                {
                    let strictly_better = local_support.is_better_than(&support);
                    model = local_model;
                    support = local_support;
                    current_residuals = local_res;
                    if !strictly_better {
                        break;
                    }
                }
                _ => break,
            }
        }

        (model, support)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Line `y = slope * x + intercept` fitted from scalar pairs.
    #[derive(Clone, Debug, PartialEq)]
    struct LineModel {
        slope: f64,
        intercept: f64,
    }

    #[derive(Clone)]
    struct LineEstimator;

    impl Estimator for LineEstimator {
        type X = f64;
        type Y = f64;
        type Model = LineModel;

        fn sample_size(&self) -> usize {
            2
        }

        fn estimate(&self, x: &[f64], y: &[f64]) -> Vec<LineModel> {
            let n = x.len() as f64;
            let mean_x = x.iter().sum::<f64>() / n;
            let mean_y = y.iter().sum::<f64>() / n;
            let sxx: f64 = x.iter().map(|v| (v - mean_x).powi(2)).sum();
            if sxx < 1e-12 {
                return Vec::new();
            }
            let sxy: f64 = x
                .iter()
                .zip(y)
                .map(|(a, b)| (a - mean_x) * (b - mean_y))
                .sum();
            let slope = sxy / sxx;
            vec![LineModel {
                slope,
                intercept: mean_y - slope * mean_x,
            }]
        }

        fn residuals(&self, x: &[f64], y: &[f64], model: &LineModel, out: &mut Vec<f64>) {
            out.clear();
            out.extend(
                x.iter()
                    .zip(y)
                    .map(|(a, b)| (model.slope * a + model.intercept - b).powi(2)),
            );
        }
    }

    /// Yields no model at all.
    #[derive(Clone)]
    struct DegenerateEstimator;

    impl Estimator for DegenerateEstimator {
        type X = f64;
        type Y = f64;
        type Model = LineModel;

        fn sample_size(&self) -> usize {
            2
        }

        fn estimate(&self, _x: &[f64], _y: &[f64]) -> Vec<LineModel> {
            Vec::new()
        }

        fn residuals(&self, x: &[f64], _y: &[f64], _model: &LineModel, out: &mut Vec<f64>) {
            out.clear();
            out.resize(x.len(), 0.0);
        }
    }

    /// Always returns the first indices, counting calls.
    struct FixedSampler {
        calls: usize,
    }

    impl Sampler for FixedSampler {
        fn sample(&mut self, _num_data: usize, out_indices: &mut [usize]) -> bool {
            self.calls += 1;
            for (i, v) in out_indices.iter_mut().enumerate() {
                *v = i;
            }
            true
        }
    }

    fn line_data(num_inliers: usize, num_outliers: usize) -> (Vec<f64>, Vec<f64>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..num_inliers {
            let xi = i as f64 * 0.5;
            let noise = if i % 2 == 0 { 0.01 } else { -0.01 };
            x.push(xi);
            y.push(2.0 * xi + 1.0 + noise);
        }
        for i in 0..num_outliers {
            let xi = i as f64 * 0.7 + 0.3;
            x.push(xi);
            y.push(if i % 2 == 0 { -20.0 - xi } else { 40.0 + 3.0 * xi });
        }
        (x, y)
    }

    fn options() -> RansacOptions {
        RansacOptions {
            max_error: 0.1,
            min_inlier_ratio: 0.5,
            max_num_trials: 500,
            ..RansacOptions::default()
        }
    }

    #[test]
    fn num_trials_matches_closed_form() {
        // w = 0.5, k = 2, p = 0.99: log(0.01) / log(0.75) = 16.008...
        assert_eq!(compute_num_trials(50, 100, 0.99, 2), 17);
        // w = 1: one trial suffices.
        assert_eq!(compute_num_trials(100, 100, 0.99, 3), 1);
        // w = 0: unbounded.
        assert_eq!(compute_num_trials(0, 100, 0.99, 3), usize::MAX);
    }

    #[test]
    fn num_trials_decreases_with_inlier_ratio() {
        let mut previous = usize::MAX;
        for num_inliers in [10, 20, 40, 60, 80, 95] {
            let trials = compute_num_trials(num_inliers, 100, 0.999, 7);
            assert!(trials <= previous);
            previous = trials;
        }
    }

    #[test]
    fn num_trials_reaches_confidence() {
        let (w, k, p) = (0.3f64, 4, 0.95);
        let t = compute_num_trials(30, 100, p, k);
        let reached = |t: usize| 1.0 - (1.0 - w.powi(k as i32)).powi(t as i32);
        assert!(reached(t) >= p);
        assert!(reached(t - 1) < p);
    }

    #[test]
    fn recovers_line_with_outliers() {
        let (x, y) = line_data(20, 8);
        let ransac = LoRansac::with_estimator(options(), LineEstimator);
        let report = ransac.estimate(&x, &y).unwrap();

        assert!(report.success);
        let model = report.model.as_ref().unwrap();
        assert!((model.slope - 2.0).abs() < 0.01);
        assert!((model.intercept - 1.0).abs() < 0.02);
        assert_eq!(report.support.num_inliers, 20);
        assert_eq!(report.inlier_mask.len(), x.len());
        assert!(report.inlier_mask[..20].iter().all(|&m| m));
        assert!(report.inlier_mask[20..].iter().all(|&m| !m));
    }

    #[test]
    fn adaptive_bound_stops_early() {
        let (x, y) = line_data(40, 2);
        let ransac = LoRansac::with_estimator(options(), LineEstimator);
        let report = ransac.estimate(&x, &y).unwrap();
        assert!(report.success);
        assert!(report.num_trials < options().max_num_trials);
    }

    #[test]
    fn min_num_trials_is_honored() {
        let (x, y) = line_data(40, 0);
        let opts = RansacOptions {
            min_num_trials: 50,
            ..options()
        };
        let ransac = LoRansac::with_estimator(opts, LineEstimator);
        let report = ransac.estimate(&x, &y).unwrap();
        assert!(report.success);
        assert!(report.num_trials >= 50);
    }

    #[test]
    fn fails_below_min_inlier_ratio() {
        let (x, y) = line_data(5, 20);
        let ransac = LoRansac::with_estimator(options(), LineEstimator);
        let report = ransac.estimate(&x, &y).unwrap();

        assert!(!report.success);
        assert!(report.model.is_none());
        assert!(report.inlier_mask.is_empty());
        assert_eq!(report.support, Support::default());
    }

    #[test]
    fn degenerate_samples_are_skipped_until_budget_ends() {
        let (x, y) = line_data(10, 0);
        let opts = RansacOptions {
            max_num_trials: 25,
            ..options()
        };
        let ransac = LoRansac::with_estimator(opts, DegenerateEstimator);
        let report = ransac.estimate(&x, &y).unwrap();
        assert!(!report.success);
        assert_eq!(report.num_trials, 25);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let ransac = LoRansac::with_estimator(options(), LineEstimator);
        let err = ransac.estimate(&[0.0, 1.0, 2.0], &[0.0, 1.0]).unwrap_err();
        assert_eq!(err, EstimationError::MismatchedLengths { x: 3, y: 2 });
    }

    #[test]
    fn too_few_points_are_rejected() {
        let ransac = LoRansac::with_estimator(options(), LineEstimator);
        let err = ransac.estimate(&[0.0], &[0.0]).unwrap_err();
        assert_eq!(
            err,
            EstimationError::InsufficientData {
                required: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn invalid_options_are_rejected() {
        let opts = RansacOptions {
            confidence: 1.5,
            ..options()
        };
        let ransac = LoRansac::with_estimator(opts, LineEstimator);
        let (x, y) = line_data(10, 0);
        assert!(matches!(
            ransac.estimate(&x, &y),
            Err(EstimationError::InvalidOptions(_))
        ));
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let (x, y) = line_data(15, 15);
        let opts = RansacOptions {
            min_inlier_ratio: 0.4,
            random_seed: Some(99),
            ..options()
        };
        let ransac = LoRansac::with_estimator(opts, LineEstimator);
        let a = ransac.estimate(&x, &y).unwrap();
        let b = ransac.estimate(&x, &y).unwrap();
        assert_eq!(a.num_trials, b.num_trials);
        assert_eq!(a.inlier_mask, b.inlier_mask);
        assert_eq!(a.model, b.model);
    }

    #[test]
    fn injected_sampler_is_used() {
        let (x, y) = line_data(10, 0);
        let opts = RansacOptions {
            max_num_trials: 5,
            min_num_trials: 5,
            ..options()
        };
        let ransac = LoRansac::with_estimator(opts, LineEstimator);
        let mut sampler = FixedSampler { calls: 0 };
        let report = ransac.estimate_with_sampler(&x, &y, &mut sampler).unwrap();
        assert!(report.success);
        assert_eq!(sampler.calls, 5);
    }

    #[test]
    fn local_optimization_refines_minimal_fit() {
        // The fixed sample spans the whole range, so every point is an inlier of
        // the two-point fit, but the least-squares refit has a lower residual sum.
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..30 {
            let xi = match i {
                0 => 0.0,
                1 => 5.8,
                _ => (i - 1) as f64 * 0.2,
            };
            let noise = 0.04 * ((i * 7 % 11) as f64 / 10.0 - 0.5);
            x.push(xi);
            y.push(3.0 - xi + noise);
        }
        let base = RansacOptions {
            max_error: 0.05,
            min_inlier_ratio: 0.5,
            max_num_trials: 5,
            min_num_trials: 5,
            ..RansacOptions::default()
        };

        let plain = LoRansac::with_estimator(
            RansacOptions {
                local_optimization: false,
                ..base.clone()
            },
            LineEstimator,
        );
        let refined = LoRansac::with_estimator(base, LineEstimator);

        let mut sampler = FixedSampler { calls: 0 };
        let plain_report = plain.estimate_with_sampler(&x, &y, &mut sampler).unwrap();
        let mut sampler = FixedSampler { calls: 0 };
        let refined_report = refined.estimate_with_sampler(&x, &y, &mut sampler).unwrap();

        assert!(plain_report.success);
        assert!(refined_report.success);
        assert_eq!(plain_report.support.num_inliers, 30);
        assert_eq!(refined_report.support.num_inliers, 30);
        assert!(refined_report.support.residual_sum < plain_report.support.residual_sum);
        let model = refined_report.model.unwrap();
        assert!((model.slope + 1.0).abs() < 0.01);
    }

    #[test]
    fn shared_engine_runs_concurrently() {
        let (x, y) = line_data(20, 10);
        let ransac = LoRansac::with_estimator(options(), LineEstimator);
        let expected = ransac.estimate(&x, &y).unwrap();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| ransac.estimate(&x, &y).unwrap()))
                .collect();
            for handle in handles {
                let report = handle.join().unwrap();
                assert_eq!(report.inlier_mask, expected.inlier_mask);
                assert_eq!(report.model, expected.model);
            }
        });
    }
}
