//! Support of a model hypothesis and the ordering used to pick the best one.

/// Consensus support of a hypothesis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Support {
    /// Number of residuals below the threshold.
    pub num_inliers: usize,
    /// Sum of the inlier residuals.
    pub residual_sum: f64,
}

impl Default for Support {
    fn default() -> Self {
        Self {
            num_inliers: 0,
            residual_sum: f64::MAX,
        }
    }
}

impl Support {
    /// Count residuals strictly below `max_residual` and sum them.
    pub fn measure(residuals: &[f64], max_residual: f64) -> Self {
        let mut support = Self {
            num_inliers: 0,
            residual_sum: 0.0,
        };
        for &r in residuals {
            if r < max_residual {
                support.num_inliers += 1;
                support.residual_sum += r;
            }
        }
        support
    }

    /// More inliers wins; equal counts are broken by the lower residual sum.
    pub fn is_better_than(&self, other: &Support) -> bool {
        self.num_inliers > other.num_inliers
            || (self.num_inliers == other.num_inliers && self.residual_sum < other.residual_sum)
    }

    /// Fraction of `num_samples` that are inliers.
    pub fn inlier_ratio(&self, num_samples: usize) -> f64 {
        if num_samples == 0 {
            return 0.0;
        }
        self.num_inliers as f64 / num_samples as f64
    }
}

#[cfg(test)]
mod tests {
    use super::Support;

    #[test]
    fn measure_counts_strictly_below_threshold() {
        let residuals = [0.1, 0.4, 0.6, 1.0, 0.3, 0.5];
        let support = Support::measure(&residuals, 0.5);

        assert_eq!(support.num_inliers, 3);
        assert!((support.residual_sum - 0.8).abs() < 1e-12);
    }

    #[test]
    fn non_finite_residuals_are_outliers() {
        let residuals = [f64::NAN, f64::INFINITY, 0.0];
        let support = Support::measure(&residuals, 1.0);
        assert_eq!(support.num_inliers, 1);
    }

    #[test]
    fn inlier_count_dominates_residual_sum() {
        let many = Support {
            num_inliers: 10,
            residual_sum: 5.0,
        };
        let few = Support {
            num_inliers: 9,
            residual_sum: 0.1,
        };
        assert!(many.is_better_than(&few));
        assert!(!few.is_better_than(&many));
    }

    #[test]
    fn ties_prefer_lower_residual_sum() {
        let tight = Support {
            num_inliers: 10,
            residual_sum: 1.0,
        };
        let loose = Support {
            num_inliers: 10,
            residual_sum: 2.0,
        };
        assert!(tight.is_better_than(&loose));
        assert!(!loose.is_better_than(&tight));
        assert!(!tight.is_better_than(&tight));
    }

    #[test]
    fn any_measured_support_beats_default() {
        let empty = Support::measure(&[], 1.0);
        assert!(empty.is_better_than(&Support::default()));
        assert_eq!(Support::default().inlier_ratio(0), 0.0);
        let half = Support {
            num_inliers: 5,
            residual_sum: 0.0,
        };
        assert!((half.inlier_ratio(10) - 0.5).abs() < 1e-12);
    }
}
