//! Similarity transform estimator using the closed-form Umeyama solution.

use nalgebra::{Matrix3, Matrix3x4, Vector3};

use crate::core::Estimator;
use crate::similarity_transform::SimilarityTransform3;

/// Relative singular value below which point sets count as collinear.
const DEGENERACY_TOLERANCE: f64 = 1e-10;

/// Least-squares similarity (or rigid) transform mapping `src[i]` to `tgt[i]`.
///
/// Rotation from the SVD of the cross-covariance, scale from the ratio of the
/// singular value trace to the source variance, translation from the centroids.
/// With exactly three non-collinear points the fit is exact.
///
/// Returns `None` for fewer than three points, mismatched lengths, or
/// coincident/collinear point sets.
pub fn umeyama(
    src: &[Vector3<f64>],
    tgt: &[Vector3<f64>],
    estimate_scale: bool,
) -> Option<Matrix3x4<f64>> {
    let n = src.len();
    if n < 3 || tgt.len() != n {
        return None;
    }
    let inv_n = 1.0 / n as f64;

    let src_mean = src.iter().sum::<Vector3<f64>>() * inv_n;
    let tgt_mean = tgt.iter().sum::<Vector3<f64>>() * inv_n;

    let mut sigma = Matrix3::<f64>::zeros();
    let mut src_var = 0.0;
    let mut tgt_var = 0.0;
    for (s, t) in src.iter().zip(tgt) {
        let sc = s - src_mean;
        let tc = t - tgt_mean;
        sigma += tc * sc.transpose();
        src_var += sc.norm_squared();
        tgt_var += tc.norm_squared();
    }
    sigma *= inv_n;
    src_var *= inv_n;
    tgt_var *= inv_n;

    if src_var <= f64::MIN_POSITIVE || tgt_var <= f64::MIN_POSITIVE {
        return None;
    }

    let svd = sigma.svd(true, true);
    let u = svd.u?;
    let v_t = svd.v_t?;
    let singular = svd.singular_values;

    // Rank below two leaves the rotation about the common line undetermined.
    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| singular[b].total_cmp(&singular[a]));
    let largest = singular[order[0]];
    if largest <= f64::MIN_POSITIVE || singular[order[1]] <= DEGENERACY_TOLERANCE * largest {
        return None;
    }

    let mut signs = Vector3::new(1.0, 1.0, 1.0);
    if u.determinant() * v_t.determinant() < 0.0 {
        signs[order[2]] = -1.0;
    }

    let rotation = u * Matrix3::from_diagonal(&signs) * v_t;
    let scale = if estimate_scale {
        singular.component_mul(&signs).sum() / src_var
    } else {
        1.0
    };
    if !(scale > 0.0 && scale.is_finite()) {
        return None;
    }
    let translation = tgt_mean - scale * rotation * src_mean;

    let mut matrix = Matrix3x4::zeros();
    matrix
        .fixed_view_mut::<3, 3>(0, 0)
        .copy_from(&(rotation * scale));
    matrix.set_column(3, &translation);
    Some(matrix)
}

/// Estimator plugin for 3D similarity transforms from point correspondences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimilarityTransformEstimator {
    estimate_scale: bool,
    sample_size: usize,
}

impl Default for SimilarityTransformEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl SimilarityTransformEstimator {
    /// Full similarity with minimal samples of three points.
    pub fn new() -> Self {
        Self {
            estimate_scale: true,
            sample_size: 3,
        }
    }

    /// Rigid variant: the scale is fixed to one.
    pub fn rigid() -> Self {
        Self {
            estimate_scale: false,
            sample_size: 3,
        }
    }

    /// Draw larger samples; values below three are raised to three.
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size.max(3);
        self
    }

    pub fn estimates_scale(&self) -> bool {
        self.estimate_scale
    }
}

impl Estimator for SimilarityTransformEstimator {
    type X = Vector3<f64>;
    type Y = Vector3<f64>;
    type Model = SimilarityTransform3;

    fn sample_size(&self) -> usize {
        self.sample_size
    }

    fn estimate(&self, src: &[Vector3<f64>], tgt: &[Vector3<f64>]) -> Vec<SimilarityTransform3> {
        umeyama(src, tgt, self.estimate_scale)
            .map(SimilarityTransform3::from_matrix)
            .into_iter()
            .collect()
    }

    fn residuals(
        &self,
        src: &[Vector3<f64>],
        tgt: &[Vector3<f64>],
        model: &SimilarityTransform3,
        residuals: &mut Vec<f64>,
    ) {
        residuals.clear();
        residuals.extend(
            src.iter()
                .zip(tgt)
                .map(|(s, t)| (model.transform_point(s) - t).norm_squared()),
        );
    }
}
