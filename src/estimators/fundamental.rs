//! Fundamental matrix estimators using the 7-point and 8-point algorithms.
//!
//! Both solvers work on Hartley-normalized coordinates and denormalize the
//! result as `T2^T F T1`. Returned matrices have unit Frobenius norm.

use nalgebra::{DMatrix, Matrix3, Vector2, Vector3};

use crate::core::Estimator;
use crate::models::FundamentalMatrix;
use crate::utils::real_cubic_roots;

/// Mean distance from the centroid below which a point set is degenerate.
const MIN_MEAN_DISTANCE: f64 = 1e-10;

/// Translate points to their centroid and scale them to a mean distance of
/// `sqrt(2)`.
///
/// Returns the normalized points with the transform `T` such that
/// `T * [x, y, 1]^T` yields them. `None` for empty or coincident input.
pub fn center_and_normalize_image_points(
    points: &[Vector2<f64>],
) -> Option<(Vec<Vector2<f64>>, Matrix3<f64>)> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let centroid = points.iter().sum::<Vector2<f64>>() / n;
    let mean_distance = points.iter().map(|p| (p - centroid).norm()).sum::<f64>() / n;
    if !(mean_distance > MIN_MEAN_DISTANCE) {
        return None;
    }

    let scale = std::f64::consts::SQRT_2 / mean_distance;
    let transform = Matrix3::new(
        scale,
        0.0,
        -scale * centroid.x,
        0.0,
        scale,
        -scale * centroid.y,
        0.0,
        0.0,
        1.0,
    );
    let normalized = points.iter().map(|p| (p - centroid) * scale).collect();
    Some((normalized, transform))
}

/// Normalize both views, returning `None` if either is degenerate.
fn normalize_views(
    points1: &[Vector2<f64>],
    points2: &[Vector2<f64>],
) -> Option<NormalizedViews> {
    let (x1, t1) = center_and_normalize_image_points(points1)?;
    let (x2, t2) = center_and_normalize_image_points(points2)?;
    Some(NormalizedViews { x1, x2, t1, t2 })
}

struct NormalizedViews {
    x1: Vec<Vector2<f64>>,
    x2: Vec<Vector2<f64>>,
    t1: Matrix3<f64>,
    t2: Matrix3<f64>,
}

impl NormalizedViews {
    /// Map a matrix in normalized coordinates back to image coordinates.
    fn denormalize(&self, f: &Matrix3<f64>) -> Option<FundamentalMatrix> {
        let f = self.t2.transpose() * f * self.t1;
        let norm = f.norm();
        if !(norm > f64::MIN_POSITIVE) || !norm.is_finite() {
            return None;
        }
        Some(FundamentalMatrix::new(f / norm))
    }

    /// Right singular vectors of the epipolar constraint matrix, ordered by
    /// increasing singular value. Each vector is a row-major 3x3 matrix.
    fn constraint_null_space(&self, count: usize) -> Option<Vec<Matrix3<f64>>> {
        // Pad with zero rows so the thin SVD still yields all nine right
        // singular vectors for the 7-point case.
        let rows = self.x1.len().max(9);
        let mut a = DMatrix::<f64>::zeros(rows, 9);
        for (i, (p1, p2)) in self.x1.iter().zip(&self.x2).enumerate() {
            a[(i, 0)] = p2.x * p1.x;
            a[(i, 1)] = p2.x * p1.y;
            a[(i, 2)] = p2.x;
            a[(i, 3)] = p2.y * p1.x;
            a[(i, 4)] = p2.y * p1.y;
            a[(i, 5)] = p2.y;
            a[(i, 6)] = p1.x;
            a[(i, 7)] = p1.y;
            a[(i, 8)] = 1.0;
        }

        let svd = a.svd(false, true);
        let v_t = svd.v_t?;
        let mut order: Vec<usize> = (0..svd.singular_values.len()).collect();
        order.sort_by(|&i, &j| svd.singular_values[i].total_cmp(&svd.singular_values[j]));

        let basis = order
            .iter()
            .take(count)
            .map(|&k| {
                let row = v_t.row(k);
                Matrix3::new(
                    row[0], row[1], row[2], row[3], row[4], row[5], row[6], row[7], row[8],
                )
            })
            .collect::<Vec<_>>();
        (basis.len() == count).then_some(basis)
    }
}

/// Zero the smallest singular value of `f`.
fn enforce_rank_two(f: &Matrix3<f64>) -> Option<Matrix3<f64>> {
    let svd = f.svd(true, true);
    let u = svd.u?;
    let v_t = svd.v_t?;
    let mut singular: Vector3<f64> = svd.singular_values;
    let smallest = singular.argmin().0;
    singular[smallest] = 0.0;
    Some(u * Matrix3::from_diagonal(&singular) * v_t)
}

/// Minimal solver: seven correspondences, up to three candidate matrices.
///
/// The constraint matrix has a two-dimensional null space `F1, F2`; the
/// candidates are the real roots of `det(l F1 + (1 - l) F2) = 0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FundamentalMatrixSevenPointEstimator;

impl FundamentalMatrixSevenPointEstimator {
    pub fn new() -> Self {
        Self
    }
}

impl Estimator for FundamentalMatrixSevenPointEstimator {
    type X = Vector2<f64>;
    type Y = Vector2<f64>;
    type Model = FundamentalMatrix;

    fn sample_size(&self) -> usize {
        7
    }

    fn max_num_models(&self) -> usize {
        3
    }

    fn estimate(&self, points1: &[Vector2<f64>], points2: &[Vector2<f64>]) -> Vec<FundamentalMatrix> {
        if points1.len() < 7 || points1.len() != points2.len() {
            return Vec::new();
        }
        let Some(views) = normalize_views(points1, points2) else {
            return Vec::new();
        };
        let Some(basis) = views.constraint_null_space(2) else {
            return Vec::new();
        };
        let (f1, f2) = (basis[0], basis[1]);

        // det(l F1 + (1 - l) F2) is cubic in l; recover its coefficients from
        // four samples.
        let det_at = |l: f64| (f1 * l + f2 * (1.0 - l)).determinant();
        let pm1 = det_at(-1.0);
        let p0 = det_at(0.0);
        let p1 = det_at(1.0);
        let p2 = det_at(2.0);

        let d = p0;
        let b = 0.5 * (p1 + pm1) - d;
        let odd = 0.5 * (p1 - pm1);
        let a = (p2 - 4.0 * b - d - 2.0 * odd) / 6.0;
        let c = odd - a;

        real_cubic_roots(a, b, c, d)
            .into_iter()
            .filter_map(|l| views.denormalize(&(f1 * l + f2 * (1.0 - l))))
            .take(self.max_num_models())
            .collect()
    }

    fn residuals(
        &self,
        points1: &[Vector2<f64>],
        points2: &[Vector2<f64>],
        model: &FundamentalMatrix,
        residuals: &mut Vec<f64>,
    ) {
        sampson_residuals(points1, points2, model, residuals);
    }
}

/// Linear solver on eight or more correspondences with rank-2 enforcement.
///
/// Used as the local-optimization estimator on inlier sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct FundamentalMatrixEightPointEstimator;

impl FundamentalMatrixEightPointEstimator {
    pub fn new() -> Self {
        Self
    }
}

impl Estimator for FundamentalMatrixEightPointEstimator {
    type X = Vector2<f64>;
    type Y = Vector2<f64>;
    type Model = FundamentalMatrix;

    fn sample_size(&self) -> usize {
        8
    }

    fn estimate(&self, points1: &[Vector2<f64>], points2: &[Vector2<f64>]) -> Vec<FundamentalMatrix> {
        if points1.len() < 8 || points1.len() != points2.len() {
            return Vec::new();
        }
        let Some(views) = normalize_views(points1, points2) else {
            return Vec::new();
        };
        views
            .constraint_null_space(1)
            .and_then(|basis| enforce_rank_two(&basis[0]))
            .and_then(|f| views.denormalize(&f))
            .into_iter()
            .collect()
    }

    fn residuals(
        &self,
        points1: &[Vector2<f64>],
        points2: &[Vector2<f64>],
        model: &FundamentalMatrix,
        residuals: &mut Vec<f64>,
    ) {
        sampson_residuals(points1, points2, model, residuals);
    }
}

fn sampson_residuals(
    points1: &[Vector2<f64>],
    points2: &[Vector2<f64>],
    model: &FundamentalMatrix,
    residuals: &mut Vec<f64>,
) {
    residuals.clear();
    residuals.extend(
        points1
            .iter()
            .zip(points2)
            .map(|(x1, x2)| model.squared_sampson_error(x1, x2)),
    );
}
