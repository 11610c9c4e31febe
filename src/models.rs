//! Model types produced by the estimators.
//!
//! The similarity transform has its own module,
//! [`similarity_transform`](crate::similarity_transform).

use nalgebra::{Matrix3, Vector2, Vector3};

/// Fundamental matrix relating two uncalibrated views: `x2^T F x1 = 0`.
#[derive(Clone, Debug, PartialEq)]
pub struct FundamentalMatrix {
    pub f: Matrix3<f64>,
}

impl FundamentalMatrix {
    pub fn new(f: Matrix3<f64>) -> Self {
        Self { f }
    }

    /// Algebraic epipolar residual `x2^T F x1`.
    pub fn epipolar_constraint(&self, x1: &Vector2<f64>, x2: &Vector2<f64>) -> f64 {
        x2.push(1.0).dot(&(self.f * x1.push(1.0)))
    }

    /// Squared Sampson distance of a correspondence.
    pub fn squared_sampson_error(&self, x1: &Vector2<f64>, x2: &Vector2<f64>) -> f64 {
        let x1h = x1.push(1.0);
        let x2h = x2.push(1.0);
        let fx1: Vector3<f64> = self.f * x1h;
        let ftx2: Vector3<f64> = self.f.transpose() * x2h;
        let c = x2h.dot(&fx1);
        let denom = fx1.x * fx1.x + fx1.y * fx1.y + ftx2.x * ftx2.x + ftx2.y * ftx2.y;
        if denom <= f64::MIN_POSITIVE {
            return if c == 0.0 { 0.0 } else { f64::MAX };
        }
        c * c / denom
    }
}
