//! High-level Rust API.
//!
//! Convenience functions wiring the estimator plugins into [`LoRansac`], plus
//! trajectory alignment with a [`SimilarityTransform3`].

use nalgebra::{UnitQuaternion, Vector2, Vector3};

use crate::core::{LoRansac, Report};
use crate::error::EstimationError;
use crate::estimators::{
    FundamentalMatrixEightPointEstimator, FundamentalMatrixSevenPointEstimator,
    SimilarityTransformEstimator,
};
use crate::geometry::projection_center_from_pose;
use crate::models::FundamentalMatrix;
use crate::settings::RansacOptions;
use crate::similarity_transform::SimilarityTransform3;

/// Estimate a fundamental matrix from 2D point correspondences.
///
/// Samples with the seven-point solver and refines inlier sets with the
/// eight-point solver. `options.max_error` is the Sampson distance threshold
/// in pixels.
///
/// # Arguments
/// * `points1` - Points in the first image
/// * `points2` - Corresponding points in the second image
/// * `options` - Loop configuration
pub fn estimate_fundamental_matrix(
    points1: &[Vector2<f64>],
    points2: &[Vector2<f64>],
    options: &RansacOptions,
) -> Result<Report<FundamentalMatrix>, EstimationError> {
    let ransac = LoRansac::new(
        options.clone(),
        FundamentalMatrixSevenPointEstimator::new(),
        FundamentalMatrixEightPointEstimator::new(),
    );
    ransac.estimate(points1, points2)
}

/// Estimate the similarity transform mapping `src[i]` onto `tgt[i]`.
///
/// `options.max_error` is the inlier threshold on the point distance, in the
/// units of `tgt`.
pub fn estimate_similarity_transform(
    src: &[Vector3<f64>],
    tgt: &[Vector3<f64>],
    options: &RansacOptions,
) -> Result<Report<SimilarityTransform3>, EstimationError> {
    let ransac = LoRansac::with_estimator(options.clone(), SimilarityTransformEstimator::new());
    ransac.estimate(src, tgt)
}

/// World-to-camera pose of one image.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraPose {
    pub rotation: UnitQuaternion<f64>,
    pub translation: Vector3<f64>,
}

impl CameraPose {
    pub fn new(rotation: UnitQuaternion<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Camera centre in world coordinates.
    pub fn projection_center(&self) -> Vector3<f64> {
        projection_center_from_pose(&self.rotation, &self.translation)
    }
}

/// Move every pose of a trajectory into the frame given by `transform`.
pub fn align_poses(transform: &SimilarityTransform3, poses: &mut [CameraPose]) {
    for pose in poses.iter_mut() {
        transform.transform_pose(&mut pose.rotation, &mut pose.translation);
    }
}
