//! Estimator plugins for the LO-RANSAC engine.
//!
//! - Fundamental matrix: 7-point minimal solver, 8-point local solver
//! - 3D similarity transform: Umeyama least squares

pub mod fundamental;
pub mod similarity_transform;

pub use fundamental::{
    center_and_normalize_image_points, FundamentalMatrixEightPointEstimator,
    FundamentalMatrixSevenPointEstimator,
};
pub use similarity_transform::{umeyama, SimilarityTransformEstimator};
