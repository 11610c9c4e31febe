//! # loransac - Robust Estimation with LO-RANSAC
//!
//! `loransac` estimates geometric models from noisy correspondences with
//! locally optimized RANSAC, and provides the 3D similarity transform used to
//! align one reconstruction to another.
//!
//! ## Quick Start
//!
//! The easiest way to use `loransac` is through the high-level API functions:
//!
//! ```rust
//! use loransac::{estimate_similarity_transform, RansacOptions, SimilarityTransform3};
//! use nalgebra::{UnitQuaternion, Vector3};
//!
//! let truth = SimilarityTransform3::new(
//!     2.0,
//!     UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3),
//!     Vector3::new(1.0, 2.0, 3.0),
//! );
//! let src = vec![
//!     Vector3::new(0.0, 0.0, 0.0),
//!     Vector3::new(1.0, 0.0, 0.0),
//!     Vector3::new(0.0, 1.0, 0.0),
//!     Vector3::new(0.0, 0.0, 1.0),
//!     Vector3::new(1.0, 1.0, 1.0),
//! ];
//! let tgt: Vec<_> = src.iter().map(|p| truth.transform_point(p)).collect();
//!
//! let options = RansacOptions { max_error: 0.01, ..RansacOptions::default() };
//! let report = estimate_similarity_transform(&src, &tgt, &options).unwrap();
//! assert!(report.success);
//! assert_eq!(report.support.num_inliers, 5);
//! ```
//!
//! ## Extending the Library
//!
//! The engine is generic over the [`Estimator`](core::Estimator) trait. A
//! plugin names its correspondence and model types, the minimal sample size,
//! a solver, and a squared residual:
//!
//! ```rust
//! use loransac::core::{Estimator, LoRansac};
//! use loransac::RansacOptions;
//!
//! /// Constant offset `y = x + d`.
//! #[derive(Clone)]
//! struct OffsetEstimator;
//!
//! impl Estimator for OffsetEstimator {
//!     type X = f64;
//!     type Y = f64;
//!     type Model = f64;
//!
//!     fn sample_size(&self) -> usize {
//!         1
//!     }
//!
//!     fn estimate(&self, x: &[f64], y: &[f64]) -> Vec<f64> {
//!         let n = x.len() as f64;
//!         vec![x.iter().zip(y).map(|(a, b)| b - a).sum::<f64>() / n]
//!     }
//!
//!     fn residuals(&self, x: &[f64], y: &[f64], d: &f64, out: &mut Vec<f64>) {
//!         out.clear();
//!         out.extend(x.iter().zip(y).map(|(a, b)| (b - a - d).powi(2)));
//!     }
//! }
//!
//! let x = [0.0, 1.0, 2.0, 3.0, 4.0];
//! let y = [5.0, 6.0, 7.0, 100.0, 9.0];
//! let ransac = LoRansac::with_estimator(RansacOptions::default(), OffsetEstimator);
//! let report = ransac.estimate(&x, &y).unwrap();
//! assert_eq!(report.model, Some(5.0));
//! assert_eq!(report.inlier_mask, vec![true, true, true, false, true]);
//! ```
//!
//! ## Modules
//!
//! - **[`api`](api)**: High-level estimation and trajectory alignment
//! - **[`core`](core)**: Core traits and the `LoRansac` pipeline
//! - **[`estimators`](estimators)**: Fundamental matrix and similarity estimators
//! - **[`similarity_transform`](similarity_transform)**: The `SimilarityTransform3` entity
//! - **[`persistence`](persistence)**: Text storage of similarity transforms
//! - **[`settings`](settings)**: `RansacOptions`
//! - **[`geometry`](geometry)**: Pose and rotation helpers

pub mod api;
pub mod core;
pub mod error;
pub mod estimators;
pub mod geometry;
pub mod models;
pub mod persistence;
pub mod samplers;
pub mod scoring;
pub mod settings;
pub mod similarity_transform;
pub mod utils;

#[cfg(feature = "python")]
pub mod python;

// Re-export high-level API
pub use api::{align_poses, estimate_fundamental_matrix, estimate_similarity_transform, CameraPose};

// Re-export core traits for easy access
pub use core::{Estimator, LoRansac, Report, Sampler};

pub use error::{EstimationError, PersistenceError};
pub use models::FundamentalMatrix;
pub use scoring::Support;
pub use settings::RansacOptions;
pub use similarity_transform::SimilarityTransform3;
