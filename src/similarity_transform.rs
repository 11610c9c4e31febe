//! 3D similarity transform `x -> s R x + t`.
//!
//! Stored as the 3x4 matrix `[s R | t]`. Used to align one reconstruction to
//! another, by mapping points and rewriting camera poses.

use nalgebra::{Matrix3, Matrix3x4, UnitQuaternion, Vector3};

use crate::error::EstimationError;
use crate::estimators::similarity_transform::umeyama;
use crate::geometry::{compose_projection_matrix, rotation_matrix_to_quaternion, to_homogeneous};

#[derive(Clone, Debug, PartialEq)]
pub struct SimilarityTransform3 {
    matrix: Matrix3x4<f64>,
}

impl Default for SimilarityTransform3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl SimilarityTransform3 {
    /// Unit scale, no rotation, no translation.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3x4::identity(),
        }
    }

    /// Wrap a `[s R | t]` matrix. The left block is taken as is.
    pub fn from_matrix(matrix: Matrix3x4<f64>) -> Self {
        Self { matrix }
    }

    pub fn new(scale: f64, rotation: UnitQuaternion<f64>, translation: Vector3<f64>) -> Self {
        let mut matrix = compose_projection_matrix(&rotation, &translation);
        let mut linear = matrix.fixed_view_mut::<3, 3>(0, 0);
        linear *= scale;
        Self { matrix }
    }

    pub fn matrix(&self) -> &Matrix3x4<f64> {
        &self.matrix
    }

    /// Norm of the first column of the left block.
    pub fn scale(&self) -> f64 {
        self.matrix.column(0).norm()
    }

    pub fn rotation(&self) -> UnitQuaternion<f64> {
        rotation_matrix_to_quaternion(&(self.linear() / self.scale()))
    }

    pub fn translation(&self) -> Vector3<f64> {
        self.matrix.column(3).into_owned()
    }

    fn linear(&self) -> Matrix3<f64> {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// Fit the transform mapping `src[i]` onto `tgt[i]` in the least-squares
    /// sense and replace `self` with it.
    ///
    /// Returns `Ok(false)` and leaves `self` untouched when either point set
    /// is coincident or collinear.
    pub fn estimate(
        &mut self,
        src: &[Vector3<f64>],
        tgt: &[Vector3<f64>],
    ) -> Result<bool, EstimationError> {
        if src.len() != tgt.len() {
            return Err(EstimationError::MismatchedLengths {
                x: src.len(),
                y: tgt.len(),
            });
        }
        if src.len() < 3 {
            return Err(EstimationError::InsufficientData {
                required: 3,
                actual: src.len(),
            });
        }
        match umeyama(src, tgt, true) {
            Some(matrix) => {
                self.matrix = matrix;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn inverse(&self) -> Self {
        let scale = self.scale();
        let inv_linear = self.linear().transpose() / (scale * scale);
        let inv_translation = inv_linear * -self.translation();

        let mut matrix = Matrix3x4::zeros();
        matrix.fixed_view_mut::<3, 3>(0, 0).copy_from(&inv_linear);
        matrix.set_column(3, &inv_translation);
        Self { matrix }
    }

    pub fn transform_point(&self, point: &Vector3<f64>) -> Vector3<f64> {
        self.matrix * point.push(1.0)
    }

    /// The transform applying `other` first, then `self`.
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            matrix: self.matrix * to_homogeneous(&other.matrix),
        }
    }

    /// Rewrite a world-to-camera pose so that it observes the transformed
    /// world the way it observed the original one.
    ///
    /// The scale of `P [T^-1; 0 0 0 1]` is divided out of the result.
    pub fn transform_pose(
        &self,
        rotation: &mut UnitQuaternion<f64>,
        translation: &mut Vector3<f64>,
    ) {
        let projection = compose_projection_matrix(rotation, translation);
        let transformed = projection * to_homogeneous(&self.inverse().matrix);
        let scale = transformed.column(0).norm();

        let linear = transformed.fixed_view::<3, 3>(0, 0).into_owned() / scale;
        *rotation = rotation_matrix_to_quaternion(&linear);
        *translation = transformed.column(3) / scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::projection_center_from_pose;

    fn sample() -> SimilarityTransform3 {
        SimilarityTransform3::new(
            2.5,
            UnitQuaternion::from_euler_angles(0.4, -0.7, 1.2),
            Vector3::new(1.0, -2.0, 0.5),
        )
    }

    fn points() -> Vec<Vector3<f64>> {
        vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(2.0, -1.0, 3.0),
        ]
    }

    #[test]
    fn default_is_identity() {
        let t = SimilarityTransform3::default();
        assert_eq!(t.scale(), 1.0);
        assert_eq!(t.translation(), Vector3::zeros());
        assert!(t.rotation().angle() < 1e-12);
        let p = Vector3::new(1.0, 2.0, 3.0);
        assert_eq!(t.transform_point(&p), p);
    }

    #[test]
    fn accessors_return_constructor_arguments() {
        let rotation = UnitQuaternion::from_euler_angles(0.4, -0.7, 1.2);
        let t = sample();
        assert!((t.scale() - 2.5).abs() < 1e-12);
        assert!(t.rotation().angle_to(&rotation) < 1e-6);
        assert_eq!(t.translation(), Vector3::new(1.0, -2.0, 0.5));
    }

    #[test]
    fn inverse_twice_is_identity_operation() {
        let t = sample();
        let back = t.inverse().inverse();
        let diff = (back.matrix() - t.matrix()).abs().max();
        assert!(diff < 1e-9 * t.matrix().abs().max());
    }

    #[test]
    fn inverse_inverts_scale_and_points() {
        let t = sample();
        let inv = t.inverse();
        assert!((inv.scale() - 1.0 / t.scale()).abs() < 1e-12);
        for p in points() {
            let back = inv.transform_point(&t.transform_point(&p));
            assert!((back - p).norm() < 1e-12);
        }
    }

    #[test]
    fn compose_applies_right_operand_first() {
        let a = sample();
        let b = SimilarityTransform3::new(
            0.5,
            UnitQuaternion::from_euler_angles(-0.1, 0.2, 0.3),
            Vector3::new(0.0, 3.0, -1.0),
        );
        let ab = a.compose(&b);
        for p in points() {
            let expected = a.transform_point(&b.transform_point(&p));
            assert!((ab.transform_point(&p) - expected).norm() < 1e-12);
        }
        let round = a.compose(&a.inverse());
        assert!((round.matrix() - Matrix3x4::identity()).abs().max() < 1e-12);
    }

    #[test]
    fn estimate_recovers_known_transform() {
        let expected = SimilarityTransform3::new(
            2.0,
            UnitQuaternion::identity(),
            Vector3::new(1.0, 2.0, 3.0),
        );
        let src = points();
        let tgt: Vec<_> = src.iter().map(|p| expected.transform_point(p)).collect();

        let mut t = SimilarityTransform3::default();
        assert_eq!(t.estimate(&src, &tgt), Ok(true));
        assert!((t.scale() - 2.0).abs() < 1e-9);
        assert!(t.rotation().angle() < 1e-6);
        assert!((t.translation() - Vector3::new(1.0, 2.0, 3.0)).norm() < 1e-9);
    }

    #[test]
    fn estimate_solves_three_points_exactly() {
        let expected = sample();
        let src = &points()[1..4].to_vec();
        let tgt: Vec<_> = src.iter().map(|p| expected.transform_point(p)).collect();

        let mut t = SimilarityTransform3::default();
        assert_eq!(t.estimate(src, &tgt), Ok(true));
        for (s, g) in src.iter().zip(&tgt) {
            assert!((t.transform_point(s) - g).norm() < 1e-9);
        }
    }

    #[test]
    fn collinear_input_leaves_transform_unchanged() {
        let src = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(2.0, 0.0, 0.0),
        ];
        let tgt = src.clone();
        let mut t = sample();
        assert_eq!(t.estimate(&src, &tgt), Ok(false));
        assert_eq!(t, sample());
    }

    #[test]
    fn estimate_rejects_bad_input() {
        let mut t = SimilarityTransform3::default();
        let src = points();
        assert_eq!(
            t.estimate(&src, &src[..4]),
            Err(EstimationError::MismatchedLengths { x: 5, y: 4 })
        );
        assert_eq!(
            t.estimate(&src[..2], &src[..2]),
            Err(EstimationError::InsufficientData {
                required: 3,
                actual: 2
            })
        );
        assert_eq!(t, SimilarityTransform3::default());
    }

    #[test]
    fn identity_leaves_pose_unchanged() {
        let mut rotation = UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3);
        let mut translation = Vector3::new(-1.0, 0.5, 4.0);
        let (r0, t0) = (rotation, translation);

        SimilarityTransform3::identity().transform_pose(&mut rotation, &mut translation);
        assert!(rotation.angle_to(&r0) < 1e-6);
        assert!((translation - t0).norm() < 1e-12);
    }

    #[test]
    fn projection_centers_move_like_points() {
        let t = sample();
        let mut rotation = UnitQuaternion::from_euler_angles(-0.3, 0.05, 2.0);
        let mut translation = Vector3::new(0.2, -0.4, 3.0);
        let center = projection_center_from_pose(&rotation, &translation);

        t.transform_pose(&mut rotation, &mut translation);
        let moved = projection_center_from_pose(&rotation, &translation);
        assert!((moved - t.transform_point(&center)).norm() < 1e-9);
    }

    #[test]
    fn transformed_pose_sees_transformed_points_in_the_same_direction() {
        let t = sample();
        let mut rotation = UnitQuaternion::from_euler_angles(0.2, 0.1, -0.5);
        let mut translation = Vector3::new(0.0, 0.0, 5.0);
        let world = Vector3::new(0.3, -0.2, 1.0);
        let before = (rotation * world + translation).normalize();

        t.transform_pose(&mut rotation, &mut translation);
        let after = (rotation * t.transform_point(&world) + translation).normalize();
        assert!((before - after).norm() < 1e-9);
    }
}
