//! Rotation and pose primitives.
//!
//! Poses follow the world-to-camera convention: a pose `(q, t)` maps a world
//! point `X` to `R(q) X + t`, i.e. its projection matrix is `[R | t]`.

use nalgebra::{Matrix3, Matrix3x4, Matrix4, Quaternion, Rotation3, UnitQuaternion, Vector3};

/// Compose the 3x4 projection matrix `[R | t]`.
pub fn compose_projection_matrix(
    rotation: &UnitQuaternion<f64>,
    translation: &Vector3<f64>,
) -> Matrix3x4<f64> {
    let mut proj = Matrix3x4::zeros();
    proj.fixed_view_mut::<3, 3>(0, 0)
        .copy_from(&quaternion_to_rotation_matrix(rotation));
    proj.set_column(3, translation);
    proj
}

/// Unit quaternion of an orthonormal matrix with positive determinant.
pub fn rotation_matrix_to_quaternion(matrix: &Matrix3<f64>) -> UnitQuaternion<f64> {
    UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(*matrix))
}

pub fn quaternion_to_rotation_matrix(rotation: &UnitQuaternion<f64>) -> Matrix3<f64> {
    rotation.to_rotation_matrix().into_inner()
}

/// Normalize a raw `(w, x, y, z)` quaternion. Degenerate input maps to identity.
pub fn normalize_quaternion(w: f64, x: f64, y: f64, z: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::try_new(Quaternion::new(w, x, y, z), f64::EPSILON)
        .unwrap_or_else(UnitQuaternion::identity)
}

/// Inverse pose `(R^T, -R^T t)`.
pub fn invert_pose(
    rotation: &UnitQuaternion<f64>,
    translation: &Vector3<f64>,
) -> (UnitQuaternion<f64>, Vector3<f64>) {
    let inv_rotation = rotation.inverse();
    let inv_translation = -inv_rotation.transform_vector(translation);
    (inv_rotation, inv_translation)
}

/// Camera centre `-R^T t` of a world-to-camera pose.
pub fn projection_center_from_pose(
    rotation: &UnitQuaternion<f64>,
    translation: &Vector3<f64>,
) -> Vector3<f64> {
    -rotation.inverse_transform_vector(translation)
}

/// Append the row `[0, 0, 0, 1]`.
pub fn to_homogeneous(matrix: &Matrix3x4<f64>) -> Matrix4<f64> {
    let mut out = Matrix4::identity();
    out.fixed_view_mut::<3, 4>(0, 0).copy_from(matrix);
    out
}
