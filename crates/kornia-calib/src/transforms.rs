use serde::{Deserialize, Serialize};

use crate::error::CalibError;
use crate::linalg;

/// A rigid transform made of a rotation and a translation.
///
/// Equivalent to the homogeneous matrix
///
/// ```text
/// | R00 R01 R02 t0 |
/// | R10 R11 R12 t1 |
/// | R20 R21 R22 t2 |
/// |  0   0   0   1 |
/// ```
///
/// The identity transform doubles as the "no solution" value in callers
/// that need a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    /// Rotation matrix, row-major.
    pub rotation: [[f64; 3]; 3],
    /// Translation vector.
    pub translation: [f64; 3],
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl RigidTransform {
    /// Create a transform from a rotation and a translation.
    pub fn new(rotation: [[f64; 3]; 3], translation: [f64; 3]) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// The identity transform.
    pub fn identity() -> Self {
        Self {
            rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            translation: [0.0; 3],
        }
    }

    /// A pure translation.
    pub fn from_translation(translation: [f64; 3]) -> Self {
        Self {
            translation,
            ..Self::identity()
        }
    }

    /// Build from a 4x4 homogeneous matrix. The bottom row is ignored.
    pub fn from_matrix(m: &[[f64; 4]; 4]) -> Self {
        let mut rotation = [[0.0; 3]; 3];
        let mut translation = [0.0; 3];
        for r in 0..3 {
            rotation[r].copy_from_slice(&m[r][..3]);
            translation[r] = m[r][3];
        }
        Self {
            rotation,
            translation,
        }
    }

    /// Convert into a 4x4 homogeneous matrix.
    pub fn to_matrix(&self) -> [[f64; 4]; 4] {
        let mut m = [[0.0; 4]; 4];
        for r in 0..3 {
            m[r][..3].copy_from_slice(&self.rotation[r]);
            m[r][3] = self.translation[r];
        }
        m[3][3] = 1.0;
        m
    }

    /// Apply the transform to a point: `R * p + t`.
    pub fn apply(&self, point: &[f64; 3]) -> [f64; 3] {
        let rp = linalg::mat33_vec3(&self.rotation, point);
        [
            rp[0] + self.translation[0],
            rp[1] + self.translation[1],
            rp[2] + self.translation[2],
        ]
    }

    /// Apply the transform to every point of a set.
    pub fn apply_points(&self, points: &[[f64; 3]]) -> Vec<[f64; 3]> {
        points.iter().map(|p| self.apply(p)).collect()
    }

    /// Compose two transforms so that `a.compose(&b).apply(p) == a.apply(&b.apply(p))`.
    pub fn compose(&self, other: &RigidTransform) -> Self {
        Self {
            rotation: linalg::matmul33(&self.rotation, &other.rotation),
            translation: self.apply(&other.translation),
        }
    }

    /// The inverse transform, assuming the rotation block is orthonormal.
    pub fn inverse(&self) -> Self {
        let rotation = linalg::transpose33(&self.rotation);
        let rt = linalg::mat33_vec3(&rotation, &self.translation);
        Self {
            rotation,
            translation: [-rt[0], -rt[1], -rt[2]],
        }
    }

    /// Check that the rotation block is orthonormal with determinant +1.
    ///
    /// # Arguments
    ///
    /// * `tolerance` - Maximum absolute deviation allowed per entry of `R * R^T - I`
    ///   and for `det(R) - 1`.
    pub fn is_valid_rotation(&self, tolerance: f64) -> bool {
        let rrt = linalg::matmul33(&self.rotation, &linalg::transpose33(&self.rotation));
        let orthonormal = rrt.iter().enumerate().all(|(i, row)| {
            row.iter().enumerate().all(|(j, val)| {
                let expected = if i == j { 1.0 } else { 0.0 };
                (val - expected).abs() <= tolerance
            })
        });
        orthonormal && (linalg::det_mat33(&self.rotation) - 1.0).abs() <= tolerance
    }
}

/// Compute the rotation matrix from an axis and angle.
///
/// # Arguments
///
/// * `axis` - The axis of rotation. It does not need to be normalized.
/// * `angle` - The angle of rotation in radians.
///
/// # Returns
///
/// The rotation matrix, or [`CalibError::InvalidAxis`] for a zero axis.
///
/// Example:
///
/// ```
/// use kornia_calib::transforms::axis_angle_to_rotation_matrix;
///
/// let angle = std::f64::consts::FRAC_PI_2;
/// let rotation = axis_angle_to_rotation_matrix(&[0.0, 0.0, 1.0], angle).unwrap();
/// assert!((rotation[1][0] - 1.0).abs() < 1e-12);
/// ```
pub fn axis_angle_to_rotation_matrix(
    axis: &[f64; 3],
    angle: f64,
) -> Result<[[f64; 3]; 3], CalibError> {
    let magnitude = linalg::dot_product3(axis, axis).sqrt();
    if magnitude < 1e-10 {
        return Err(CalibError::InvalidAxis);
    }
    let (x, y, z) = (
        axis[0] / magnitude,
        axis[1] / magnitude,
        axis[2] / magnitude,
    );

    let c = angle.cos();
    let s = angle.sin();
    let t = 1.0 - c;

    Ok([
        [c + x * x * t, x * y * t - z * s, x * z * t + y * s],
        [x * y * t + z * s, c + y * y * t, y * z * t - x * s],
        [x * z * t - y * s, y * z * t + x * s, c + z * z * t],
    ])
}
