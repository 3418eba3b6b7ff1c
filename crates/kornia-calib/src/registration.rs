use serde::{Deserialize, Serialize};

use crate::covariance::cross_covariance;
use crate::error::CalibError;
use crate::fre::fiducial_registration_error;
use crate::linalg;
use crate::points::{centroid, translate_points};
use crate::transforms::RigidTransform;

/// Tolerances for point-based registration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationParams {
    /// A singular value of the cross-covariance below this is treated as zero,
    /// which enables the reflection correction for planar configurations.
    pub near_zero_tol: f64,
}

impl Default for RegistrationParams {
    fn default() -> Self {
        Self {
            near_zero_tol: 1e-4,
        }
    }
}

/// How the candidate rotation `X` was accepted or rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationCase {
    /// `det(X) > 0`: `X` is already a proper rotation.
    Proper,
    /// `det(X) < 0` with a near-zero singular value: the third column of `V`
    /// was negated to turn the reflection into a rotation.
    ReflectionCorrected,
    /// `det(X) <= 0` and nothing to correct with, or a non-finite determinant.
    Unresolved,
}

/// Result of a point-based registration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    /// Transform mapping the moving points onto the fixed points.
    pub transform: RigidTransform,
    /// Fiducial registration error of `transform` over the input points.
    pub fre: f64,
    /// Branch taken when resolving the rotation.
    pub rotation_case: RotationCase,
}

/// Decide how to treat the candidate rotation.
///
/// # Arguments
///
/// * `det_x` - Determinant of the candidate rotation.
/// * `singular_values` - Singular values of the cross-covariance matrix.
/// * `near_zero_tol` - Tolerance under which a singular value counts as zero.
pub fn classify_rotation(
    det_x: f64,
    singular_values: &[f64; 3],
    near_zero_tol: f64,
) -> RotationCase {
    let rank_deficient = singular_values
        .iter()
        .any(|&w| linalg::is_close_to_zero(w, near_zero_tol));

    match (det_x > 0.0, det_x < 0.0, rank_deficient) {
        (true, _, _) => RotationCase::Proper,
        (_, true, true) => RotationCase::ReflectionCorrected,
        _ => RotationCase::Unresolved,
    }
}

/// Recover the rigid transform from a cross-covariance matrix and centroids.
///
/// Based on Arun et al. "Least-squares fitting of two 3-D point sets",
/// IEEE PAMI 1987, with the `diag(1, 1, det(VU))` correction from
/// Fitzpatrick's treatment of point-based registration.
///
/// # Arguments
///
/// * `h` - Cross-covariance of the centered moving and fixed points, see [`cross_covariance`].
/// * `moving_centroid` - Centroid of the moving points.
/// * `fixed_centroid` - Centroid of the fixed points.
/// * `params` - Registration tolerances.
///
/// # Errors
///
/// [`CalibError::UnresolvedRotation`] when no proper rotation can be formed.
pub fn solve_rotation(
    h: &[[f64; 3]; 3],
    moving_centroid: &[f64; 3],
    fixed_centroid: &[f64; 3],
    params: &RegistrationParams,
) -> Result<(RigidTransform, RotationCase), CalibError> {
    let svd = linalg::svd(h);
    let (u, v) = (svd.u, svd.v);
    let u_t = linalg::transpose33(&u);

    let det_vu = linalg::det_mat33(&linalg::matmul33(&v, &u));
    let diag = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, det_vu]];
    let candidate = linalg::matmul33(&v, &linalg::matmul33(&diag, &u_t));

    let det_x = linalg::det_mat33(&candidate);
    let case = classify_rotation(det_x, &svd.s, params.near_zero_tol);

    log::debug!(
        "Singular values: {:?}, det(X): {}, case: {:?}",
        svd.s,
        det_x,
        case
    );

    let rotation = match case {
        RotationCase::Proper => candidate,
        RotationCase::ReflectionCorrected => {
            log::warn!(
                "Reflection corrected for a rank deficient configuration, singular values: {:?}",
                svd.s
            );
            let mut v_prime = v;
            for row in v_prime.iter_mut() {
                row[2] = -row[2];
            }
            linalg::matmul33(&v_prime, &u_t)
        }
        RotationCase::Unresolved => return Err(CalibError::UnresolvedRotation { det: det_x }),
    };

    // t = p' - R * p
    let r_p = linalg::mat33_vec3(&rotation, moving_centroid);
    let translation = [
        fixed_centroid[0] - r_p[0],
        fixed_centroid[1] - r_p[1],
        fixed_centroid[2] - r_p[2],
    ];

    Ok((RigidTransform::new(rotation, translation), case))
}

/// Register two corresponding point sets with the default tolerances.
///
/// See [`register_points_with_params`].
pub fn register_points(
    fixed_points: &[[f64; 3]],
    moving_points: &[[f64; 3]],
) -> Result<CalibrationResult, CalibError> {
    register_points_with_params(fixed_points, moving_points, &RegistrationParams::default())
}

/// Find the rigid transform that best maps `moving_points` onto `fixed_points`.
///
/// Point `i` of one set corresponds to point `i` of the other. At least three
/// non-collinear correspondences are needed for a unique answer; fewer points
/// still produce a result but it should not be trusted.
///
/// # Arguments
///
/// * `fixed_points` - Reference points.
/// * `moving_points` - Points to be aligned onto the reference.
/// * `params` - Registration tolerances.
///
/// # Returns
///
/// The transform together with its fiducial registration error.
///
/// # Errors
///
/// * [`CalibError::InputSizeMismatch`] if the sets differ in length.
/// * [`CalibError::UnresolvedRotation`] if no proper rotation exists for the configuration.
///
/// Example:
///
/// ```
/// use kornia_calib::register_points;
///
/// let moving = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
/// let fixed: Vec<_> = moving.iter().map(|p| [p[0] + 1.0, p[1], p[2]]).collect();
/// let result = register_points(&fixed, &moving).unwrap();
/// assert!(result.fre < 1e-9);
/// ```
pub fn register_points_with_params(
    fixed_points: &[[f64; 3]],
    moving_points: &[[f64; 3]],
    params: &RegistrationParams,
) -> Result<CalibrationResult, CalibError> {
    if fixed_points.len() != moving_points.len() {
        return Err(CalibError::InputSizeMismatch {
            fixed: fixed_points.len(),
            moving: moving_points.len(),
        });
    }

    if fixed_points.len() < 3 {
        log::warn!(
            "Registering {} correspondences, at least 3 non-collinear points are needed",
            fixed_points.len()
        );
    }

    let p_fixed = centroid(fixed_points);
    let p_moving = centroid(moving_points);

    let q_fixed = translate_points(fixed_points, &p_fixed);
    let q_moving = translate_points(moving_points, &p_moving);

    let h = cross_covariance(&q_moving, &q_fixed);

    let (transform, rotation_case) = solve_rotation(&h, &p_moving, &p_fixed, params)?;

    let fre = fiducial_registration_error(fixed_points, moving_points, &transform)?;
    log::debug!("Registration FRE: {}", fre);

    Ok(CalibrationResult {
        transform,
        fre,
        rotation_case,
    })
}
