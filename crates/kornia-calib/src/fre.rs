use crate::error::CalibError;
use crate::linalg;
use crate::transforms::RigidTransform;

/// Compute the fiducial registration error (FRE).
///
/// Each moving point is mapped through `transform` and compared against the
/// fixed point with the same index. The result is the root-mean-square of the
/// distances, in the units of the input points. Empty sets give zero.
///
/// # Arguments
///
/// * `fixed_points` - Reference points.
/// * `moving_points` - Points to be mapped onto the reference.
/// * `transform` - Transform from the moving to the fixed frame.
///
/// # Errors
///
/// [`CalibError::InputSizeMismatch`] if the sets differ in length.
pub fn fiducial_registration_error(
    fixed_points: &[[f64; 3]],
    moving_points: &[[f64; 3]],
    transform: &RigidTransform,
) -> Result<f64, CalibError> {
    if fixed_points.len() != moving_points.len() {
        return Err(CalibError::InputSizeMismatch {
            fixed: fixed_points.len(),
            moving: moving_points.len(),
        });
    }

    if fixed_points.is_empty() {
        return Ok(0.0);
    }

    let sum_sq: f64 = fixed_points
        .iter()
        .zip(moving_points.iter())
        .map(|(f, m)| linalg::squared_distance3(f, &transform.apply(m)))
        .sum();

    Ok((sum_sq / fixed_points.len() as f64).sqrt())
}
