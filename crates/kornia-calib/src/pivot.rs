use serde::{Deserialize, Serialize};

use crate::error::CalibError;
use crate::linalg;
use crate::transforms::RigidTransform;

/// Number of unknowns in the pivot system: the tip offset and the pivot point.
pub const PIVOT_UNKNOWNS: usize = 6;

/// Tolerances for pivot calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PivotParams {
    /// Singular values of the stacked system below this are zeroed out and do
    /// not count towards its rank.
    pub rank_threshold: f64,
}

impl Default for PivotParams {
    fn default() -> Self {
        Self {
            rank_threshold: 0.01,
        }
    }
}

/// Result of a pivot calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotResult {
    /// Tool tip expressed in the tracked body frame.
    pub tip_offset: [f64; 3],
    /// Fixed pivot point in the tracker frame.
    pub pivot_point: [f64; 3],
    /// Root-mean-square residual of the linear system.
    pub rmse: f64,
    /// Numeric rank of the system after thresholding.
    pub rank: usize,
}

impl PivotResult {
    /// The tip offset as a transform with identity rotation.
    pub fn transform(&self) -> RigidTransform {
        RigidTransform::from_translation(self.tip_offset)
    }
}

/// Incremental pivot calibration.
///
/// Every pose `(R, t)` contributes the three rows `[R | -I] * [tip; pivot] = -t`
/// of a linear system. Only the normal equations `A^T A`, `A^T b` and `b^T b`
/// are kept, so memory does not grow with the number of poses.
///
/// See: Feuerstein et al. "Intraoperative Laparoscope Augmentation for Port
/// Placement and Resection Planning", IEEE TMI 27(3), 2008.
#[derive(Debug, Clone, Default)]
pub struct PivotAccumulator {
    ata: [[f64; PIVOT_UNKNOWNS]; PIVOT_UNKNOWNS],
    atb: [f64; PIVOT_UNKNOWNS],
    btb: f64,
    num_poses: usize,
}

impl PivotAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of poses added so far.
    pub fn num_poses(&self) -> usize {
        self.num_poses
    }

    /// Add the constraint rows of one tracked pose.
    pub fn add_pose(&mut self, pose: &RigidTransform) {
        for r in 0..3 {
            let mut a = [0.0; PIVOT_UNKNOWNS];
            a[..3].copy_from_slice(&pose.rotation[r]);
            a[3 + r] = -1.0;
            let b = -pose.translation[r];

            for (i, &a_i) in a.iter().enumerate() {
                self.atb[i] += a_i * b;
                for (j, &a_j) in a.iter().enumerate() {
                    self.ata[i][j] += a_i * a_j;
                }
            }
            self.btb += b * b;
        }
        self.num_poses += 1;
    }

    /// Solve the accumulated system in the least-squares sense.
    ///
    /// The residual is derived from the normal equations and therefore loses
    /// precision when it is small compared to the pose translations. Use
    /// [`pivot_residual`] for an exact value when the poses are still at hand.
    ///
    /// # Errors
    ///
    /// [`CalibError::DegenerateConfiguration`] if the system rank is below 6.
    pub fn solve(&self, params: &PivotParams) -> Result<PivotResult, CalibError> {
        // A^T A is symmetric positive semi-definite: its singular values are
        // the squared singular values of A, with the same singular vectors.
        let svd = linalg::svd(&self.ata);
        let sigma = svd.s.map(f64::sqrt);

        let rank = sigma
            .iter()
            .filter(|&&s| s >= params.rank_threshold)
            .count();

        log::debug!("Pivot singular values: {:?}, rank: {}", sigma, rank);

        if rank < PIVOT_UNKNOWNS {
            return Err(CalibError::DegenerateConfiguration {
                rank,
                required: PIVOT_UNKNOWNS,
            });
        }

        // x = V * diag(1 / s) * U^T * A^T b over the retained directions
        let mut x = [0.0; PIVOT_UNKNOWNS];
        for k in (0..PIVOT_UNKNOWNS).filter(|&k| sigma[k] >= params.rank_threshold) {
            let proj: f64 = (0..PIVOT_UNKNOWNS)
                .map(|i| svd.u[i][k] * self.atb[i])
                .sum();
            let coeff = proj / svd.s[k];
            for (i, x_i) in x.iter_mut().enumerate() {
                *x_i += svd.v[i][k] * coeff;
            }
        }

        // |Ax - b|^2 = x^T A^T A x - 2 x^T A^T b + b^T b
        let mut xt_ata_x = 0.0;
        let mut xt_atb = 0.0;
        for i in 0..PIVOT_UNKNOWNS {
            xt_atb += x[i] * self.atb[i];
            for j in 0..PIVOT_UNKNOWNS {
                xt_ata_x += x[i] * self.ata[i][j] * x[j];
            }
        }
        let sum_sq = (xt_ata_x - 2.0 * xt_atb + self.btb).max(0.0);
        let rmse = (sum_sq / (3 * self.num_poses) as f64).sqrt();

        Ok(PivotResult {
            tip_offset: [x[0], x[1], x[2]],
            pivot_point: [x[3], x[4], x[5]],
            rmse,
            rank,
        })
    }
}

/// Root-mean-square residual of a pivot solution over a pose sequence.
///
/// For each pose the residual is `R * tip + t - pivot`; the mean is taken
/// over all `3 * N` coordinates. An empty sequence gives zero.
pub fn pivot_residual(
    poses: &[RigidTransform],
    tip_offset: &[f64; 3],
    pivot_point: &[f64; 3],
) -> f64 {
    if poses.is_empty() {
        return 0.0;
    }

    let sum_sq: f64 = poses
        .iter()
        .map(|pose| linalg::squared_distance3(&pose.apply(tip_offset), pivot_point))
        .sum();

    (sum_sq / (3 * poses.len()) as f64).sqrt()
}

/// Pivot calibration with the default tolerances.
///
/// See [`calibrate_pivot_with_params`].
pub fn calibrate_pivot(poses: &[RigidTransform]) -> Result<PivotResult, CalibError> {
    calibrate_pivot_with_params(poses, &PivotParams::default())
}

/// Recover the tip offset and the pivot point from poses sampled while the
/// tool tip rests on a fixed point.
///
/// # Arguments
///
/// * `poses` - Tracked body poses, mapping body coordinates to tracker coordinates.
/// * `params` - Pivot tolerances.
///
/// # Errors
///
/// [`CalibError::DegenerateConfiguration`] if the poses do not vary enough in
/// orientation to pin down all six unknowns.
pub fn calibrate_pivot_with_params(
    poses: &[RigidTransform],
    params: &PivotParams,
) -> Result<PivotResult, CalibError> {
    let mut accumulator = PivotAccumulator::new();
    for pose in poses {
        accumulator.add_pose(pose);
    }

    let mut result = accumulator.solve(params)?;
    result.rmse = pivot_residual(poses, &result.tip_offset, &result.pivot_point);

    log::debug!(
        "Pivot calibration: pivot = {:?}, tip = {:?}, residual = {}",
        result.pivot_point,
        result.tip_offset,
        result.rmse
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transforms::axis_angle_to_rotation_matrix;
    use approx::assert_relative_eq;

    const TIP: [f64; 3] = [10.0, -5.0, 150.0];
    const PIVOT: [f64; 3] = [100.0, 200.0, -50.0];

    fn pose_about(axis: &[f64; 3], angle: f64) -> Result<RigidTransform, CalibError> {
        let rotation = axis_angle_to_rotation_matrix(axis, angle)?;
        let r_tip = linalg::mat33_vec3(&rotation, &TIP);
        Ok(RigidTransform::new(
            rotation,
            [PIVOT[0] - r_tip[0], PIVOT[1] - r_tip[1], PIVOT[2] - r_tip[2]],
        ))
    }

    fn pivot_poses() -> Result<Vec<RigidTransform>, CalibError> {
        [
            ([1.0, 0.0, 0.0], 0.5),
            ([0.0, 1.0, 0.0], 0.7),
            ([0.0, 0.0, 1.0], 0.9),
            ([1.0, 1.0, 0.0], -0.6),
            ([0.0, 1.0, 1.0], 0.4),
            ([1.0, 0.0, 1.0], -0.8),
            ([1.0, 1.0, 1.0], 0.3),
            ([1.0, 0.0, 0.0], 0.0),
        ]
        .iter()
        .map(|(axis, angle)| pose_about(axis, *angle))
        .collect()
    }

    #[test]
    fn test_calibrate_pivot() -> Result<(), CalibError> {
        let poses = pivot_poses()?;
        let result = calibrate_pivot(&poses)?;

        for i in 0..3 {
            assert_relative_eq!(result.tip_offset[i], TIP[i], epsilon = 1e-6);
            assert_relative_eq!(result.pivot_point[i], PIVOT[i], epsilon = 1e-6);
        }
        assert!(result.rmse < 1e-6);
        assert_eq!(result.rank, 6);

        let transform = result.transform();
        assert_eq!(transform.rotation, RigidTransform::identity().rotation);
        assert_eq!(transform.translation, result.tip_offset);
        Ok(())
    }

    #[test]
    fn test_accumulator_matches_batch() -> Result<(), CalibError> {
        let poses = pivot_poses()?;
        let mut accumulator = PivotAccumulator::new();
        for pose in &poses {
            accumulator.add_pose(pose);
        }
        assert_eq!(accumulator.num_poses(), poses.len());

        let streamed = accumulator.solve(&PivotParams::default())?;
        let batch = calibrate_pivot(&poses)?;

        for i in 0..3 {
            assert_relative_eq!(streamed.tip_offset[i], batch.tip_offset[i], epsilon = 1e-9);
            assert_relative_eq!(streamed.pivot_point[i], batch.pivot_point[i], epsilon = 1e-9);
        }
        assert!(streamed.rmse < 1e-3);
        Ok(())
    }

    #[test]
    fn test_identical_poses_are_degenerate() -> Result<(), CalibError> {
        let pose = pose_about(&[0.3, 0.2, 1.0], 0.4)?;
        let poses = vec![pose; 10];
        assert_eq!(
            calibrate_pivot(&poses),
            Err(CalibError::DegenerateConfiguration {
                rank: 3,
                required: 6
            })
        );
        Ok(())
    }

    #[test]
    fn test_single_axis_rotation_is_degenerate() -> Result<(), CalibError> {
        // rotating about z only leaves the z component of tip and pivot coupled
        let poses = [0.0, 0.5, 1.0, 1.5, 2.0]
            .iter()
            .map(|&angle| pose_about(&[0.0, 0.0, 1.0], angle))
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(
            calibrate_pivot(&poses),
            Err(CalibError::DegenerateConfiguration {
                rank: 5,
                required: 6
            })
        );
        Ok(())
    }

    #[test]
    fn test_empty_poses_are_degenerate() {
        assert_eq!(
            calibrate_pivot(&[]),
            Err(CalibError::DegenerateConfiguration {
                rank: 0,
                required: 6
            })
        );
    }

    #[test]
    fn test_pivot_residual() {
        let pose = RigidTransform::from_translation([1.0, 0.0, 0.0]);
        // tip maps to (1, 0, 0), pivot claimed at (4, 0, 0): one coordinate off by 3
        let residual = pivot_residual(&[pose], &[0.0; 3], &[4.0, 0.0, 0.0]);
        assert_relative_eq!(residual, 3.0 / 3f64.sqrt(), epsilon = 1e-12);
        assert_eq!(pivot_residual(&[], &[0.0; 3], &[0.0; 3]), 0.0);
    }
}
