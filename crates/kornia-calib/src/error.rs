use thiserror::Error;

/// Errors raised by the registration and pivot calibration solvers.
#[derive(Debug, Error, PartialEq)]
pub enum CalibError {
    /// Corresponding point sets must have the same length.
    #[error("The number of fixed points is {fixed} whereas the number of moving points is {moving} and they should correspond")]
    InputSizeMismatch {
        /// Number of fixed points.
        fixed: usize,
        /// Number of moving points.
        moving: usize,
    },

    /// The pivot system has fewer independent constraints than unknowns.
    #[error("Pivot calibration failed: rank {rank} < {required}")]
    DegenerateConfiguration {
        /// Numeric rank found after thresholding.
        rank: usize,
        /// Rank required for a unique solution.
        required: usize,
    },

    /// No proper rotation could be recovered from the cross-covariance.
    #[error("Could not resolve a proper rotation (det = {det}) and no singular value is near zero")]
    UnresolvedRotation {
        /// Determinant of the candidate rotation.
        det: f64,
    },

    /// An axis-angle rotation was requested about a zero-length axis.
    #[error("Cannot compute rotation matrix from a zero vector")]
    InvalidAxis,
}
