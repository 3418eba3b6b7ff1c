#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the calibration routines.
pub mod error;

/// Cross-covariance between corresponding point sets.
pub mod covariance;

/// Fiducial registration error.
pub mod fre;

/// Small fixed-size linear algebra helpers.
pub mod linalg;

/// Pivot calibration of tracked tools.
pub mod pivot;

/// Centroid and translation helpers on point sets.
pub mod points;

/// Rigid point-based registration.
pub mod registration;

/// Rigid transforms and rotation builders.
pub mod transforms;

pub use error::CalibError;
pub use fre::fiducial_registration_error;
pub use pivot::{
    calibrate_pivot, calibrate_pivot_with_params, pivot_residual, PivotAccumulator, PivotParams,
    PivotResult,
};
pub use registration::{
    register_points, register_points_with_params, CalibrationResult, RegistrationParams,
    RotationCase,
};
pub use transforms::RigidTransform;
