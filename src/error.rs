// src/error.rs

use thiserror::Error;

/// Errors surfaced by the swing integrator.
#[derive(Error, Debug)]
pub enum SimError {
    /// Rejected before any integration starts (no partial result exists).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The solver broke down mid-run; the caller receives no trajectory.
    #[error("numerical failure at t = {t:.6e} s: {reason}")]
    NumericalFailure { t: f64, reason: String },
}
