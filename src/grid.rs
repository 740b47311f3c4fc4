// src/grid.rs

use crate::error::SimError;

/// Uniform sampling grid: t_i = i * dt for i = 0..n, from 0 to
/// (approximately) `duration` inclusive.
#[derive(Debug, Clone, Copy)]
pub struct TimeGrid {
    pub dt: f64,
    n: usize,
}

impl TimeGrid {
    /// Build a grid with floor(duration/dt) + 1 points.
    ///
    /// Rejects non-positive duration or step, and steps longer than the
    /// duration. When dt does not divide duration exactly the last point
    /// falls short of `duration`; spacing stays exactly dt throughout.
    pub fn new(duration: f64, dt: f64) -> Result<Self, SimError> {
        if !(duration > 0.0) {
            return Err(SimError::InvalidConfiguration(format!(
                "duration must be positive, got {duration}"
            )));
        }
        if !(dt > 0.0) {
            return Err(SimError::InvalidConfiguration(format!(
                "step size must be positive, got {dt}"
            )));
        }
        if dt > duration {
            return Err(SimError::InvalidConfiguration(format!(
                "step size {dt} exceeds duration {duration}"
            )));
        }

        // Absorb floating-point noise in the ratio so that e.g.
        // 5.0 / 0.01 counts as exactly 500 steps.
        let n_steps = (duration / dt * (1.0 + 1e-9)).floor() as usize;
        Ok(Self { dt, n: n_steps + 1 })
    }

    /// Number of sample points (N).
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Time of the i-th sample.
    #[inline]
    pub fn t(&self, i: usize) -> f64 {
        debug_assert!(i < self.n);
        i as f64 * self.dt
    }

    /// Time of the last sample.
    pub fn t_end(&self) -> f64 {
        self.t(self.n - 1)
    }

    /// All sample times as an owned vector.
    pub fn times(&self) -> Vec<f64> {
        (0..self.n).map(|i| self.t(i)).collect()
    }
}
