// src/integrate.rs
//
// Numerical integration of the swing ODE over a TimeGrid.
//
// Three methods: explicit Euler and classic RK4 take one fixed step per
// grid interval; RK45 (embedded Dormand–Prince 4(5)) sub-steps inside
// each interval with an accept/reject controller and clamps dt so every
// accepted chain lands exactly on the next sample time. The forcing is
// independent of θ, so the Runge–Kutta stages reduce to evaluations of
// the right-hand side at the tableau nodes.
//
// The frequency series is NOT read back from the solver: it is filled
// pointwise from the closed-form expression, one call per sample.

use crate::error::SimError;
use crate::grid::TimeGrid;
use crate::params::{RotorParams, SimConfig};
use crate::swing::{dtheta_dt, mechanical_frequency, wrap_angle};
use crate::trajectory::Trajectory;

/// Integration method selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Euler,
    Rk4,
    /// Adaptive Dormand–Prince 4(5), the default for runs.
    Rk45,
}

impl Method {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "euler" => Some(Self::Euler),
            "rk4" => Some(Self::Rk4),
            "rk45" | "rk45adaptive" | "rk45-adaptive" => Some(Self::Rk45),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Euler => "euler",
            Self::Rk4 => "rk4",
            Self::Rk45 => "rk45",
        }
    }
}

/// Controller knobs for the adaptive RK45 path.
#[derive(Debug, Clone, Copy)]
pub struct Rk45Settings {
    /// Per-step error tolerance on the angle (rad).
    pub max_err: f64,
    /// Safety factor applied to the proposed step growth.
    pub headroom: f64,
    pub dt_min: f64,
    pub dt_max: f64,
}

impl Rk45Settings {
    /// Defaults scaled to a sampling grid: never step past a sample,
    /// never shrink below a millionth of the sample spacing.
    pub fn for_grid(grid: &TimeGrid) -> Self {
        Self {
            max_err: 1e-8,
            headroom: 0.8,
            dt_min: grid.dt * 1e-6,
            dt_max: grid.dt,
        }
    }
}

/// One explicit Euler step.
#[inline]
fn step_euler(t: f64, theta: f64, dt: f64, p: &RotorParams) -> f64 {
    theta + dt * dtheta_dt(t, p)
}

/// One classic RK4 step. With a θ-independent forcing this is Simpson's
/// rule on the interval, written in the standard four-stage form.
#[inline]
fn step_rk4(t: f64, theta: f64, dt: f64, p: &RotorParams) -> f64 {
    let k1 = dtheta_dt(t, p);
    let k2 = dtheta_dt(t + 0.5 * dt, p);
    let k3 = k2;
    let k4 = dtheta_dt(t + dt, p);
    theta + dt / 6.0 * (k1 + 2.0 * k2 + 2.0 * k3 + k4)
}

// Dormand–Prince nodes and weights (5th-order solution and embedded
// 4th-order weights for the error estimate).
const DP_C: [f64; 7] = [0.0, 0.2, 0.3, 0.8, 8.0 / 9.0, 1.0, 1.0];
const DP_B5: [f64; 7] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
    0.0,
];
const DP_B4: [f64; 7] = [
    5179.0 / 57600.0,
    0.0,
    7571.0 / 16695.0,
    393.0 / 640.0,
    -92097.0 / 339200.0,
    187.0 / 2100.0,
    1.0 / 40.0,
];

/// One Dormand–Prince 4(5) step. Returns the 5th-order angle and the
/// per-step error estimate |θ5 − θ4|.
#[inline]
fn step_rk45(t: f64, theta: f64, dt: f64, p: &RotorParams) -> (f64, f64) {
    let mut k = [0.0_f64; 7];
    for (ki, ci) in k.iter_mut().zip(DP_C.iter()) {
        *ki = dtheta_dt(t + ci * dt, p);
    }

    let mut sum5 = 0.0;
    let mut sum4 = 0.0;
    for i in 0..7 {
        sum5 += DP_B5[i] * k[i];
        sum4 += DP_B4[i] * k[i];
    }

    let theta5 = theta + dt * sum5;
    let eps = (dt * (sum5 - sum4)).abs();
    (theta5, eps)
}

/// Hard cap on attempts per grid interval; tripping it means the
/// controller is thrashing rather than converging.
const MAX_ATTEMPTS_PER_INTERVAL: usize = 10_000;

/// Integrate the swing ODE over `grid`, sampling angle (wrapped into
/// [0, 2π)) and closed-form frequency at every grid point.
///
/// Pure function of its inputs: no shared state, safe to call from any
/// number of threads at once, and two calls with identical inputs
/// produce bit-identical trajectories.
pub fn integrate_on_grid(
    rotor: &RotorParams,
    grid: &TimeGrid,
    method: Method,
    settings: &Rk45Settings,
) -> Result<Trajectory, SimError> {
    let n = grid.len();
    let mut times = Vec::with_capacity(n);
    let mut angle = Vec::with_capacity(n);
    let mut frequency = Vec::with_capacity(n);

    // The solver carries the unwrapped angle; wrapping happens only at
    // sampling time so wrap-around never perturbs the integration.
    let mut theta = rotor.theta0;
    let mut t = 0.0_f64;

    times.push(grid.t(0));
    angle.push(wrap_angle(theta));
    frequency.push(mechanical_frequency(grid.t(0), rotor));

    // Adaptive step size persists across intervals.
    let mut dt_adaptive = grid.dt.min(settings.dt_max);

    for i in 1..n {
        let t_target = grid.t(i);

        match method {
            Method::Euler => {
                theta = step_euler(t, theta, t_target - t, rotor);
            }
            Method::Rk4 => {
                theta = step_rk4(t, theta, t_target - t, rotor);
            }
            Method::Rk45 => {
                let mut attempts = 0;
                // Sub-step until this sample time is reached exactly.
                while t < t_target {
                    attempts += 1;
                    if attempts > MAX_ATTEMPTS_PER_INTERVAL {
                        return Err(SimError::NumericalFailure {
                            t,
                            reason: format!(
                                "step controller did not converge within {MAX_ATTEMPTS_PER_INTERVAL} attempts"
                            ),
                        });
                    }

                    let dt = dt_adaptive.min(t_target - t);
                    let (theta_new, eps) = step_rk45(t, theta, dt, rotor);

                    if !theta_new.is_finite() || !eps.is_finite() {
                        return Err(SimError::NumericalFailure {
                            t,
                            reason: "non-finite state or error estimate".to_string(),
                        });
                    }

                    let at_floor = dt <= settings.dt_min;
                    if eps <= settings.max_err || at_floor {
                        theta = theta_new;
                        t += dt;
                    }

                    // Standard 5th-order step-size update, clamped.
                    let scale = if eps > 0.0 {
                        (settings.headroom * (settings.max_err / eps).powf(0.2)).clamp(0.2, 5.0)
                    } else {
                        5.0
                    };
                    dt_adaptive = (dt * scale).clamp(settings.dt_min, settings.dt_max);
                }
            }
        }

        if !theta.is_finite() {
            return Err(SimError::NumericalFailure {
                t: t_target,
                reason: "non-finite angle".to_string(),
            });
        }

        t = t_target;
        times.push(t_target);
        angle.push(wrap_angle(theta));
        frequency.push(mechanical_frequency(t_target, rotor));
    }

    Ok(Trajectory {
        times,
        angle,
        frequency,
    })
}

/// Convenience entry point: validate the configuration, build its grid
/// and integrate with grid-derived controller settings.
pub fn integrate(cfg: &SimConfig, method: Method) -> Result<Trajectory, SimError> {
    let grid = cfg.time_grid()?;
    let settings = Rk45Settings::for_grid(&grid);
    integrate_on_grid(&cfg.rotor, &grid, method, &settings)
}
