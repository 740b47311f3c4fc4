// src/swing.rs
//
// The swing model: a rotor turning at f_base with a damped sinusoidal
// frequency swing on top, observed from a frame rotating at f_ref.
//
//   dθ/dt = 2π · ( f_base − f_ref + A·sin(2π·f_osc·t)·exp(−D·t) )
//
// Damping multiplies only the oscillating term, never the mean offset
// f_base − f_ref. That is the modelled behaviour, not an oversight.

use crate::params::RotorParams;

pub const TWO_PI: f64 = 2.0 * std::f64::consts::PI;

/// Instantaneous mechanical frequency seen from the reference frame (Hz).
#[inline]
pub fn mechanical_frequency(t: f64, p: &RotorParams) -> f64 {
    p.f_base - p.f_ref + p.amplitude * (TWO_PI * p.f_osc * t).sin() * (-p.damping * t).exp()
}

/// Right-hand side of the swing ODE (rad/s).
#[inline]
pub fn dtheta_dt(t: f64, p: &RotorParams) -> f64 {
    TWO_PI * mechanical_frequency(t, p)
}

/// Wrap an angle into [0, 2π).
#[inline]
pub fn wrap_angle(theta: f64) -> f64 {
    let w = theta.rem_euclid(TWO_PI);
    // rem_euclid can round up to exactly 2π for tiny negative inputs
    if w >= TWO_PI { 0.0 } else { w }
}

/// Exact solution of the swing ODE, used as the oracle by the accuracy
/// benchmark and the validation tests.
///
///   θ(t) = θ0 + 2π·(f_base − f_ref)·t + 2π·A·I(t)
///   I(t) = ∫₀ᵗ sin(ω s)·e^(−D s) ds
///        = (ω − e^(−D t)·(D·sin(ω t) + ω·cos(ω t))) / (D² + ω²)
///
/// with ω = 2π·f_osc. The returned angle is unwrapped.
pub fn closed_form_angle(t: f64, p: &RotorParams) -> f64 {
    let omega = TWO_PI * p.f_osc;
    let denom = p.damping * p.damping + omega * omega;
    let forcing_integral = if denom == 0.0 {
        // ω = D = 0: sin(0·s) ≡ 0, nothing to integrate
        0.0
    } else {
        let decay = (-p.damping * t).exp();
        (omega - decay * (p.damping * (omega * t).sin() + omega * (omega * t).cos())) / denom
    };
    p.theta0 + TWO_PI * ((p.f_base - p.f_ref) * t + p.amplitude * forcing_integral)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(amplitude: f64, damping: f64) -> RotorParams {
        RotorParams {
            f_base: 5.0,
            amplitude,
            f_osc: 0.5,
            damping,
            f_ref: 0.0,
            theta0: 0.0,
        }
    }

    #[test]
    fn wrap_stays_in_range() {
        for &theta in &[-10.0, -TWO_PI, -1e-300, 0.0, 1.0, TWO_PI, 123.456] {
            let w = wrap_angle(theta);
            assert!(
                (0.0..TWO_PI).contains(&w),
                "wrap_angle({theta}) = {w} out of [0, 2π)"
            );
        }
    }

    #[test]
    fn closed_form_derivative_matches_rhs() {
        // Central difference of the closed form should reproduce dθ/dt.
        let p = params(0.3, 0.4);
        let h = 1e-6;
        for &t in &[0.1, 0.7, 2.3, 4.9] {
            let numeric = (closed_form_angle(t + h, &p) - closed_form_angle(t - h, &p)) / (2.0 * h);
            let exact = dtheta_dt(t, &p);
            assert!(
                (numeric - exact).abs() < 1e-5,
                "dθ/dt mismatch at t={t}: numeric={numeric}, exact={exact}"
            );
        }
    }

    #[test]
    fn closed_form_starts_at_theta0() {
        let mut p = params(0.3, 0.4);
        p.theta0 = 1.25;
        assert_eq!(closed_form_angle(0.0, &p), 1.25);
    }
}
