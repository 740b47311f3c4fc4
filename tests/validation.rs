// tests/validation.rs
//
// Integration-style validation tests (model and solver sanity checks).
// Run with: cargo test
// Or only these tests: cargo test --test validation

use swing_sim::error::SimError;
use swing_sim::integrate::{integrate, integrate_on_grid, Method, Rk45Settings};
use swing_sim::params::{Preset, RotorParams, SimConfig};
use swing_sim::swing::{closed_form_angle, wrap_angle, TWO_PI};

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

/// Smallest rotation taking wrapped angle `a` onto wrapped angle `b`.
fn angular_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(TWO_PI);
    d.min(TWO_PI - d)
}

fn swing_scenario() -> SimConfig {
    // 5 Hz rotor, undamped 0.5 Hz swing of 0.1 Hz amplitude, 5 s run.
    SimConfig {
        rotor: RotorParams {
            f_base: 5.0,
            amplitude: 0.1,
            f_osc: 0.5,
            damping: 0.0,
            f_ref: 0.0,
            theta0: 0.0,
        },
        duration: 5.0,
        dt: 0.01,
    }
}

#[test]
fn trajectory_lengths_match_grid() {
    let cfg = SimConfig::new(Preset::Damped);
    let grid = cfg.time_grid().unwrap();

    for method in [Method::Euler, Method::Rk4, Method::Rk45] {
        let traj = integrate(&cfg, method).unwrap();
        assert_eq!(traj.len(), grid.len(), "times length ({})", method.as_str());
        assert_eq!(traj.angle.len(), grid.len());
        assert_eq!(traj.frequency.len(), grid.len());
        assert_eq!(traj.times.len(), traj.angle.len());
    }
}

#[test]
fn angle_samples_stay_wrapped() {
    let cfg = SimConfig::new(Preset::Damped);
    let traj = integrate(&cfg, Method::Rk45).unwrap();

    for (i, &theta) in traj.angle.iter().enumerate() {
        assert!(
            (0.0..TWO_PI).contains(&theta),
            "angle[{i}] = {theta} outside [0, 2π)"
        );
    }
}

#[test]
fn zero_amplitude_frequency_is_exactly_the_offset() {
    // With A = 0 and D = 0 the frequency is the bare offset, exactly.
    let cfg = SimConfig {
        rotor: RotorParams {
            f_base: 5.0,
            amplitude: 0.0,
            f_osc: 0.5,
            damping: 0.0,
            f_ref: 2.0,
            theta0: 0.0,
        },
        duration: 5.0,
        dt: 0.01,
    };

    let traj = integrate(&cfg, Method::Rk45).unwrap();
    for (i, &f) in traj.frequency.iter().enumerate() {
        assert_eq!(f, 3.0, "frequency[{i}] should be f_base - f_ref exactly");
    }

    // And the angle is the uniform rotation θ0 + 2π·3·t.
    for (i, &t) in traj.times.iter().enumerate() {
        let expected = wrap_angle(TWO_PI * 3.0 * t);
        assert!(
            angular_distance(traj.angle[i], expected) < 1e-9,
            "angle[{i}] = {} deviates from uniform rotation {expected}",
            traj.angle[i]
        );
    }
}

#[test]
fn corotating_frame_with_no_swing_stays_at_initial_angle() {
    // f_ref = f_base and A = 0: the RHS is identically zero, so the
    // rotor must not move at all (no net rotation, bitwise).
    let cfg = SimConfig {
        rotor: RotorParams {
            f_base: 5.0,
            amplitude: 0.0,
            f_osc: 0.5,
            damping: 0.0,
            f_ref: 5.0,
            theta0: 1.0,
        },
        duration: 5.0,
        dt: 0.01,
    };

    for method in [Method::Euler, Method::Rk4, Method::Rk45] {
        let traj = integrate(&cfg, method).unwrap();
        for (i, &theta) in traj.angle.iter().enumerate() {
            assert_eq!(
                theta, 1.0,
                "angle[{i}] moved off theta0 with zero RHS ({})",
                method.as_str()
            );
        }
    }
}

#[test]
fn swing_scenario_matches_closed_form() {
    let cfg = swing_scenario();
    let grid = cfg.time_grid().unwrap();
    assert_eq!(grid.len(), 501);

    let theta_exact = wrap_angle(closed_form_angle(grid.t_end(), &cfg.rotor));

    // Higher-order methods reproduce the exact solution tightly; Euler
    // is first order, so only a loose bound is meaningful at dt = 0.01.
    for (method, tol) in [
        (Method::Rk45, 1e-6),
        (Method::Rk4, 1e-6),
        (Method::Euler, 1e-3),
    ] {
        let traj = integrate(&cfg, method).unwrap();

        assert_eq!(
            traj.frequency[0], 5.0,
            "frequency[0] should equal f_base at t = 0"
        );

        let theta_final = *traj.angle.last().unwrap();
        let err = angular_distance(theta_final, theta_exact);
        assert!(
            err < tol,
            "{}: final angle {} vs closed form {}, err = {:.3e} (tol {:.0e})",
            method.as_str(),
            theta_final,
            theta_exact,
            err,
            tol
        );
    }
}

#[test]
fn swing_scenario_angle_increases_except_at_wraps() {
    // Frequency stays within 5 ± 0.1 Hz, so the unwrapped angle grows by
    // roughly 0.31 rad per sample. A wrapped sample may only decrease
    // when the previous one sat close to 2π.
    let traj = integrate(&swing_scenario(), Method::Rk45).unwrap();

    for (i, w) in traj.angle.windows(2).enumerate() {
        if w[1] < w[0] {
            assert!(
                w[0] > TWO_PI - 0.4,
                "angle decreased away from the wrap boundary at sample {i}: {} -> {}",
                w[0],
                w[1]
            );
        }
    }
}

#[test]
fn identical_inputs_give_bitwise_identical_trajectories() {
    let cfg = SimConfig::new(Preset::Damped);

    for method in [Method::Euler, Method::Rk4, Method::Rk45] {
        let a = integrate(&cfg, method).unwrap();
        let b = integrate(&cfg, method).unwrap();

        for i in 0..a.len() {
            assert_eq!(a.times[i].to_bits(), b.times[i].to_bits());
            assert_eq!(
                a.angle[i].to_bits(),
                b.angle[i].to_bits(),
                "angle[{i}] differs between identical runs ({})",
                method.as_str()
            );
            assert_eq!(a.frequency[i].to_bits(), b.frequency[i].to_bits());
        }
    }
}

#[test]
fn invalid_configurations_are_rejected_before_integration() {
    let rotor = swing_scenario().rotor;

    let bad = [
        (0.0, 0.01),   // zero duration
        (-1.0, 0.01),  // negative duration
        (5.0, 0.0),    // zero step
        (5.0, -0.01),  // negative step
        (5.0, 10.0),   // step exceeds duration
    ];

    for (duration, dt) in bad {
        let cfg = SimConfig {
            rotor,
            duration,
            dt,
        };
        let err = integrate(&cfg, Method::Rk45).unwrap_err();
        assert!(
            matches!(err, SimError::InvalidConfiguration(_)),
            "duration={duration}, dt={dt} should be InvalidConfiguration, got: {err}"
        );
    }
}

#[test]
fn damped_swing_frequency_decays_inside_envelope() {
    let cfg = SimConfig::new(Preset::Damped);
    let p = cfg.rotor;
    let traj = integrate(&cfg, Method::Rk45).unwrap();

    let offset = p.f_base - p.f_ref;
    for i in 0..traj.len() {
        let dev = (traj.frequency[i] - offset).abs();
        let envelope = p.amplitude * (-p.damping * traj.times[i]).exp();
        assert!(
            dev <= envelope + 1e-12,
            "deviation {dev} escapes envelope {envelope} at t = {}",
            traj.times[i]
        );
    }

    // Late-time deviations must be much smaller than early ones.
    let n = traj.len();
    let early_max = traj.frequency[..n / 4]
        .iter()
        .map(|f| (f - offset).abs())
        .fold(0.0_f64, f64::max);
    let late_max = traj.frequency[3 * n / 4..]
        .iter()
        .map(|f| (f - offset).abs())
        .fold(0.0_f64, f64::max);
    assert!(
        late_max < 0.1 * early_max,
        "swing did not decay: early max {early_max}, late max {late_max}"
    );
}

#[test]
fn fixed_and_adaptive_methods_agree_on_smooth_forcing() {
    let cfg = SimConfig::new(Preset::Damped);
    let grid = cfg.time_grid().unwrap();
    let settings = Rk45Settings::for_grid(&grid);

    let rk4 = integrate_on_grid(&cfg.rotor, &grid, Method::Rk4, &settings).unwrap();
    let rk45 = integrate_on_grid(&cfg.rotor, &grid, Method::Rk45, &settings).unwrap();

    for i in 0..grid.len() {
        let d = angular_distance(rk4.angle[i], rk45.angle[i]);
        assert!(
            d < 1e-6,
            "rk4/rk45 disagree at sample {i}: {} vs {} (d = {:.3e})",
            rk4.angle[i],
            rk45.angle[i],
            d
        );
    }
}

#[test]
fn closed_form_oracle_is_consistent_with_fine_euler() {
    // Cross-check the analytic oracle itself against a brute-force fine
    // Euler integration of the same forcing.
    let p = SimConfig::new(Preset::Damped).rotor;
    let t_end = 3.0;
    let n = 3_000_000;
    let dt = t_end / n as f64;

    let mut theta = p.theta0;
    for i in 0..n {
        let t = i as f64 * dt;
        theta += dt
            * TWO_PI
            * (p.f_base - p.f_ref
                + p.amplitude * (TWO_PI * p.f_osc * t).sin() * (-p.damping * t).exp());
    }

    let exact = closed_form_angle(t_end, &p);
    assert!(
        approx_eq(theta, exact, 1e-4),
        "fine Euler {theta} vs closed form {exact}"
    );
}
