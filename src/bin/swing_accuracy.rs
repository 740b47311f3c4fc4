// src/bin/swing_accuracy.rs
//
// Step-size accuracy benchmark: integrate a damped swing with each
// method over a sweep of sample spacings and compare the final angle
// against the closed-form solution.
//
// Run:
//   cargo run --release --bin swing_accuracy
//
// Output:
//   out/swing_accuracy/accuracy.csv   (dt, method, abs_err)

use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use swing_sim::grid::TimeGrid;
use swing_sim::integrate::{integrate_on_grid, Method, Rk45Settings};
use swing_sim::params::RotorParams;
use swing_sim::swing::{closed_form_angle, wrap_angle, TWO_PI};

/// Smallest rotation taking wrapped angle `a` onto wrapped angle `b`.
fn angular_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(TWO_PI);
    d.min(TWO_PI - d)
}

fn main() -> std::io::Result<()> {
    let rotor = RotorParams {
        f_base: 5.0,
        amplitude: 0.5,
        f_osc: 0.5,
        damping: 0.6,
        f_ref: 0.0,
        theta0: 0.0,
    };
    let duration = 5.0;
    let dts = [0.1, 0.05, 0.02, 0.01, 0.005, 0.002, 0.001];
    let methods = [Method::Euler, Method::Rk4, Method::Rk45];

    let out_dir = Path::new("out").join("swing_accuracy");
    create_dir_all(&out_dir)?;

    let file = File::create(out_dir.join("accuracy.csv"))?;
    let mut w = BufWriter::new(file);
    writeln!(w, "dt,method,abs_err")?;

    println!("damped swing, duration = {duration} s");
    println!("{:>8}  {:>6}  {:>12}", "dt", "method", "abs_err (rad)");

    for &dt in &dts {
        let grid = TimeGrid::new(duration, dt).expect("benchmark grid is valid");
        let settings = Rk45Settings::for_grid(&grid);
        let theta_exact = wrap_angle(closed_form_angle(grid.t_end(), &rotor));

        for &method in &methods {
            let traj =
                integrate_on_grid(&rotor, &grid, method, &settings).expect("integration succeeds");
            let theta_final = *traj.angle.last().unwrap();
            let err = angular_distance(theta_final, theta_exact);

            writeln!(w, "{:.6e},{},{:.16e}", dt, method.as_str(), err)?;
            println!("{:>8.4}  {:>6}  {:>12.3e}", dt, method.as_str(), err);
        }
    }

    println!("Wrote {}", out_dir.join("accuracy.csv").to_string_lossy());
    Ok(())
}
