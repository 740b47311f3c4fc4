// src/main.rs
//
// CLI driver for exploratory swing runs: pick a preset, override any
// scalar, and optionally render the rotor animation.
//
// Outputs from this driver are written to `runs/` (or the directory
// specified via `out=`) and are not committed to version control.
//
// Examples:
//
//   cargo run --release -- swing movie
//       -> the default 5 Hz rotor with an undamped 0.5 Hz swing,
//          frames plus an MP4 movie.
//
//   cargo run --release -- damped integrator=rk4 frames=150
//       -> decaying swing, fixed-step RK4, ~150 animation frames.
//
//   cargo run --release -- corotating fref=5 movie fps=50
//       -> rotating-frame view, only the oscillation visible.
//
// Typical outputs (per run directory):
//   runs/<run_id>/
//     ├── config.json
//     ├── trajectory.csv
//     ├── angle_vs_time.png
//     ├── frequency_vs_time.png
//     ├── frames/rotor_*.png
//     └── swing.mp4               (if `movie` is enabled)

use std::env;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use swing_sim::config::{NumericsConfig, RotorConfig, RunConfig, RunInfo};
use swing_sim::integrate::{integrate_on_grid, Method, Rk45Settings};
use swing_sim::params::{Preset, SimConfig};
use swing_sim::visualisation::{
    make_movie_with_ffmpeg, render_frames, save_angle_plot, save_frequency_plot,
};

fn print_usage() {
    eprintln!(
        r#"Usage:
  cargo run -- [swing|damped|corotating] [movie]
             [integrator=euler|rk4|rk45]
             [duration=VAL] [dt=VAL]
             [fbase=VAL] [fref=VAL] [amp=VAL] [fosc=VAL] [damping=VAL] [theta0=VAL]
             [maxerr=VAL] [headroom=VAL] [dtmin=VAL] [dtmax=VAL]
             [frames=N] [fps=N] [out=DIR] [run=RUN_ID]

Notes:
  - trajectory.csv holds one row per grid sample (t, theta, freq).
  - frames=N picks the frame stride so roughly N frames cover the run.
  - If 'movie' is set, frames are stitched into swing.mp4 with ffmpeg.
"#
    );
}

fn sanitize_run_id(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn default_run_id(preset: Preset, method: Method) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| std::time::Duration::from_secs(0));
    let ts = format!("{}{:03}", now.as_secs(), now.subsec_millis());
    format!("{}_{}_{}", ts, preset.as_str(), method.as_str())
}

fn unique_run_dir(out_root: &str, run_id: &str) -> PathBuf {
    let base = PathBuf::from(out_root);
    let mut dir = base.join(run_id);
    if !dir.exists() {
        return dir;
    }
    for k in 1..1000 {
        let cand = base.join(format!("{}_{}", run_id, k));
        if !cand.exists() {
            dir = cand;
            break;
        }
    }
    dir
}

fn main() -> std::io::Result<()> {
    let argv: Vec<String> = env::args().collect();

    let mut preset: Preset = Preset::Swing;
    let mut method: Method = Method::Rk45;
    let mut make_movie_flag = false;

    // Optional overrides
    let mut duration_override: Option<f64> = None;
    let mut dt_override: Option<f64> = None;
    let mut fbase_override: Option<f64> = None;
    let mut fref_override: Option<f64> = None;
    let mut amp_override: Option<f64> = None;
    let mut fosc_override: Option<f64> = None;
    let mut damping_override: Option<f64> = None;
    let mut theta0_override: Option<f64> = None;

    // Adaptive controller overrides
    let mut maxerr_override: Option<f64> = None;
    let mut headroom_override: Option<f64> = None;
    let mut dtmin_override: Option<f64> = None;
    let mut dtmax_override: Option<f64> = None;

    // Output controls
    let mut frames_target: Option<usize> = None;
    let mut fps: u32 = 25;
    let mut out_root_override: Option<String> = None;
    let mut run_id_override: Option<String> = None;

    for arg in argv.iter().skip(1) {
        if arg == "-h" || arg == "--help" || arg == "help" {
            print_usage();
            return Ok(());
        }

        if let Some(p) = Preset::from_arg(arg) {
            preset = p;
            continue;
        }
        if arg == "movie" {
            make_movie_flag = true;
            continue;
        }

        if let Some(v) = arg.strip_prefix("integrator=") {
            method = Method::from_str(v).unwrap_or_else(|| {
                eprintln!("Warning: unknown integrator '{v}', using rk45");
                Method::Rk45
            });
            continue;
        }

        if let Some(v) = arg.strip_prefix("duration=") {
            duration_override = v.parse::<f64>().ok();
            continue;
        }
        if let Some(v) = arg.strip_prefix("dt=") {
            dt_override = v.parse::<f64>().ok();
            continue;
        }
        if let Some(v) = arg.strip_prefix("fbase=") {
            fbase_override = v.parse::<f64>().ok();
            continue;
        }
        if let Some(v) = arg.strip_prefix("fref=") {
            fref_override = v.parse::<f64>().ok();
            continue;
        }
        if let Some(v) = arg.strip_prefix("amp=") {
            amp_override = v.parse::<f64>().ok();
            continue;
        }
        if let Some(v) = arg.strip_prefix("fosc=") {
            fosc_override = v.parse::<f64>().ok();
            continue;
        }
        if let Some(v) = arg.strip_prefix("damping=") {
            damping_override = v.parse::<f64>().ok();
            continue;
        }
        if let Some(v) = arg.strip_prefix("theta0=") {
            theta0_override = v.parse::<f64>().ok();
            continue;
        }

        if let Some(v) = arg.strip_prefix("maxerr=") {
            maxerr_override = v.parse::<f64>().ok();
            continue;
        }
        if let Some(v) = arg.strip_prefix("headroom=") {
            headroom_override = v.parse::<f64>().ok();
            continue;
        }
        if let Some(v) = arg.strip_prefix("dtmin=") {
            dtmin_override = v.parse::<f64>().ok();
            continue;
        }
        if let Some(v) = arg.strip_prefix("dtmax=") {
            dtmax_override = v.parse::<f64>().ok();
            continue;
        }

        if let Some(v) = arg.strip_prefix("frames=") {
            frames_target = v.parse::<usize>().ok();
            continue;
        }
        if let Some(v) = arg.strip_prefix("fps=") {
            fps = v.parse::<u32>().unwrap_or(25);
            continue;
        }
        if let Some(v) = arg.strip_prefix("out=") {
            out_root_override = Some(v.to_string());
            continue;
        }
        if let Some(v) = arg.strip_prefix("run=") {
            run_id_override = Some(v.to_string());
            continue;
        }

        eprintln!("Warning: ignoring unknown argument '{arg}'");
    }

    let mut cfg: SimConfig = SimConfig::new(preset);

    // Apply overrides
    if let Some(v) = duration_override {
        cfg.duration = v;
    }
    if let Some(v) = dt_override {
        cfg.dt = v;
    }
    if let Some(v) = fbase_override {
        cfg.rotor.f_base = v;
    }
    if let Some(v) = fref_override {
        cfg.rotor.f_ref = v;
    }
    if let Some(v) = amp_override {
        cfg.rotor.amplitude = v;
    }
    if let Some(v) = fosc_override {
        cfg.rotor.f_osc = v;
    }
    if let Some(v) = damping_override {
        cfg.rotor.damping = v;
    }
    if let Some(v) = theta0_override {
        cfg.rotor.theta0 = v;
    }

    let grid = match cfg.time_grid() {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let mut settings = Rk45Settings::for_grid(&grid);
    if let Some(v) = maxerr_override {
        settings.max_err = v;
    }
    if let Some(v) = headroom_override {
        settings.headroom = v;
    }
    if let Some(v) = dtmin_override {
        settings.dt_min = v;
    }
    if let Some(v) = dtmax_override {
        settings.dt_max = v;
    }

    // Frame cadence: aim for ~frames_target frames over the whole run.
    let frame_stride = match frames_target {
        Some(target) => {
            let denom = target.saturating_sub(1).max(1);
            ((grid.len() as f64) / (denom as f64)).ceil() as usize
        }
        None => ((grid.len() as f64) / 100.0).ceil() as usize,
    }
    .max(1);

    // -------- output directory setup --------
    let out_root = out_root_override.unwrap_or_else(|| "runs".to_string());
    create_dir_all(&out_root)?;

    let mut run_id = run_id_override.unwrap_or_else(|| default_run_id(preset, method));
    run_id = sanitize_run_id(&run_id);

    let run_dir = unique_run_dir(&out_root, &run_id);
    create_dir_all(&run_dir)?;
    let frames_dir = run_dir.join("frames");
    create_dir_all(&frames_dir)?;

    let ffmpeg_pattern = frames_dir.join("rotor_*.png").to_string_lossy().to_string();

    // -------------------------------------------------
    // Write config.json
    // -------------------------------------------------
    let run_config = RunConfig {
        rotor: RotorConfig {
            f_base: cfg.rotor.f_base,
            amplitude: cfg.rotor.amplitude,
            f_osc: cfg.rotor.f_osc,
            damping: cfg.rotor.damping,
            f_ref: cfg.rotor.f_ref,
            theta0: cfg.rotor.theta0,
        },
        numerics: NumericsConfig {
            integrator: method.as_str().to_string(),
            duration: cfg.duration,
            dt: cfg.dt,
            samples: grid.len(),
            frame_stride,
            max_err: (method == Method::Rk45).then_some(settings.max_err),
            headroom: (method == Method::Rk45).then_some(settings.headroom),
            dt_min: (method == Method::Rk45).then_some(settings.dt_min),
            dt_max: (method == Method::Rk45).then_some(settings.dt_max),
        },
        run: RunInfo {
            binary: "swing-sim".to_string(),
            run_id: run_id.clone(),
            git_commit: None,
            timestamp_utc: None,
        },
    };
    run_config.write_to_dir(&run_dir)?;

    println!("--- swing-sim run config ---");
    println!("run_dir: {}", run_dir.to_string_lossy());
    println!("preset: {}", preset.as_str());
    println!("integrator: {}", method.as_str());
    println!(
        "rotor:  f_base={:.3} Hz  f_ref={:.3} Hz  A={:.3} Hz  f_osc={:.3} Hz  D={:.3} 1/s  theta0={:.3} rad",
        cfg.rotor.f_base,
        cfg.rotor.f_ref,
        cfg.rotor.amplitude,
        cfg.rotor.f_osc,
        cfg.rotor.damping,
        cfg.rotor.theta0
    );
    println!(
        "grid:   duration={:.3} s  dt={:.4} s  samples={}",
        cfg.duration,
        cfg.dt,
        grid.len()
    );
    if method == Method::Rk45 {
        println!(
            "rk45:   MaxErr={} headroom={} dt_min={:.3e} dt_max={:.3e}",
            settings.max_err, settings.headroom, settings.dt_min, settings.dt_max
        );
    }
    println!("run:    frame_stride={} fps={}", frame_stride, fps);
    println!("----------------------------");

    // -------- integrate --------
    let traj = match integrate_on_grid(&cfg.rotor, &grid, method, &settings) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    // CSV output: one row per sample
    let file = File::create(run_dir.join("trajectory.csv"))?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "t,theta,freq")?;
    for i in 0..traj.len() {
        writeln!(
            writer,
            "{:.16e},{:.16e},{:.16e}",
            traj.times[i], traj.angle[i], traj.frequency[i]
        )?;
    }
    writer.flush()?;

    // Full-run plots
    let _ = save_angle_plot(
        &traj.times,
        &traj.angle,
        run_dir.join("angle_vs_time.png").to_str().unwrap(),
    );
    let _ = save_frequency_plot(
        &traj.times,
        &traj.frequency,
        run_dir.join("frequency_vs_time.png").to_str().unwrap(),
    );

    // Animation frames
    match render_frames(&traj, &frames_dir, frame_stride) {
        Ok(n) => println!("Rendered {n} frames."),
        Err(e) => eprintln!("Frame rendering failed: {e}"),
    }

    // Optional movie
    if make_movie_flag {
        let movie_path = run_dir.join("swing.mp4");
        if let Err(e) = make_movie_with_ffmpeg(&ffmpeg_pattern, movie_path.to_str().unwrap(), fps) {
            eprintln!("Could not create movie with ffmpeg: {e}");
        } else {
            println!("Saved movie to {}", movie_path.to_string_lossy());
        }
    } else {
        println!("Movie generation skipped (no 'movie' flag).");
    }

    println!("Done. Outputs in {}", run_dir.to_string_lossy());
    Ok(())
}
