// src/visualisation.rs
//
// Rendering of a finished Trajectory. The renderer only reads the
// sampled arrays; it never reaches into the integrator.
//
// Each animation frame is a 1280x640 canvas: rotor dial on the left,
// frequency and angle time-series panels on the right, drawn up to the
// frame's sample with axes fixed over the whole run so the animation
// does not rescale.

use crate::swing::TWO_PI;
use crate::trajectory::Trajectory;
use plotters::coord::Shift;
use plotters::prelude::*;
use rayon::prelude::*;
use std::io;
use std::path::Path;
use std::process::Command;

/// Pad a y-range so curves do not touch the frame. Guards against
/// non-finite and flat data.
fn padded_range(values: &[f64]) -> (f64, f64) {
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for &v in values {
        if v.is_finite() {
            if v < y_min {
                y_min = v;
            }
            if v > y_max {
                y_max = v;
            }
        }
    }

    if !y_min.is_finite() || !y_max.is_finite() {
        return (-1.0, 1.0);
    }
    if (y_max - y_min).abs() < 1e-12 {
        // all values essentially identical; broaden the window
        let delta = if y_max.abs() < 1e-12 {
            1.0
        } else {
            0.1 * y_max.abs()
        };
        return (y_min - delta, y_max + delta);
    }
    let margin = 0.1 * (y_max - y_min);
    (y_min - margin, y_max + margin)
}

/// Draw one time-series panel up to (and including) sample `upto`.
fn draw_series_panel(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    times: &[f64],
    values: &[f64],
    upto: usize,
    y_range: (f64, f64),
    y_desc: &str,
    color: &RGBColor,
) -> Result<(), Box<dyn std::error::Error>> {
    let t_end = *times.last().unwrap();

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..t_end, y_range.0..y_range.1)?;

    chart
        .configure_mesh()
        .x_desc("time (s)")
        .y_desc(y_desc)
        .label_style(("sans-serif", 13))
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(LineSeries::new(
        times[..=upto]
            .iter()
            .zip(values[..=upto].iter())
            .map(|(&t, &v)| (t, v)),
        color,
    ))?;

    // Current sample marker
    chart.draw_series(std::iter::once(Circle::new(
        (times[upto], values[upto]),
        3,
        color.filled(),
    )))?;

    Ok(())
}

/// Save one animation frame: rotor dial plus frequency/angle panels.
pub fn save_swing_frame(
    traj: &Trajectory,
    index: usize,
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let frame = traj.frame(index);

    let root = BitMapBackend::new(filename, (1280, 640)).into_drawing_area();
    root.fill(&WHITE)?;

    let (dial_area, series_area) = root.split_horizontally(640);
    let (freq_area, angle_area) = series_area.split_vertically(320);

    // ---------- rotor dial ----------
    let mut dial = ChartBuilder::on(&dial_area)
        .margin(20)
        .caption(
            format!("t = {:.2} s,  f = {:+.3} Hz", frame.t, frame.frequency),
            ("sans-serif", 22),
        )
        .build_cartesian_2d(-1.25_f64..1.25, -1.25_f64..1.25)?;

    // Stator ring
    dial.draw_series(std::iter::once(PathElement::new(
        (0..=360)
            .map(|d| {
                let a = (d as f64).to_radians();
                (a.cos(), a.sin())
            })
            .collect::<Vec<_>>(),
        BLACK.stroke_width(2),
    )))?;

    // Reference mark at angle 0
    dial.draw_series(std::iter::once(PathElement::new(
        vec![(1.0, 0.0), (1.12, 0.0)],
        BLACK.stroke_width(2),
    )))?;

    // Rotor: radius line from the shaft to the rim, tip marked.
    // Angle 0 points along +x; positive angles run counter-clockwise.
    let (x, y) = (frame.angle.cos(), frame.angle.sin());
    dial.draw_series(std::iter::once(PathElement::new(
        vec![(0.0, 0.0), (x, y)],
        RED.stroke_width(3),
    )))?;
    dial.draw_series(std::iter::once(Circle::new((x, y), 6, RED.filled())))?;
    dial.draw_series(std::iter::once(Circle::new((0.0, 0.0), 4, BLACK.filled())))?;

    dial.draw_series(std::iter::once(Text::new(
        format!("θ = {:.3} rad", frame.angle),
        (-1.15, -1.15),
        ("sans-serif", 16),
    )))?;

    // ---------- time-series panels ----------
    let freq_range = padded_range(&traj.frequency);
    draw_series_panel(
        &freq_area,
        &traj.times,
        &traj.frequency,
        index,
        freq_range,
        "mechanical frequency (Hz)",
        &BLUE,
    )?;

    // Wrapped angle lives on a known axis; keep it fixed.
    draw_series_panel(
        &angle_area,
        &traj.times,
        &traj.angle,
        index,
        (-0.3, TWO_PI + 0.3),
        "rotor angle (rad)",
        &RED,
    )?;

    root.present()?;
    Ok(())
}

/// Render animation frames for every `stride`-th sample (the last sample
/// is always included). Frames are written as `rotor_NNNNNN.png` under
/// `frames_dir`, numbered consecutively so a glob keeps them in order.
/// Returns the number of frames written. Rendering is parallel across
/// frames; each frame reads the shared trajectory and nothing else.
pub fn render_frames(
    traj: &Trajectory,
    frames_dir: &Path,
    stride: usize,
) -> Result<usize, Box<dyn std::error::Error>> {
    let stride = stride.max(1);
    let n = traj.len();

    let mut indices: Vec<usize> = (0..n).step_by(stride).collect();
    if *indices.last().unwrap() != n - 1 {
        indices.push(n - 1);
    }

    indices
        .par_iter()
        .enumerate()
        .try_for_each(|(frame_no, &sample_idx)| {
            let fname = frames_dir.join(format!("rotor_{frame_no:06}.png"));
            save_swing_frame(traj, sample_idx, fname.to_str().unwrap())
                .map_err(|e| e.to_string())
        })
        .map_err(Box::<dyn std::error::Error>::from)?;

    Ok(indices.len())
}

/// Plot the wrapped rotor angle over the whole run.
pub fn save_angle_plot(
    times: &[f64],
    angle: &[f64],
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if times.is_empty() {
        return Ok(()); // nothing to plot
    }

    let root = BitMapBackend::new(filename, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let t_min = *times.first().unwrap();
    let t_max = *times.last().unwrap();

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption("Rotor angle vs time", ("sans-serif", 30))
        .set_left_and_bottom_label_area_size(60)
        .build_cartesian_2d(t_min..t_max, -0.3..(TWO_PI + 0.3))?;

    chart
        .configure_mesh()
        .x_desc("time (s)")
        .y_desc("θ (rad, wrapped to [0, 2π))")
        .label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()?;

    chart.draw_series(LineSeries::new(
        times.iter().zip(angle.iter()).map(|(&t, &v)| (t, v)),
        &RED,
    ))?;

    root.present()?;
    Ok(())
}

/// Plot the mechanical frequency over the whole run.
pub fn save_frequency_plot(
    times: &[f64],
    frequency: &[f64],
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if times.is_empty() {
        return Ok(());
    }

    let root = BitMapBackend::new(filename, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let t_min = *times.first().unwrap();
    let t_max = *times.last().unwrap();
    let (y_min, y_max) = padded_range(frequency);

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption("Mechanical frequency vs time", ("sans-serif", 30))
        .set_left_and_bottom_label_area_size(60)
        .build_cartesian_2d(t_min..t_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("time (s)")
        .y_desc("f (Hz)")
        .label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()?;

    chart.draw_series(LineSeries::new(
        times.iter().zip(frequency.iter()).map(|(&t, &v)| (t, v)),
        &BLUE,
    ))?;

    root.present()?;
    Ok(())
}

/// Use `ffmpeg` to stitch frames/rotor_*.png into an MP4 movie.
/// Looks for ffmpeg on PATH; set FFMPEG to override.
pub fn make_movie_with_ffmpeg(pattern: &str, output: &str, fps: u32) -> io::Result<()> {
    let ffmpeg = std::env::var("FFMPEG").unwrap_or_else(|_| "ffmpeg".to_string());

    let status = Command::new(ffmpeg)
        .args([
            "-y", // overwrite output if it exists
            "-framerate",
            &fps.to_string(),
            "-pattern_type",
            "glob",
            "-i",
            pattern, // e.g. "frames/rotor_*.png"
            "-pix_fmt",
            "yuv420p",
            output, // e.g. "swing.mp4"
        ])
        .status()?;

    if !status.success() {
        eprintln!("ffmpeg exited with status {:?}", status);
    }

    Ok(())
}
