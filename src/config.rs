use serde::Serialize;
use serde_json;
use std::fs::File;
use std::path::Path;

#[derive(Serialize)]
pub struct RunConfig {
    pub rotor: RotorConfig,
    pub numerics: NumericsConfig,
    pub run: RunInfo,
}

#[derive(Serialize)]
pub struct RotorConfig {
    pub f_base: f64,
    pub amplitude: f64,
    pub f_osc: f64,
    pub damping: f64,
    pub f_ref: f64,
    pub theta0: f64,
}

#[derive(Serialize)]
pub struct NumericsConfig {
    pub integrator: String,
    pub duration: f64,
    pub dt: f64,
    pub samples: usize,
    pub frame_stride: usize,

    // Optional adaptive-step settings (RK45 only)
    pub max_err: Option<f64>,
    pub headroom: Option<f64>,
    pub dt_min: Option<f64>,
    pub dt_max: Option<f64>,
}

#[derive(Serialize)]
pub struct RunInfo {
    pub binary: String,
    pub run_id: String,

    // Optional provenance (can be filled later)
    pub git_commit: Option<String>,
    pub timestamp_utc: Option<String>,
}

impl RunConfig {
    pub fn write_to_dir(&self, out_dir: &Path) -> std::io::Result<()> {
        let path = out_dir.join("config.json");
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}
