// src/params.rs

use crate::error::SimError;
use crate::grid::TimeGrid;

/// Parameters of the rotor swing model (frequencies in mechanical Hz).
#[derive(Debug, Clone, Copy)]
pub struct RotorParams {
    pub f_base: f64,    // steady-state rotor frequency
    pub amplitude: f64, // oscillation amplitude (Hz)
    pub f_osc: f64,     // oscillation frequency (Hz)
    pub damping: f64,   // decay rate of the oscillating term (1/s)
    pub f_ref: f64,     // reference frame speed (Hz)
    pub theta0: f64,    // initial rotor angle (rad)
}

/// Full simulation configuration: rotor model plus time discretisation.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    pub rotor: RotorParams,
    pub duration: f64, // total simulated time (s)
    pub dt: f64,       // sample spacing (s)
}

impl SimConfig {
    pub fn new(preset: Preset) -> Self {
        match preset {
            // Rotor spinning at 5 Hz with a slow undamped swing on top.
            Preset::Swing => SimConfig {
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
            },
            // Same swing, decaying back to steady rotation.
            Preset::Damped => SimConfig {
                rotor: RotorParams {
                    f_base: 5.0,
                    amplitude: 0.5,
                    f_osc: 0.5,
                    damping: 0.6,
                    f_ref: 0.0,
                    theta0: 0.0,
                },
                duration: 10.0,
                dt: 0.01,
            },
            // Observed from a frame locked to f_base: only the swing is visible.
            Preset::Corotating => SimConfig {
                rotor: RotorParams {
                    f_base: 5.0,
                    amplitude: 0.4,
                    f_osc: 0.5,
                    damping: 0.2,
                    f_ref: 5.0,
                    theta0: 0.0,
                },
                duration: 10.0,
                dt: 0.01,
            },
        }
    }

    /// Build the sampling grid for this run. This is where duration/dt
    /// validation happens, before any integration starts.
    pub fn time_grid(&self) -> Result<TimeGrid, SimError> {
        TimeGrid::new(self.duration, self.dt)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        self.time_grid().map(|_| ())
    }
}

/// Named demo parameter sets for the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Swing,
    Damped,
    Corotating,
}

impl Preset {
    pub fn from_arg(s: &str) -> Option<Self> {
        match s {
            "swing" => Some(Self::Swing),
            "damped" => Some(Self::Damped),
            "corotating" | "corot" => Some(Self::Corotating),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Swing => "swing",
            Self::Damped => "damped",
            Self::Corotating => "corotating",
        }
    }
}
