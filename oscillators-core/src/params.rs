//! Physical configuration and initial conditions of one run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_DT: f64 = 0.01;
pub const DEFAULT_DURATION: f64 = 10.0;
pub const DEFAULT_WINDOW: f64 = 5.0;

/// Error types for an unusable parameter set. Any of these is fatal to run start.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("mass m{index} must be positive, got {value}")]
    NonPositiveMass { index: usize, value: f64 },

    #[error("spring constant k{index} must be positive, got {value}")]
    NonPositiveSpring { index: usize, value: f64 },

    #[error("{name} must be positive, got {value}")]
    NonPositiveTiming { name: &'static str, value: f64 },

    #[error("{name} must be finite")]
    NonFinite { name: &'static str },
}

/// Immutable snapshot of a run: masses, spring constants, initial state and timing.
///
/// Construct with [`ParameterSet::new`] (or validate a hand-built value with
/// [`ParameterSet::validate`]); the integrator divides by every mass on every step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    pub masses: [f64; 3],
    pub springs: [f64; 4],
    pub initial_positions: [f64; 3],
    pub initial_velocities: [f64; 3],
    pub dt: f64,
    pub t_max: f64,
    pub window: f64,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            masses: [0.2, 0.2, 0.2],
            springs: [10.0, 5.0, 5.0, 10.0],
            initial_positions: [0.0; 3],
            initial_velocities: [0.0; 3],
            dt: DEFAULT_DT,
            t_max: DEFAULT_DURATION,
            window: DEFAULT_WINDOW,
        }
    }
}

impl ParameterSet {
    /// Builds a parameter set with the default timing, rejecting invalid physics.
    pub fn new(
        masses: [f64; 3],
        springs: [f64; 4],
        initial_positions: [f64; 3],
        initial_velocities: [f64; 3],
    ) -> Result<Self, ParameterError> {
        let params = Self {
            masses,
            springs,
            initial_positions,
            initial_velocities,
            ..Self::default()
        };
        params.validate()?;
        Ok(params)
    }

    /// Replaces the timing settings, re-validating the result.
    pub fn with_timing(mut self, dt: f64, t_max: f64, window: f64) -> Result<Self, ParameterError> {
        self.dt = dt;
        self.t_max = t_max;
        self.window = window;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        for (i, &m) in self.masses.iter().enumerate() {
            if !m.is_finite() {
                return Err(ParameterError::NonFinite { name: "mass" });
            }
            if m <= 0.0 {
                return Err(ParameterError::NonPositiveMass { index: i + 1, value: m });
            }
        }
        for (i, &k) in self.springs.iter().enumerate() {
            if !k.is_finite() {
                return Err(ParameterError::NonFinite { name: "spring constant" });
            }
            if k <= 0.0 {
                return Err(ParameterError::NonPositiveSpring { index: i + 1, value: k });
            }
        }
        if self.initial_positions.iter().any(|x| !x.is_finite()) {
            return Err(ParameterError::NonFinite { name: "initial position" });
        }
        if self.initial_velocities.iter().any(|v| !v.is_finite()) {
            return Err(ParameterError::NonFinite { name: "initial velocity" });
        }
        for (name, value) in [("dt", self.dt), ("t_max", self.t_max), ("window", self.window)] {
            if !value.is_finite() {
                return Err(ParameterError::NonFinite { name });
            }
            if value <= 0.0 {
                return Err(ParameterError::NonPositiveTiming { name, value });
            }
        }
        Ok(())
    }

    /// Number of ticks after which the run has reached `t_max`.
    ///
    /// The small tolerance keeps `10.0 / 0.01` at exactly 1000 ticks
    /// instead of rounding up to 1001.
    pub fn tick_limit(&self) -> u64 {
        ((self.t_max / self.dt) - 1e-9).ceil().max(1.0) as u64
    }
}
