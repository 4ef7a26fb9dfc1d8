//! Run control for the three-mass oscillator chain.
//!
//! [`SimulationController`] owns one run at a time: it advances the
//! integrator once per tick, keeps the nine windowed series, and pushes
//! every running tick to a [`Display`]. Pause and terminate are flags on
//! the active run, read at tick boundaries only.

pub mod controller;
pub mod display;
pub mod pacing;

pub use controller::{
    ControlSignal, RunOutcome, RunReport, SimulationController, SimulationError, TickOutcome,
};
pub use display::{
    Display, NullDisplay, PositionSnapshot, RecordingDisplay, SceneGeometry, SeriesSnapshot,
    SpringSegment,
};
pub use pacing::{Pacer, PacingReport};
