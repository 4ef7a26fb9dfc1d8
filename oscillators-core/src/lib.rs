pub mod buffer;     // Sliding-window sample buffers
pub mod integrator; // Semi-implicit Euler step and energy
pub mod params;     // Per-run parameter set
pub mod series;     // Observed quantities and their buffers
pub mod state;      // Per-run kinematic state and control flag

pub use buffer::{BufferError, Sample, TimeSeriesBuffer};
pub use integrator::{accelerations, forces, step, total_energy};
pub use params::{ParameterError, ParameterSet, DEFAULT_DT, DEFAULT_DURATION, DEFAULT_WINDOW};
pub use series::{Chart, Quantity, SeriesSet};
pub use state::{ControlState, SimulationState};
