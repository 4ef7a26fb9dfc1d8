//! Mutable per-run state and the run-control flag.

use serde::Serialize;

use crate::integrator::accelerations;
use crate::params::ParameterSet;

/// Run-control flag, read once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ControlState {
    #[default]
    Running,
    Paused,
    Terminated,
}

impl ControlState {
    /// Flips Running and Paused. Terminated is sticky.
    pub fn toggled(self) -> Self {
        match self {
            ControlState::Running => ControlState::Paused,
            ControlState::Paused => ControlState::Running,
            ControlState::Terminated => ControlState::Terminated,
        }
    }
}

/// Kinematic state of the three masses at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationState {
    /// Completed integrator steps since run start.
    pub tick: u64,
    /// Elapsed simulation time, `tick * dt`.
    pub t: f64,
    pub x: [f64; 3],
    pub v: [f64; 3],
    pub a: [f64; 3],
    pub control: ControlState,
}

impl SimulationState {
    /// State at `t = 0`, with accelerations evaluated from the initial displacements.
    pub fn initial(params: &ParameterSet) -> Self {
        let x = params.initial_positions;
        Self {
            tick: 0,
            t: 0.0,
            x,
            v: params.initial_velocities,
            a: accelerations(params, &x),
            control: ControlState::Running,
        }
    }

    pub fn is_running(&self) -> bool {
        self.control == ControlState::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_is_an_involution() {
        assert_eq!(ControlState::Running.toggled(), ControlState::Paused);
        assert_eq!(ControlState::Running.toggled().toggled(), ControlState::Running);
        assert_eq!(ControlState::Terminated.toggled(), ControlState::Terminated);
    }

    #[test]
    fn initial_state_copies_conditions() {
        let mut params = ParameterSet::default();
        params.initial_positions = [0.05, 0.0, -0.05];
        params.initial_velocities = [0.0, 0.5, 0.0];

        let state = SimulationState::initial(&params);
        assert_eq!(state.tick, 0);
        assert_eq!(state.t, 0.0);
        assert_eq!(state.x, [0.05, 0.0, -0.05]);
        assert_eq!(state.v, [0.0, 0.5, 0.0]);
        assert!(state.is_running());
        // F1 = -10*0.05 - 5*0.05 = -0.75, a1 = -0.75 / 0.2
        assert!((state.a[0] + 3.75).abs() < 1e-12);
    }
}
