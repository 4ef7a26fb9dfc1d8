//! Fixed-step semi-implicit Euler integrator for the wall-spring-mass chain.
//!
//! The chain is `wall -k1- m1 -k2- m2 -k3- m3 -k4- wall`, each `x` being the
//! displacement of a mass from its rest position.

use crate::params::ParameterSet;
use crate::state::SimulationState;

/// Restoring force on each mass from the spring network.
pub fn forces(params: &ParameterSet, x: &[f64; 3]) -> [f64; 3] {
    let [k1, k2, k3, k4] = params.springs;
    let [x1, x2, x3] = *x;
    [
        -k1 * x1 - k2 * (x1 - x2),
        -k3 * (x2 - x3) - k2 * (x2 - x1),
        -k3 * (x3 - x2) - k4 * x3,
    ]
}

pub fn accelerations(params: &ParameterSet, x: &[f64; 3]) -> [f64; 3] {
    let f = forces(params, x);
    [
        f[0] / params.masses[0],
        f[1] / params.masses[1],
        f[2] / params.masses[2],
    ]
}

/// Advance the system by one step of `params.dt`.
///
/// Velocities are kicked with the freshly computed accelerations and
/// positions then drift with the *updated* velocities. Swapping that order
/// gives explicit Euler, whose energy grows without bound.
/// The control flag is carried through unchanged.
pub fn step(params: &ParameterSet, state: &SimulationState) -> SimulationState {
    let dt = params.dt;
    let a = accelerations(params, &state.x);

    let mut v = state.v;
    let mut x = state.x;
    for i in 0..3 {
        v[i] += a[i] * dt;
        x[i] += v[i] * dt;
    }

    let tick = state.tick + 1;
    SimulationState {
        tick,
        t: tick as f64 * dt,
        x,
        v,
        a,
        control: state.control,
    }
}

/// Kinetic energy plus the potential stored in all four springs.
pub fn total_energy(params: &ParameterSet, state: &SimulationState) -> f64 {
    let [k1, k2, k3, k4] = params.springs;
    let [x1, x2, x3] = state.x;

    let kinetic: f64 = params
        .masses
        .iter()
        .zip(state.v.iter())
        .map(|(m, v)| 0.5 * m * v * v)
        .sum();
    let potential = 0.5
        * (k1 * x1 * x1
            + k2 * (x2 - x1) * (x2 - x1)
            + k3 * (x3 - x2) * (x3 - x2)
            + k4 * x3 * x3);

    kinetic + potential
}

#[cfg(test)]
mod tests {
    use super::*;

    fn displaced_params() -> ParameterSet {
        let mut params = ParameterSet::default();
        params.initial_positions = [0.1, 0.0, -0.05];
        params.initial_velocities = [0.0, 0.3, 0.0];
        params
    }

    #[test]
    fn rest_state_stays_at_rest() {
        let params = ParameterSet::default();
        let mut state = SimulationState::initial(&params);
        for _ in 0..50 {
            state = step(&params, &state);
        }
        assert_eq!(state.x, [0.0; 3]);
        assert_eq!(state.v, [0.0; 3]);
        assert_eq!(state.tick, 50);
    }

    #[test]
    fn forces_match_spring_network() {
        let params = ParameterSet::default();
        let f = forces(&params, &[0.1, 0.0, 0.0]);
        // Only m1 is displaced: k1 and k2 pull it back, k2 pulls m2 along.
        assert!((f[0] - (-1.0 - 0.5)).abs() < 1e-12);
        assert!((f[1] - 0.5).abs() < 1e-12);
        assert_eq!(f[2], 0.0);
    }

    #[test]
    fn step_uses_updated_velocity_for_position() {
        let params = displaced_params();
        let state = SimulationState::initial(&params);
        let next = step(&params, &state);

        let a = accelerations(&params, &state.x);
        for i in 0..3 {
            let v = state.v[i] + a[i] * params.dt;
            assert_eq!(next.v[i], v);
            assert_eq!(next.x[i], state.x[i] + v * params.dt);
            assert_eq!(next.a[i], a[i]);
        }
        assert_eq!(next.t, params.dt);
    }

    #[test]
    fn step_is_deterministic() {
        let params = displaced_params();
        let state = SimulationState::initial(&params);
        let a = step(&params, &state);
        let b = step(&params, &state);
        assert_eq!(a.x.map(f64::to_bits), b.x.map(f64::to_bits));
        assert_eq!(a.v.map(f64::to_bits), b.v.map(f64::to_bits));
        assert_eq!(a.a.map(f64::to_bits), b.a.map(f64::to_bits));
    }

    #[test]
    fn energy_drift_stays_bounded() {
        let params = displaced_params();
        let mut state = SimulationState::initial(&params);
        let e0 = total_energy(&params, &state);

        let mut max_rel_error: f64 = 0.0;
        for _ in 0..params.tick_limit() * 10 {
            state = step(&params, &state);
            let rel = (total_energy(&params, &state) - e0).abs() / e0;
            max_rel_error = max_rel_error.max(rel);
        }
        // Symplectic Euler oscillates around the true energy with an O(omega * dt)
        // amplitude; for the fastest mode here that stays well under 20%.
        assert!(max_rel_error < 0.2, "energy error {max_rel_error}");
    }
}
