//! The nine observed quantities and the buffer set that tracks them.

use serde::Serialize;

use crate::buffer::{BufferError, TimeSeriesBuffer};
use crate::state::SimulationState;

/// Position, velocity or acceleration of one of the three masses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Quantity {
    X1,
    X2,
    X3,
    V1,
    V2,
    V3,
    A1,
    A2,
    A3,
}

/// Which chart a quantity is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Chart {
    Positions,
    Velocities,
    Accelerations,
}

impl Chart {
    pub const ALL: [Chart; 3] = [Chart::Positions, Chart::Velocities, Chart::Accelerations];

    pub fn title(self) -> &'static str {
        match self {
            Chart::Positions => "Positions",
            Chart::Velocities => "Velocities",
            Chart::Accelerations => "Accelerations",
        }
    }

    pub fn quantities(self) -> [Quantity; 3] {
        match self {
            Chart::Positions => [Quantity::X1, Quantity::X2, Quantity::X3],
            Chart::Velocities => [Quantity::V1, Quantity::V2, Quantity::V3],
            Chart::Accelerations => [Quantity::A1, Quantity::A2, Quantity::A3],
        }
    }
}

impl Quantity {
    pub const ALL: [Quantity; 9] = [
        Quantity::X1,
        Quantity::X2,
        Quantity::X3,
        Quantity::V1,
        Quantity::V2,
        Quantity::V3,
        Quantity::A1,
        Quantity::A2,
        Quantity::A3,
    ];

    /// Zero-based index of the mass this quantity belongs to.
    pub fn mass_index(self) -> usize {
        self.index() % 3
    }

    pub fn chart(self) -> Chart {
        match self.index() / 3 {
            0 => Chart::Positions,
            1 => Chart::Velocities,
            _ => Chart::Accelerations,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Quantity::X1 => "x1",
            Quantity::X2 => "x2",
            Quantity::X3 => "x3",
            Quantity::V1 => "v1",
            Quantity::V2 => "v2",
            Quantity::V3 => "v3",
            Quantity::A1 => "a1",
            Quantity::A2 => "a2",
            Quantity::A3 => "a3",
        }
    }

    pub fn value_of(self, state: &SimulationState) -> f64 {
        let i = self.mass_index();
        match self.chart() {
            Chart::Positions => state.x[i],
            Chart::Velocities => state.v[i],
            Chart::Accelerations => state.a[i],
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// One [`TimeSeriesBuffer`] per [`Quantity`], all sharing the same window.
#[derive(Debug, Clone)]
pub struct SeriesSet {
    buffers: [TimeSeriesBuffer; 9],
}

impl SeriesSet {
    pub fn new(window: f64) -> Self {
        Self {
            buffers: std::array::from_fn(|_| TimeSeriesBuffer::new(window)),
        }
    }

    /// Appends the state's nine values, stamped with the state's time.
    pub fn record(&mut self, state: &SimulationState) -> Result<(), BufferError> {
        for quantity in Quantity::ALL {
            self.buffers[quantity.index()].append(state.t, quantity.value_of(state))?;
        }
        Ok(())
    }

    pub fn get(&self, quantity: Quantity) -> &TimeSeriesBuffer {
        &self.buffers[quantity.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Quantity, &TimeSeriesBuffer)> + '_ {
        Quantity::ALL.into_iter().map(move |q| (q, self.get(q)))
    }

    pub fn clear(&mut self) {
        for buffer in &mut self.buffers {
            buffer.clear();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.iter().all(TimeSeriesBuffer::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParameterSet;
    use crate::state::ControlState;

    fn state_at(t: f64) -> SimulationState {
        SimulationState {
            tick: 1,
            t,
            x: [1.0, 2.0, 3.0],
            v: [4.0, 5.0, 6.0],
            a: [7.0, 8.0, 9.0],
            control: ControlState::Running,
        }
    }

    #[test]
    fn quantities_map_to_state_fields() {
        let state = state_at(0.5);
        let values: Vec<f64> = Quantity::ALL.iter().map(|q| q.value_of(&state)).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(Quantity::V2.chart(), Chart::Velocities);
        assert_eq!(Quantity::A3.mass_index(), 2);
        assert_eq!(Quantity::X1.label(), "x1");
    }

    #[test]
    fn chart_groups_cover_all_quantities() {
        let grouped: Vec<Quantity> = Chart::ALL.iter().flat_map(|c| c.quantities()).collect();
        assert_eq!(grouped, Quantity::ALL.to_vec());
    }

    #[test]
    fn record_appends_to_every_buffer() {
        let params = ParameterSet::default();
        let mut set = SeriesSet::new(params.window);
        assert!(set.is_empty());

        set.record(&state_at(0.01)).unwrap();
        set.record(&state_at(0.02)).unwrap();
        for (quantity, buffer) in set.iter() {
            assert_eq!(buffer.len(), 2, "{}", quantity.label());
        }
        assert_eq!(set.get(Quantity::A2).latest().unwrap().value, 8.0);

        set.clear();
        assert!(set.is_empty());
    }
}
