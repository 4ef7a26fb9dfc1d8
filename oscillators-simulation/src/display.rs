//! Capability interface to whatever presents the simulation, plus the
//! geometry needed to place masses and springs in a scene.

use std::convert::Infallible;

use glam::DVec3;
use oscillators_core::{Chart, Quantity, SeriesSet, TimeSeriesBuffer};
use serde::Serialize;

/// Positions of the three masses at one tick, ready for a scene renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionSnapshot {
    pub tick: u64,
    pub time: f64,
    /// Absolute x-coordinates, offset from the wall anchors.
    pub positions: [f64; 3],
    /// Springs wall-m1, m1-m2, m2-m3, m3-wall, from the same geometry as `positions`.
    pub springs: [SpringSegment; 4],
}

/// Borrowed view of the nine windowed series at one tick.
#[derive(Debug, Clone, Copy)]
pub struct SeriesSnapshot<'a> {
    pub time: f64,
    series: &'a SeriesSet,
}

impl<'a> SeriesSnapshot<'a> {
    pub fn new(time: f64, series: &'a SeriesSet) -> Self {
        Self { time, series }
    }

    pub fn series(&self, quantity: Quantity) -> &'a TimeSeriesBuffer {
        self.series.get(quantity)
    }

    /// The three curves drawn on `chart`, in mass order.
    pub fn chart(&self, chart: Chart) -> [(Quantity, &'a TimeSeriesBuffer); 3] {
        let series = self.series;
        chart.quantities().map(|q| (q, series.get(q)))
    }
}

/// Presentation layer the controller pushes to once per running tick.
///
/// Implementations only observe; nothing flows back into the simulation.
pub trait Display {
    type Error: std::error::Error;

    /// Removes everything drawn for a previous run.
    fn clear(&mut self) -> Result<(), Self::Error>;

    fn show_positions(&mut self, snapshot: &PositionSnapshot) -> Result<(), Self::Error>;

    fn show_series(&mut self, snapshot: &SeriesSnapshot<'_>) -> Result<(), Self::Error>;
}

/// One spring drawn from `start` along `axis`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpringSegment {
    pub start: DVec3,
    pub axis: DVec3,
}

/// Layout of the scene: walls at `±length/2`, masses at rest every `length/4`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneGeometry {
    pub length: f64,
}

impl Default for SceneGeometry {
    fn default() -> Self {
        Self { length: 0.4 }
    }
}

impl SceneGeometry {
    pub fn spacing(&self) -> f64 {
        self.length / 4.0
    }

    pub fn left_wall(&self) -> DVec3 {
        DVec3::new(-self.length / 2.0, 0.0, 0.0)
    }

    pub fn right_wall(&self) -> DVec3 {
        DVec3::new(self.length / 2.0, 0.0, 0.0)
    }

    /// Absolute x of each mass for the given displacements.
    pub fn absolute_positions(&self, displacements: &[f64; 3]) -> [f64; 3] {
        let left = -self.length / 2.0;
        let dl = self.spacing();
        [
            left + dl + displacements[0],
            left + 2.0 * dl + displacements[1],
            left + 3.0 * dl + displacements[2],
        ]
    }

    /// The four springs wall-m1, m1-m2, m2-m3, m3-wall.
    pub fn springs(&self, positions: &[f64; 3]) -> [SpringSegment; 4] {
        let points = [
            self.left_wall(),
            DVec3::new(positions[0], 0.0, 0.0),
            DVec3::new(positions[1], 0.0, 0.0),
            DVec3::new(positions[2], 0.0, 0.0),
            self.right_wall(),
        ];
        std::array::from_fn(|i| SpringSegment {
            start: points[i],
            axis: points[i + 1] - points[i],
        })
    }
}

/// Display that drops everything, for headless batch runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisplay;

impl Display for NullDisplay {
    type Error = Infallible;

    fn clear(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn show_positions(&mut self, _snapshot: &PositionSnapshot) -> Result<(), Self::Error> {
        Ok(())
    }

    fn show_series(&mut self, _snapshot: &SeriesSnapshot<'_>) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Display that remembers what it was shown. Used to observe a run headlessly.
#[derive(Debug, Default, Clone)]
pub struct RecordingDisplay {
    pub clears: usize,
    pub positions: Vec<PositionSnapshot>,
    pub series_updates: usize,
    /// Retained sample count per quantity at the most recent series update.
    pub last_window_lengths: [usize; 9],
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_positions(&self) -> Option<&PositionSnapshot> {
        self.positions.last()
    }
}

impl Display for RecordingDisplay {
    type Error = Infallible;

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.clears += 1;
        self.positions.clear();
        self.series_updates = 0;
        self.last_window_lengths = [0; 9];
        Ok(())
    }

    fn show_positions(&mut self, snapshot: &PositionSnapshot) -> Result<(), Self::Error> {
        self.positions.push(*snapshot);
        Ok(())
    }

    fn show_series(&mut self, snapshot: &SeriesSnapshot<'_>) -> Result<(), Self::Error> {
        self.series_updates += 1;
        for (i, quantity) in Quantity::ALL.iter().enumerate() {
            self.last_window_lengths[i] = snapshot.series(*quantity).len();
        }
        Ok(())
    }
}
