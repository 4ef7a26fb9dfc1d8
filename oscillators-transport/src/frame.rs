//! Wire frames describing what a viewer should draw.

use oscillators_core::Chart;
use oscillators_simulation::{SeriesSnapshot, SpringSegment};
use serde::Serialize;

/// One output line.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Frame {
    /// Drop everything drawn for the previous run.
    Clear,
    Scene(SceneFrame),
    Charts(ChartFrame),
}

/// Walls, masses and springs at one tick.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SceneFrame {
    pub tick: u64,
    pub time: f64,
    /// Absolute x of each mass.
    pub masses: [f64; 3],
    pub springs: [SpringSegment; 4],
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Curve {
    pub label: &'static str,
    pub points: Vec<[f64; 2]>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChartData {
    pub title: &'static str,
    pub curves: Vec<Curve>,
}

/// The three charts (positions, velocities, accelerations) over the trailing window.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChartFrame {
    pub time: f64,
    pub charts: Vec<ChartData>,
}

impl ChartFrame {
    pub fn from_snapshot(snapshot: &SeriesSnapshot<'_>) -> Self {
        let charts = Chart::ALL
            .iter()
            .map(|&chart| ChartData {
                title: chart.title(),
                curves: snapshot
                    .chart(chart)
                    .iter()
                    .map(|(quantity, buffer)| Curve {
                        label: quantity.label(),
                        points: buffer.points(),
                    })
                    .collect(),
            })
            .collect();
        Self {
            time: snapshot.time,
            charts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oscillators_core::{ControlState, SeriesSet, SimulationState};

    #[test]
    fn chart_frame_groups_curves_by_chart() {
        let mut series = SeriesSet::new(5.0);
        for tick in 1..=3u64 {
            series
                .record(&SimulationState {
                    tick,
                    t: tick as f64 * 0.01,
                    x: [1.0, 2.0, 3.0],
                    v: [4.0, 5.0, 6.0],
                    a: [7.0, 8.0, 9.0],
                    control: ControlState::Running,
                })
                .unwrap();
        }

        let frame = ChartFrame::from_snapshot(&SeriesSnapshot::new(0.03, &series));
        assert_eq!(frame.charts.len(), 3);
        assert_eq!(frame.charts[1].title, "Velocities");

        let labels: Vec<&str> = frame.charts[2].curves.iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["a1", "a2", "a3"]);
        assert_eq!(frame.charts[0].curves[2].points.len(), 3);
        assert_eq!(frame.charts[0].curves[2].points[0], [0.01, 3.0]);
    }
}
