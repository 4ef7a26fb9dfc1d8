//! Run lifecycle: start, the tick loop under pause/terminate control, and
//! the push of every running tick to the display.

use crossbeam_channel::{Receiver, TryRecvError};
use log::{debug, info, warn};
use oscillators_core::{
    step, total_energy, BufferError, ControlState, ParameterError, ParameterSet, Quantity,
    SeriesSet, SimulationState, TimeSeriesBuffer,
};
use thiserror::Error;

use crate::display::{Display, PositionSnapshot, SceneGeometry, SeriesSnapshot};
use crate::pacing::Pacer;

/// Error types returned by the controller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// The parameter set cannot be integrated; the run was not started.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ParameterError),

    #[error("A run is already active")]
    RunAlreadyActive,

    #[error("No run is active")]
    NoActiveRun,

    #[error("Series buffer error: {0}")]
    Buffer(#[from] BufferError),
}

/// Signals raised by the input layer, observed only at tick boundaries.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlSignal {
    TogglePause,
    Terminate,
    Start(ParameterSet),
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Reached `t_max` while running.
    Completed,
    /// Stopped early by a terminate signal.
    Aborted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// State after the last completed tick.
    pub final_state: SimulationState,
    /// Ticks skipped while paused.
    pub paused_ticks: u64,
}

impl RunReport {
    pub fn ticks_run(&self) -> u64 {
        self.final_state.tick
    }
}

/// Result of one pass through the loop body.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Advanced { tick: u64 },
    Paused,
    Finished(RunReport),
}

struct ActiveRun {
    params: ParameterSet,
    state: SimulationState,
    series: SeriesSet,
    initial_energy: f64,
    paused_ticks: u64,
}

/// Owns one run at a time end to end.
///
/// All run-control flags live on the active run rather than in shared
/// globals, so independent controllers never interfere.
pub struct SimulationController<D: Display> {
    display: D,
    geometry: SceneGeometry,
    pacer: Pacer,
    run: Option<ActiveRun>,
}

impl<D: Display> SimulationController<D> {
    pub fn new(display: D) -> Self {
        Self {
            display,
            geometry: SceneGeometry::default(),
            pacer: Pacer::default(),
            run: None,
        }
    }

    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn with_geometry(mut self, geometry: SceneGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Starts a new run. Rejected while another run is active, and rejected
    /// before any state exists if the parameters are invalid.
    pub fn start(&mut self, params: ParameterSet) -> Result<(), SimulationError> {
        if self.run.is_some() {
            warn!("Start request rejected: a run is already active");
            return Err(SimulationError::RunAlreadyActive);
        }
        params.validate()?;

        if let Err(e) = self.display.clear() {
            warn!("Failed to clear display before run: {}", e);
        }

        let state = SimulationState::initial(&params);
        info!(
            "Starting run: m={:?} k={:?} x0={:?} v0={:?} dt={} t_max={} window={}",
            params.masses,
            params.springs,
            params.initial_positions,
            params.initial_velocities,
            params.dt,
            params.t_max,
            params.window
        );
        self.run = Some(ActiveRun {
            params,
            initial_energy: total_energy(&params, &state),
            state,
            series: SeriesSet::new(params.window),
            paused_ticks: 0,
        });
        self.pacer.reset();
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.run.is_some()
    }

    pub fn state(&self) -> Option<&SimulationState> {
        self.run.as_ref().map(|run| &run.state)
    }

    pub fn control(&self) -> Option<ControlState> {
        self.state().map(|state| state.control)
    }

    pub fn params(&self) -> Option<&ParameterSet> {
        self.run.as_ref().map(|run| &run.params)
    }

    pub fn series(&self, quantity: Quantity) -> Option<&TimeSeriesBuffer> {
        self.run.as_ref().map(|run| run.series.get(quantity))
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Flips Running and Paused. Has no effect once terminated or with no run.
    pub fn toggle_pause(&mut self) {
        match self.run.as_mut() {
            Some(run) => {
                run.state.control = run.state.control.toggled();
                info!("Run {:?} at t={:.2}", run.state.control, run.state.t);
            }
            None => debug!("Pause toggle ignored: no active run"),
        }
    }

    /// Requests termination; the loop exits on the next tick boundary.
    pub fn terminate(&mut self) {
        match self.run.as_mut() {
            Some(run) => {
                run.state.control = ControlState::Terminated;
                info!("Terminate requested at t={:.2}", run.state.t);
            }
            None => debug!("Terminate ignored: no active run"),
        }
    }

    pub fn apply(&mut self, signal: ControlSignal) {
        match signal {
            ControlSignal::TogglePause => self.toggle_pause(),
            ControlSignal::Terminate => self.terminate(),
            ControlSignal::Start(params) => {
                // Only reaches a running loop; an idle controller is started by its owner.
                if let Err(e) = self.start(params) {
                    warn!("Ignoring start signal: {}", e);
                }
            }
        }
    }

    /// One pass of the loop body.
    ///
    /// A terminated run ends here without stepping. A paused run is left
    /// untouched. A running run advances one step, records the nine values,
    /// updates the display and ends as completed once it reaches `t_max`.
    pub fn tick(&mut self) -> Result<TickOutcome, SimulationError> {
        let run = self.run.as_mut().ok_or(SimulationError::NoActiveRun)?;

        match run.state.control {
            ControlState::Terminated => Ok(TickOutcome::Finished(self.finish(RunOutcome::Aborted)?)),
            ControlState::Paused => {
                run.paused_ticks += 1;
                Ok(TickOutcome::Paused)
            }
            ControlState::Running => {
                let next = step(&run.params, &run.state);
                run.series.record(&next)?;
                run.state = next;

                let positions = self.geometry.absolute_positions(&run.state.x);
                let snapshot = PositionSnapshot {
                    tick: run.state.tick,
                    time: run.state.t,
                    positions,
                    springs: self.geometry.springs(&positions),
                };
                if let Err(e) = self.display.show_positions(&snapshot) {
                    warn!("Failed to show positions: {}", e);
                }
                if let Err(e) = self.display.show_series(&SeriesSnapshot::new(run.state.t, &run.series)) {
                    warn!("Failed to show series: {}", e);
                }

                let tick = run.state.tick;
                if tick >= run.params.tick_limit() {
                    Ok(TickOutcome::Finished(self.finish(RunOutcome::Completed)?))
                } else {
                    Ok(TickOutcome::Advanced { tick })
                }
            }
        }
    }

    /// Drives the active run to its end under the pacer, draining `signals`
    /// before every tick. When unpaced, a paused run blocks on `signals`
    /// instead of spinning.
    pub fn run(&mut self, signals: &Receiver<ControlSignal>) -> Result<RunReport, SimulationError> {
        if self.run.is_none() {
            return Err(SimulationError::NoActiveRun);
        }

        loop {
            self.pacer.begin_tick();
            self.drain_signals(signals);

            match self.tick()? {
                TickOutcome::Finished(report) => {
                    self.pacer.finish_run();
                    return Ok(report);
                }
                // Without a tick budget nothing would slow the loop down while paused.
                TickOutcome::Paused if self.pacer.tick_duration().is_none() => {
                    self.await_signal(signals);
                    continue;
                }
                _ => {}
            }
            self.pacer.wait();
        }
    }

    /// Blocks until the next signal arrives. A closed channel can never
    /// resume the run, so it terminates it instead.
    fn await_signal(&mut self, signals: &Receiver<ControlSignal>) {
        match signals.recv() {
            Ok(signal) => self.apply(signal),
            Err(_) => {
                warn!("Control channel closed while paused, terminating run");
                self.terminate();
            }
        }
    }

    fn drain_signals(&mut self, signals: &Receiver<ControlSignal>) {
        loop {
            match signals.try_recv() {
                Ok(signal) => self.apply(signal),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!("Control channel disconnected");
                    break;
                }
            }
        }
    }

    fn finish(&mut self, outcome: RunOutcome) -> Result<RunReport, SimulationError> {
        let run = self.run.take().ok_or(SimulationError::NoActiveRun)?;

        if outcome == RunOutcome::Aborted {
            if let Err(e) = self.display.clear() {
                warn!("Failed to clear display after abort: {}", e);
            }
        }

        let energy = total_energy(&run.params, &run.state);
        debug!(
            "Energy drift over run: {:.3e} (from {:.6} to {:.6})",
            energy - run.initial_energy,
            run.initial_energy,
            energy
        );
        info!(
            "Run {:?} at t={:.2} after {} ticks ({} paused)",
            outcome, run.state.t, run.state.tick, run.paused_ticks
        );

        Ok(RunReport {
            outcome,
            final_state: run.state,
            paused_ticks: run.paused_ticks,
        })
    }
}
