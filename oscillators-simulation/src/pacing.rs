//! Wall-clock rate limiting of the tick loop.

use std::time::{Duration, Instant};

use hdrhistogram::Histogram;
use log::{debug, info, warn};
use spin_sleep::SpinSleeper;

/// Summary of how long tick bodies took, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PacingReport {
    pub ticks: u64,
    pub overruns: u64,
    pub p50_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Holds the loop to a target tick rate independent of the simulated `dt`.
///
/// Call [`Pacer::begin_tick`] at the top of each tick and [`Pacer::wait`]
/// at the bottom; `wait` sleeps out whatever is left of the tick budget.
pub struct Pacer {
    tick_duration: Option<Duration>,
    sleeper: SpinSleeper,
    tick_start: Instant,
    work_times: Option<Histogram<u64>>,
    overruns: u64,
}

impl Pacer {
    pub fn new(tick_rate: u32) -> Self {
        let tick_duration = (tick_rate > 0).then(|| Duration::from_secs_f64(1.0 / tick_rate as f64));
        Self {
            tick_duration,
            sleeper: SpinSleeper::default(),
            tick_start: Instant::now(),
            work_times: Histogram::new(3).ok(),
            overruns: 0,
        }
    }

    /// Pacer that never sleeps; ticks run back to back.
    pub fn unpaced() -> Self {
        Self::new(0)
    }

    pub fn tick_duration(&self) -> Option<Duration> {
        self.tick_duration
    }

    pub fn begin_tick(&mut self) {
        self.tick_start = Instant::now();
    }

    /// Records this tick's work time and sleeps until the tick budget is spent.
    pub fn wait(&mut self) {
        let elapsed = self.tick_start.elapsed();
        if let Some(histogram) = self.work_times.as_mut() {
            histogram.saturating_record(elapsed.as_micros() as u64);
        }

        let Some(budget) = self.tick_duration else {
            return;
        };
        if elapsed < budget {
            self.sleeper.sleep(budget - elapsed);
        } else {
            self.overruns += 1;
            warn!(
                "Tick exceeded budget: {:?} > {:?} (lag {:?})",
                elapsed,
                budget,
                elapsed - budget
            );
        }
    }

    pub fn report(&self) -> PacingReport {
        match &self.work_times {
            Some(histogram) if !histogram.is_empty() => PacingReport {
                ticks: histogram.len(),
                overruns: self.overruns,
                p50_us: histogram.value_at_quantile(0.5),
                p99_us: histogram.value_at_quantile(0.99),
                max_us: histogram.max(),
            },
            _ => PacingReport {
                overruns: self.overruns,
                ..PacingReport::default()
            },
        }
    }

    /// Logs the tick-time summary and starts a fresh one.
    pub fn finish_run(&mut self) {
        let report = self.report();
        info!(
            "Pacing: {} ticks, {} over budget, p50 {}us, p99 {}us, max {}us",
            report.ticks, report.overruns, report.p50_us, report.p99_us, report.max_us
        );
        self.reset();
    }

    pub fn reset(&mut self) {
        if let Some(histogram) = self.work_times.as_mut() {
            histogram.reset();
        }
        self.overruns = 0;
        debug!("Pacer reset");
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paced_ticks_take_at_least_the_budget() {
        let mut pacer = Pacer::new(100);
        let start = Instant::now();
        for _ in 0..5 {
            pacer.begin_tick();
            pacer.wait();
        }
        assert!(start.elapsed() >= Duration::from_millis(45));
        assert_eq!(pacer.report().ticks, 5);
    }

    #[test]
    fn unpaced_never_sleeps() {
        let mut pacer = Pacer::unpaced();
        assert_eq!(pacer.tick_duration(), None);
        let start = Instant::now();
        for _ in 0..1000 {
            pacer.begin_tick();
            pacer.wait();
        }
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(pacer.report().overruns, 0);
    }

    #[test]
    fn reset_clears_statistics() {
        let mut pacer = Pacer::unpaced();
        pacer.begin_tick();
        pacer.wait();
        pacer.reset();
        assert_eq!(pacer.report(), PacingReport::default());
    }
}
