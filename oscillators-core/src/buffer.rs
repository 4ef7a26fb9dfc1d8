//! Sliding time-window sample buffer backing the live charts.

use std::collections::VecDeque;

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BufferError {
    #[error("sample time {time} does not follow latest time {latest}")]
    NonIncreasingTime { time: f64, latest: f64 },
}

/// One `(time, value)` point of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub time: f64,
    pub value: f64,
}

/// Bounded accumulator that keeps only the trailing `window` of simulation time.
///
/// Times are strictly increasing, so stale samples are always at the front
/// and eviction only ever pops from there (a monotonic queue). Each sample
/// is pushed and popped at most once, which keeps `append` amortized O(1)
/// no matter how long the run has been going.
#[derive(Debug, Clone)]
pub struct TimeSeriesBuffer {
    samples: VecDeque<Sample>,
    window: f64,
}

impl TimeSeriesBuffer {
    pub fn new(window: f64) -> Self {
        Self {
            samples: VecDeque::new(),
            window,
        }
    }

    pub fn window_width(&self) -> f64 {
        self.window
    }

    /// Adds a sample and evicts everything at or before `time - window`.
    ///
    /// The newest sample is never evicted, so the buffer is non-empty after
    /// any successful append.
    pub fn append(&mut self, time: f64, value: f64) -> Result<(), BufferError> {
        if let Some(latest) = self.latest() {
            if time <= latest.time {
                return Err(BufferError::NonIncreasingTime { time, latest: latest.time });
            }
        }
        self.samples.push_back(Sample { time, value });

        let cutoff = time - self.window;
        while self.samples.len() > 1 {
            match self.samples.front() {
                Some(front) if front.time <= cutoff => {
                    self.samples.pop_front();
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Retained samples, oldest first.
    pub fn window(&self) -> impl ExactSizeIterator<Item = &Sample> + '_ {
        self.samples.iter()
    }

    /// Retained samples as plain `[time, value]` points, ready to hand to a plot.
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.samples.iter().map(|s| [s.time, s.value]).collect()
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn oldest(&self) -> Option<&Sample> {
        self.samples.front()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
