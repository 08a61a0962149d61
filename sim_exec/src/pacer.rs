//! # Real Time Pacer
//!
//! Holds the simulation loop to real time. Each step sleeps until the next
//! scheduled step instant, computed against the pacer's start instant rather
//! than the previous step, so per-step jitter does not accumulate. A small
//! overhead budget is subtracted from every sleep to cover the cost of the
//! step's own bookkeeping.
//!
//! If a step overruns its slot the pacer returns immediately and makes no
//! attempt to catch up.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::thread;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Pacer keeping a fixed-timestep loop at real time.
pub struct RealTimePacer {
    /// Simulated time advanced per step.
    ///
    /// Units: seconds
    dt_s: f64,

    /// Time subtracted from each sleep to cover loop overheads.
    ///
    /// Units: seconds
    overhead_budget_s: f64,

    start: Instant,

    /// Number of completed steps
    step_count: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RealTimePacer {
    pub fn new(dt_s: f64, overhead_budget_s: f64) -> Self {
        Self {
            dt_s,
            overhead_budget_s,
            start: Instant::now(),
            step_count: 0,
        }
    }

    /// Reset the pacer's clock. Call immediately before entering the loop.
    pub fn start(&mut self) {
        self.start = Instant::now();
        self.step_count = 0;
    }

    /// Mark the end of a step and sleep until the next step is due.
    pub fn wait(&mut self) {
        self.step_count += 1;

        let target_s = self.dt_s * self.step_count as f64;
        let sleep_s = sleep_seconds(target_s, self.elapsed_s(), self.overhead_budget_s);

        if sleep_s > 0.0 {
            thread::sleep(Duration::from_secs_f64(sleep_s));
        }
    }

    /// Simulated time at the current step.
    pub fn sim_time_s(&self) -> f64 {
        self.dt_s * self.step_count as f64
    }

    /// Wall clock time since the pacer was started.
    pub fn elapsed_s(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Time to sleep to reach the target instant, negative when the target has
/// already passed.
fn sleep_seconds(target_s: f64, elapsed_s: f64, overhead_budget_s: f64) -> f64 {
    target_s - elapsed_s - overhead_budget_s
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sleep_seconds() {
        // Ahead of schedule, sleep the remaining slot minus the budget
        assert!((sleep_seconds(0.01, 0.002, 0.001) - 0.007).abs() < 1e-12);

        // Behind schedule, no sleep and no catch-up
        assert!(sleep_seconds(0.01, 0.02, 0.001) < 0.0);

        // Exactly on schedule, the budget pushes the sleep negative
        assert!(sleep_seconds(0.01, 0.01, 0.001) < 0.0);
    }

    #[test]
    fn test_sim_time_advances_by_dt() {
        let mut pacer = RealTimePacer::new(0.01, 0.1);
        pacer.start();

        assert_eq!(pacer.sim_time_s(), 0.0);

        // Overhead budget larger than dt, wait never sleeps
        for _ in 0..3 {
            pacer.wait();
        }

        assert!((pacer.sim_time_s() - 0.03).abs() < 1e-12);
    }
}
