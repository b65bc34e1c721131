//! Simulation timing.
//!
//! Every engine advances in fixed steps of [`STEP`]. The host converts measured
//! wall-clock time into whole steps with [`FixedTimestep`], so physics tuned
//! per step behaves the same whatever rate the terminal is redrawn at.

use std::time::Duration;

/// Steps per simulated second.
pub const STEPS_PER_SEC: u32 = 60;

/// Length of one simulation step.
pub const STEP: Duration = Duration::from_nanos(1_000_000_000 / STEPS_PER_SEC as u64);

/// One step in milliseconds, for engines that count in ms.
pub const STEP_MS: f32 = 1000.0 / STEPS_PER_SEC as f32;

/// Most steps run for a single frame. A longer stall drops the surplus
/// instead of fast-forwarding through it.
const MAX_STEPS_PER_FRAME: u32 = 5;

/// Converts elapsed wall-clock time into fixed simulation steps.
#[derive(Debug, Clone, Default)]
pub struct FixedTimestep {
    acc: Duration,
}

impl FixedTimestep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed `elapsed` time and get back how many steps to run now.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.acc += elapsed;
        let mut steps = 0;
        while self.acc >= STEP {
            self.acc -= STEP;
            steps += 1;
            if steps == MAX_STEPS_PER_FRAME {
                self.acc = Duration::ZERO;
                break;
            }
        }
        steps
    }

    pub fn reset(&mut self) {
        self.acc = Duration::ZERO;
    }
}

/// Fires once every `period_ms` of simulated time.
#[derive(Debug, Clone)]
pub struct Interval {
    period_ms: f32,
    acc_ms: f32,
}

impl Interval {
    pub fn new(period_ms: f32) -> Self {
        Self {
            period_ms: period_ms.max(STEP_MS),
            acc_ms: 0.0,
        }
    }

    pub fn period_ms(&self) -> f32 {
        self.period_ms
    }

    /// Change the period without losing progress towards the next fire.
    pub fn set_period(&mut self, period_ms: f32) {
        self.period_ms = period_ms.max(STEP_MS);
    }

    /// Advance by one step. Returns true when the period has elapsed.
    pub fn step(&mut self) -> bool {
        self.acc_ms += STEP_MS;
        if self.acc_ms + 1e-3 >= self.period_ms {
            self.acc_ms -= self.period_ms;
            if self.acc_ms < 0.0 {
                self.acc_ms = 0.0;
            }
            true
        } else {
            false
        }
    }
}

/// Counts simulated time while running.
#[derive(Debug, Clone, Default)]
pub struct Stopwatch {
    steps: u64,
    running: bool,
}

impl Stopwatch {
    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn step(&mut self) {
        if self.running {
            self.steps += 1;
        }
    }

    /// Whole seconds elapsed, rounded down.
    pub fn secs(&self) -> u32 {
        (self.steps / STEPS_PER_SEC as u64) as u32
    }

    /// Whole seconds elapsed, rounded up and never zero. Used for best times
    /// so that a sub-second finish still records as 1.
    pub fn secs_ceil(&self) -> u32 {
        let per = STEPS_PER_SEC as u64;
        (self.steps.div_ceil(per)).max(1) as u32
    }
}

/// `mm:ss` for a number of seconds.
pub fn format_mmss(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestep_accumulates_partial_steps() {
        let mut ts = FixedTimestep::new();
        assert_eq!(ts.advance(STEP / 2), 0);
        assert_eq!(ts.advance(STEP / 2 + Duration::from_micros(10)), 1);
        assert_eq!(ts.advance(STEP * 3), 3);
    }

    #[test]
    fn timestep_caps_after_a_stall() {
        let mut ts = FixedTimestep::new();
        assert_eq!(ts.advance(Duration::from_secs(2)), MAX_STEPS_PER_FRAME);
        // Surplus was dropped, not queued.
        assert_eq!(ts.advance(Duration::ZERO), 0);
    }

    #[test]
    fn interval_fires_on_period() {
        let mut iv = Interval::new(STEP_MS * 3.0);
        assert!(!iv.step());
        assert!(!iv.step());
        assert!(iv.step());
        assert!(!iv.step());
    }

    #[test]
    fn interval_never_shorter_than_a_step() {
        let mut iv = Interval::new(1.0);
        assert_eq!(iv.period_ms(), STEP_MS);
        assert!(iv.step());
        assert!(iv.step());
    }

    #[test]
    fn stopwatch_counts_only_while_running() {
        let mut sw = Stopwatch::default();
        sw.step();
        assert_eq!(sw.secs(), 0);
        sw.start();
        for _ in 0..STEPS_PER_SEC * 2 + 1 {
            sw.step();
        }
        sw.stop();
        sw.step();
        assert_eq!(sw.secs(), 2);
        assert_eq!(sw.secs_ceil(), 3);
    }

    #[test]
    fn mmss_formatting() {
        assert_eq!(format_mmss(0), "00:00");
        assert_eq!(format_mmss(125), "02:05");
    }
}
