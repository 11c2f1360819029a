//! Time sources and the simulation clock.
//!
//! Every body's phase is derived from one epoch (loop start), never from
//! summed frame deltas, so irregular frame times cannot make bodies drift
//! apart.

use std::cell::Cell;
use std::rc::Rc;

/// Something the frame loop can sample once per tick.
pub trait TimeSource {
    /// Current time in seconds. Only differences are meaningful.
    fn now_seconds(&self) -> f64;
}

/// Time pushed in by the host, e.g. the `requestAnimationFrame` timestamp.
/// Clones share the same cell, so the host keeps one and the loop another.
#[derive(Debug, Clone, Default)]
pub struct HostClock {
    now: Rc<Cell<f64>>,
}

impl HostClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_seconds(&self, seconds: f64) {
        self.now.set(seconds);
    }

    /// Host timestamps are usually milliseconds.
    pub fn set_millis(&self, millis: f64) {
        self.now.set(millis / 1000.0);
    }

    pub fn advance(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds);
    }
}

impl TimeSource for HostClock {
    fn now_seconds(&self) -> f64 {
        self.now.get()
    }
}

/// Wall-clock source for native hosts.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: std::time::Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl TimeSource for MonotonicClock {
    fn now_seconds(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Converts clock time into elapsed tick units since the epoch.
///
/// Runs in real time by default. Pausing and time scaling bank the elapsed
/// time accumulated so far and start a new segment, so the result is still
/// a pure function of (segments, now) and never of frame count.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    epoch: f64,
    ticks_per_second: f64,
    /// Tick units accumulated by closed segments.
    banked: f64,
    segment_start: f64,
    time_scale: f64,
    paused: bool,
}

impl SimulationClock {
    /// Start the clock with `now` as the epoch.
    pub fn start(now: f64, ticks_per_second: f64) -> Self {
        Self {
            epoch: now,
            ticks_per_second,
            banked: 0.0,
            segment_start: now,
            time_scale: 1.0,
            paused: false,
        }
    }

    /// Elapsed tick units at clock time `now`. Non-decreasing in `now`.
    pub fn elapsed(&self, now: f64) -> f64 {
        if self.paused {
            return self.banked;
        }
        let live = (now - self.segment_start).max(0.0);
        self.banked + live * self.time_scale * self.ticks_per_second
    }

    pub fn pause(&mut self, now: f64) {
        if !self.paused {
            self.banked = self.elapsed(now);
            self.paused = true;
        }
    }

    pub fn resume(&mut self, now: f64) {
        if self.paused {
            self.segment_start = now;
            self.paused = false;
        }
    }

    pub fn toggle_pause(&mut self, now: f64) {
        if self.paused {
            self.resume(now);
        } else {
            self.pause(now);
        }
    }

    /// Change simulated speed from `now` on. Negative or non-finite scales are ignored.
    pub fn set_time_scale(&mut self, now: f64, scale: f64) {
        if !(scale.is_finite() && scale >= 0.0) {
            log::warn!("ignoring invalid time scale {scale}");
            return;
        }
        if !self.paused {
            self.banked = self.elapsed(now);
            self.segment_start = now;
        }
        self.time_scale = scale;
    }

    pub fn epoch(&self) -> f64 {
        self.epoch
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_counts_tick_units_from_epoch() {
        let clock = SimulationClock::start(10.0, 60.0);
        assert_eq!(clock.elapsed(10.0), 0.0);
        assert!((clock.elapsed(11.0) - 60.0).abs() < 1e-9);
        assert!((clock.elapsed(12.5) - 150.0).abs() < 1e-9);
    }

    #[test]
    fn irregular_sampling_does_not_drift() {
        let clock = SimulationClock::start(0.0, 60.0);
        // Sampling pattern must not matter; only the final time does.
        let mut last = 0.0;
        for t in [0.016, 0.05, 0.051, 0.3, 0.9, 1.0] {
            last = clock.elapsed(t);
        }
        assert_eq!(last, clock.elapsed(1.0));
    }

    #[test]
    fn clock_running_backwards_never_decreases_elapsed() {
        let clock = SimulationClock::start(5.0, 60.0);
        assert_eq!(clock.elapsed(4.0), 0.0);
    }

    #[test]
    fn pause_freezes_and_resume_continues() {
        let mut clock = SimulationClock::start(0.0, 60.0);
        clock.pause(1.0);
        assert!((clock.elapsed(5.0) - 60.0).abs() < 1e-9);
        clock.resume(5.0);
        assert!((clock.elapsed(6.0) - 120.0).abs() < 1e-9);
    }

    #[test]
    fn time_scale_applies_from_change_point() {
        let mut clock = SimulationClock::start(0.0, 60.0);
        clock.set_time_scale(1.0, 2.0);
        assert!((clock.elapsed(2.0) - 180.0).abs() < 1e-9);
        clock.set_time_scale(2.0, f64::NAN);
        assert_eq!(clock.time_scale(), 2.0);
    }

    #[test]
    fn host_clock_clones_share_time() {
        let host = HostClock::new();
        let loop_side = host.clone();
        host.set_millis(1500.0);
        assert_eq!(loop_side.now_seconds(), 1.5);
        host.advance(0.5);
        assert_eq!(loop_side.now_seconds(), 2.0);
    }
}
