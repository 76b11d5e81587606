//! Frame clock: game time in seconds plus a rolling frames-per-second figure

use std::time::{Duration, Instant};

/// Frame durations kept for the FPS average
const FPS_SAMPLES: usize = 10;

/// Monotonic game clock for one session
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last_tick: Instant,
    samples: [Duration; FPS_SAMPLES],
    frames: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(start: Instant) -> Self {
        Self {
            start,
            last_tick: start,
            samples: [Duration::ZERO; FPS_SAMPLES],
            frames: 0,
        }
    }

    /// Start a frame. Returns seconds since the clock was created.
    pub fn tick(&mut self) -> f64 {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> f64 {
        self.samples[(self.frames % FPS_SAMPLES as u64) as usize] = now.duration_since(self.last_tick);
        self.last_tick = now;
        self.frames += 1;
        now.duration_since(self.start).as_secs_f64()
    }

    /// Frames ticked so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Average frame rate over the last few frames
    pub fn fps(&self) -> f64 {
        let count = (self.frames as usize).min(FPS_SAMPLES);
        if count == 0 {
            return 0.0;
        }
        let total: Duration = self.samples[..count].iter().sum();
        if total.is_zero() {
            return 0.0;
        }
        count as f64 / total.as_secs_f64()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_is_monotonic() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let a = clock.tick_at(start + Duration::from_millis(10));
        let b = clock.tick_at(start + Duration::from_millis(30));
        assert!(b > a);
        assert_eq!(b, 0.03);
        assert_eq!(clock.frames(), 2);
    }

    #[test]
    fn test_fps_average() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        assert_eq!(clock.fps(), 0.0);
        for frame in 1..=20u32 {
            clock.tick_at(start + Duration::from_millis(20) * frame);
        }
        assert!((clock.fps() - 50.0).abs() < 1e-9);
    }
}
