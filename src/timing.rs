use std::thread;
use std::time::{Duration, Instant};

/// Caps the frame rate and reports the frame delta in seconds.
pub trait FrameClock {
    fn tick(&mut self, target_fps: u32) -> f64;
}

/// Sleeps out the rest of each frame and reports real elapsed time.
pub struct RealtimeClock {
    last: Instant,
}

impl RealtimeClock {
    pub fn new() -> Self {
        RealtimeClock { last: Instant::now() }
    }
}

impl Default for RealtimeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for RealtimeClock {
    fn tick(&mut self, target_fps: u32) -> f64 {
        let frame = Duration::from_secs_f64(1.0 / target_fps.max(1) as f64);
        let spent = self.last.elapsed();
        if spent < frame {
            thread::sleep(frame - spent);
        }
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f64();
        self.last = now;
        dt
    }
}

/// Exactly one target frame interval per tick, without waiting.
#[derive(Default)]
pub struct FixedStepClock;

impl FrameClock for FixedStepClock {
    fn tick(&mut self, target_fps: u32) -> f64 {
        1.0 / target_fps.max(1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn fixed_step_reports_frame_interval() {
        let mut clock = FixedStepClock;
        assert_relative_eq!(clock.tick(60), 1.0 / 60.0);
        assert_relative_eq!(clock.tick(0), 1.0);
    }

    #[test]
    fn realtime_clock_waits_at_least_one_frame() {
        let mut clock = RealtimeClock::new();
        let dt = clock.tick(200);
        assert!(dt >= 0.005 - 1e-4, "dt was {}", dt);
    }
}
