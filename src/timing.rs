//! Frame clock, delta time and FPS reporting

use std::time::Instant;

use log::debug;

/// Seconds between FPS reports
pub const STATS_INTERVAL: f32 = 5.0;

/// Monotonic clock measuring seconds since startup
#[derive(Debug, Clone, Copy)]
pub struct SceneClock {
    start: Instant,
}

impl SceneClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Seconds elapsed since [`SceneClock::start`]
    pub fn now(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

impl Default for SceneClock {
    fn default() -> Self {
        Self::start()
    }
}

/// Tracks the previous frame timestamp and the last delta
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameTiming {
    last_frame: f32,
    delta_time: f32,
}

impl FrameTiming {
    /// Records a new frame at `now` and returns the seconds since the last one
    ///
    /// The first frame measures from time zero.
    pub fn tick(&mut self, now: f32) -> f32 {
        self.delta_time = now - self.last_frame;
        self.last_frame = now;
        self.delta_time
    }

    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    pub fn last_frame(&self) -> f32 {
        self.last_frame
    }
}

/// Counts frames and periodically reports the frame rate
#[derive(Debug, Clone)]
pub struct FrameStats {
    interval: f32,
    window_start: Option<f32>,
    frames: u32,
}

impl FrameStats {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            window_start: None,
            frames: 0,
        }
    }

    /// Counts one frame
    ///
    /// # Returns
    /// The average FPS over the window whenever a full interval has passed
    pub fn record(&mut self, now: f32, instance_count: usize) -> Option<f32> {
        let start = *self.window_start.get_or_insert(now);
        self.frames += 1;

        let elapsed = now - start;
        if elapsed < self.interval {
            return None;
        }

        let fps = self.frames as f32 / elapsed;
        debug!("{:.1} fps, {} instances", fps, instance_count);

        self.window_start = Some(now);
        self.frames = 0;
        Some(fps)
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new(STATS_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tick_returns_delta() {
        let mut timing = FrameTiming::default();
        assert_relative_eq!(timing.tick(0.5), 0.5);
        assert_relative_eq!(timing.tick(0.75), 0.25);
        assert_relative_eq!(timing.delta_time(), 0.25);
        assert_relative_eq!(timing.last_frame(), 0.75);
    }

    #[test]
    fn test_stats_report_after_interval() {
        let mut stats = FrameStats::new(1.0);
        assert_eq!(stats.record(0.0, 0), None);
        for frame in 1..10 {
            assert_eq!(stats.record(frame as f32 * 0.1, 0), None);
        }
        let fps = stats.record(1.0, 0).unwrap();
        assert_relative_eq!(fps, 11.0);

        // Window restarts at the report
        assert_eq!(stats.record(1.5, 0), None);
    }

    #[test]
    fn test_clock_is_monotonic() {
        let clock = SceneClock::start();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
        assert!(a >= 0.0);
    }
}
