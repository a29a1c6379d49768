//! Frame timing for the tick loop.
//!
//! [`Time`] turns wall-clock frames into the delta handed to
//! [`FrameDriver::tick`](crate::FrameDriver::tick). A fixed delta makes runs
//! reproducible; the delta clamp keeps a stalled frame (window drag, debugger
//! break) from launching particles through the walls.
//!
//! ```ignore
//! let mut time = Time::new().with_max_delta(1.0 / 20.0);
//! loop {
//!     let dt = time.update();
//!     driver.tick(dt)?;
//! }
//! ```

use std::time::{Duration, Instant};

/// Per-frame clock.
#[derive(Debug)]
pub struct Time {
    last_frame: Instant,
    /// Simulated seconds accumulated while unpaused.
    elapsed_secs: f32,
    delta_secs: f32,
    frame_count: u64,
    paused: bool,
    fixed_delta: Option<f32>,
    max_delta: f32,
    fps: f32,
    fps_window_start: Instant,
    fps_window_frames: u64,
}

const FPS_WINDOW: Duration = Duration::from_millis(500);

impl Time {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            paused: false,
            fixed_delta: None,
            max_delta: 0.1,
            fps: 0.0,
            fps_window_start: now,
            fps_window_frames: 0,
        }
    }

    /// Use `delta` for every frame instead of measured time.
    pub fn with_fixed_delta(mut self, delta: Option<f32>) -> Self {
        self.fixed_delta = delta;
        self
    }

    /// Upper bound on a measured delta.
    pub fn with_max_delta(mut self, max_delta: f32) -> Self {
        self.max_delta = max_delta.max(0.0);
        self
    }

    /// Start a new frame and return its delta in seconds (0 while paused).
    pub fn update(&mut self) -> f32 {
        let now = Instant::now();
        let raw = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.delta_secs = if self.paused {
            0.0
        } else {
            self.fixed_delta.unwrap_or(raw.min(self.max_delta))
        };
        self.elapsed_secs += self.delta_secs;
        self.frame_count += 1;

        self.fps_window_frames += 1;
        let window = now.duration_since(self.fps_window_start);
        if window >= FPS_WINDOW {
            self.fps = self.fps_window_frames as f32 / window.as_secs_f32();
            self.fps_window_frames = 0;
            self.fps_window_start = now;
        }

        self.delta_secs
    }

    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Zero the clock without touching pause or delta settings.
    pub fn reset(&mut self) {
        let now = Instant::now();
        self.last_frame = now;
        self.elapsed_secs = 0.0;
        self.delta_secs = 0.0;
        self.frame_count = 0;
        self.fps_window_start = now;
        self.fps_window_frames = 0;
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_time_new() {
        let time = Time::new();
        assert_eq!(time.frame(), 0);
        assert_eq!(time.elapsed(), 0.0);
        assert!(!time.is_paused());
    }

    #[test]
    fn test_fixed_delta() {
        let mut time = Time::new().with_fixed_delta(Some(1.0 / 60.0));
        thread::sleep(Duration::from_millis(20));
        let dt = time.update();
        assert!((dt - 1.0 / 60.0).abs() < 1e-6);
        assert_eq!(time.frame(), 1);
    }

    #[test]
    fn test_delta_is_clamped() {
        let mut time = Time::new().with_max_delta(0.005);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(time.update(), 0.005);
    }

    #[test]
    fn test_pause_freezes_elapsed() {
        let mut time = Time::new().with_fixed_delta(Some(0.1));
        time.update();
        time.toggle_pause();
        assert_eq!(time.update(), 0.0);
        assert!((time.elapsed() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_reset() {
        let mut time = Time::new().with_fixed_delta(Some(0.1));
        time.update();
        time.reset();
        assert_eq!(time.frame(), 0);
        assert_eq!(time.elapsed(), 0.0);
    }
}
