use std::time::{Duration, Instant};

/// Measures the wall clock time between consecutive ticks
#[derive(Debug, Default)]
pub struct FrameClock {
    last_tick: Option<Instant>,
}

impl FrameClock {
    /// Create a new FrameClock, the first tick yields zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the elapsed time since the previous tick in milliseconds
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Same as [`FrameClock::tick`] with an explicit timestamp
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let elapsed = self
            .last_tick
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO);

        self.last_tick = Some(now);

        elapsed.as_secs_f32() * 1000.0
    }

    /// Forget the previous tick
    pub fn reset(&mut self) {
        self.last_tick = None;
    }
}

/// Counts frames over one second windows
#[derive(Debug)]
pub struct FrameCounter {
    start_time: Instant,
    frame_counter: u32,
    last_count: u32,
}

impl Default for FrameCounter {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            frame_counter: 0,
            last_count: 0,
        }
    }
}

impl FrameCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when a one second window closed with this frame
    pub fn count(&mut self) -> bool {
        self.frame_counter += 1;

        if self.start_time.elapsed() < Duration::from_secs(1) {
            return false;
        }

        self.last_count = self.frame_counter;
        self.frame_counter = 0;
        self.start_time = Instant::now();
        true
    }

    pub fn frames_per_sec(&self) -> u32 {
        self.last_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn first_tick_is_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick_at(Instant::now()), 0.0);
    }

    #[test]
    fn ticks_measure_milliseconds() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.tick_at(start);
        let elapsed = clock.tick_at(start + Duration::from_millis(16));
        assert_relative_eq!(elapsed, 16.0, epsilon = 1e-3);
        let elapsed = clock.tick_at(start + Duration::from_millis(40));
        assert_relative_eq!(elapsed, 24.0, epsilon = 1e-3);
    }

    #[test]
    fn reset_restarts_from_zero() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.tick_at(start);
        clock.reset();
        assert_eq!(clock.tick_at(start + Duration::from_secs(5)), 0.0);
    }
}
