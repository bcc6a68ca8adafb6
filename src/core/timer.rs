use std::time::{Duration, Instant};

pub struct Timer {
    start: Instant,
    prev_time: f32,
    elapsed_time: f32,
    delta_time: f32,
    first_tick: bool,
}

impl Timer {
    pub fn new() -> Self {
        let now = Instant::now();

        Timer {
            start: now,
            prev_time: 0.0,
            elapsed_time: 0.0,
            delta_time: 0.0,
            first_tick: true,
        }
    }

    pub fn elapsed_time(&self) -> f32 {
        self.elapsed_time
    }

    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    pub(crate) fn tick(&mut self) {
        self.elapsed_time = Self::duration_as_seconds(&self.start.elapsed());

        // There is no previous frame to measure against on the first tick.
        if self.first_tick {
            self.delta_time = 1.0 / 60.0;
            self.first_tick = false;
        } else {
            self.delta_time = self.elapsed_time - self.prev_time;
        }

        self.prev_time = self.elapsed_time
    }

    fn duration_as_seconds(duration: &Duration) -> f32 {
        duration.as_nanos() as f32 * 1e-9
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

/// Paces the render loop to roughly one monitor refresh interval per frame.
///
/// Frames that overrun their budget are only counted, never caught up on.
pub struct FramePacer {
    interval: Duration,
    skipped_frames: usize,
}

impl FramePacer {
    const FALLBACK_INTERVAL_MS: u64 = 16;

    pub fn new(refresh_rate_hz: Option<u16>) -> Self {
        Self {
            interval: Self::interval_for_refresh_rate(refresh_rate_hz),
            skipped_frames: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn skipped_frames(&self) -> usize {
        self.skipped_frames
    }

    /// Records a finished frame. Returns how long the loop should sleep
    /// before starting the next one.
    pub fn register_frame(&mut self, frame_time: Duration) -> Duration {
        match self.interval.checked_sub(frame_time) {
            Some(remaining) => remaining,
            None => {
                self.skipped_frames += 1;
                Duration::ZERO
            }
        }
    }

    fn interval_for_refresh_rate(refresh_rate_hz: Option<u16>) -> Duration {
        match refresh_rate_hz {
            Some(hz) if hz > 0 => Duration::from_millis((1000.0 / hz as f64).round() as u64),
            _ => Duration::from_millis(Self::FALLBACK_INTERVAL_MS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_follows_display_refresh_rate() {
        assert_eq!(FramePacer::new(Some(60)).interval(), Duration::from_millis(17));
        assert_eq!(FramePacer::new(Some(144)).interval(), Duration::from_millis(7));
    }

    #[test]
    fn unknown_refresh_rate_falls_back_to_16ms() {
        assert_eq!(FramePacer::new(None).interval(), Duration::from_millis(16));
        assert_eq!(FramePacer::new(Some(0)).interval(), Duration::from_millis(16));
    }

    #[test]
    fn overruns_are_counted_not_recovered() {
        let mut pacer = FramePacer::new(Some(60));

        let sleep = pacer.register_frame(Duration::from_millis(2));
        assert_eq!(sleep, Duration::from_millis(15));
        assert_eq!(pacer.skipped_frames(), 0);

        let sleep = pacer.register_frame(Duration::from_millis(40));
        assert_eq!(sleep, Duration::ZERO);
        assert_eq!(pacer.skipped_frames(), 1);

        // The next on-budget frame still gets the full interval.
        let sleep = pacer.register_frame(Duration::from_millis(2));
        assert_eq!(sleep, Duration::from_millis(15));
        assert_eq!(pacer.skipped_frames(), 1);
    }

    #[test]
    fn first_timer_tick_reports_a_nominal_delta() {
        let mut timer = Timer::new();
        timer.tick();
        assert!((timer.delta_time() - 1.0 / 60.0).abs() < 1e-6);
    }
}
