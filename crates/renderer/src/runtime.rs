use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Snapshot of the clock handed to the frame driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// Milliseconds since the source started (or the frozen timestamp).
    pub timestamp_ms: f64,
    /// Monotonic frame counter for the running session.
    pub frame_index: u64,
}

impl TimeSample {
    pub fn new(timestamp_ms: f64, frame_index: u64) -> Self {
        Self {
            timestamp_ms,
            frame_index,
        }
    }
}

/// Abstraction over where frame timestamps originate from.
pub trait TimeSource: Send {
    /// Resets the source to its initial state.
    fn reset(&mut self);
    /// Produces a time sample for the next frame.
    fn sample(&mut self) -> TimeSample;
}

/// Time source backed by the system monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
    frame: u64,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
            frame: 0,
        }
    }
}

impl TimeSource for SystemTimeSource {
    fn reset(&mut self) {
        self.origin = Instant::now();
        self.frame = 0;
    }

    fn sample(&mut self) -> TimeSample {
        let elapsed = self.origin.elapsed();
        let sample = TimeSample::new(elapsed.as_secs_f64() * 1000.0, self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Time source that always reports the same timestamp.
///
/// The frame counter still advances so render stats stay meaningful.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource {
    timestamp_ms: f64,
    frame: u64,
}

impl FixedTimeSource {
    pub fn new(timestamp: Duration) -> Self {
        Self {
            timestamp_ms: timestamp.as_secs_f64() * 1000.0,
            frame: 0,
        }
    }
}

impl TimeSource for FixedTimeSource {
    fn reset(&mut self) {
        self.frame = 0;
    }

    fn sample(&mut self) -> TimeSample {
        let sample = TimeSample::new(self.timestamp_ms, self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Convenient alias for owning time sources behind trait objects.
pub type BoxedTimeSource = Box<dyn TimeSource + Send>;

/// Picks the clock for a run: frozen when a timestamp is given, live otherwise.
pub fn time_source_for(frozen: Option<Duration>) -> BoxedTimeSource {
    match frozen {
        Some(timestamp) => Box::new(FixedTimeSource::new(timestamp)),
        None => Box::new(SystemTimeSource::new()),
    }
}

/// Cancels a running frame loop from any thread.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Decides when the next frame is due.
///
/// Without an FPS cap every opportunity is taken and presentation pacing is
/// left to the surface (vsync). With a cap, frames are spaced by at least
/// `1 / fps`. Once the stop handle fires, or the optional run duration has
/// elapsed, no further frame is ever due.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    interval: Option<Duration>,
    last_frame: Option<Instant>,
    expires_at: Option<Instant>,
    stop: StopHandle,
}

impl FrameScheduler {
    pub fn new(target_fps: Option<f32>, stop: StopHandle) -> Self {
        Self {
            interval: frame_interval(target_fps),
            last_frame: None,
            expires_at: None,
            stop,
        }
    }

    /// Stops the scheduler once `duration` has passed since `now`.
    pub fn stop_after(&mut self, duration: Duration, now: Instant) {
        self.expires_at = Some(now + duration);
    }

    pub fn target_interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// True once the loop should wind down.
    pub fn is_finished(&mut self, now: Instant) -> bool {
        if let Some(expires_at) = self.expires_at {
            if now >= expires_at && !self.stop.is_stopped() {
                tracing::debug!("configured run duration elapsed; stopping");
                self.stop.stop();
            }
        }
        self.stop.is_stopped()
    }

    pub fn ready_for_frame(&mut self, now: Instant) -> bool {
        if self.is_finished(now) {
            return false;
        }
        match (self.last_frame, self.interval) {
            (None, _) | (_, None) => true,
            (Some(last), Some(interval)) => now.saturating_duration_since(last) >= interval,
        }
    }

    /// Instant at which the next capped frame becomes due.
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.stop.is_stopped() {
            return None;
        }
        let frame_deadline = match (self.last_frame, self.interval) {
            (Some(last), Some(interval)) => Some(last + interval),
            _ => None,
        };
        match (frame_deadline, self.expires_at) {
            (Some(frame), Some(expiry)) => Some(frame.min(expiry)),
            (frame, expiry) => frame.or(expiry),
        }
    }

    pub fn mark_rendered(&mut self) {
        self.mark_rendered_at(Instant::now());
    }

    pub fn mark_rendered_at(&mut self, now: Instant) {
        self.last_frame = Some(now);
    }

    pub fn reset(&mut self) {
        self.last_frame = None;
    }
}

fn frame_interval(target_fps: Option<f32>) -> Option<Duration> {
    target_fps
        .filter(|fps| fps.is_finite() && *fps > 0.0)
        .map(|fps| Duration::from_secs_f64(1.0 / f64::from(fps)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_source_never_advances_time() {
        let mut source = FixedTimeSource::new(Duration::from_millis(4500));
        let first = source.sample();
        let second = source.sample();
        assert_eq!(first.timestamp_ms, 4500.0);
        assert_eq!(second.timestamp_ms, 4500.0);
        assert_eq!(second.frame_index, 1);
    }

    #[test]
    fn system_source_is_monotonic() {
        let mut source = SystemTimeSource::new();
        let first = source.sample();
        let second = source.sample();
        assert!(second.timestamp_ms >= first.timestamp_ms);
        assert_eq!(second.frame_index, first.frame_index + 1);
        source.reset();
        assert_eq!(source.sample().frame_index, 0);
    }

    #[test]
    fn time_source_selection_honours_freeze() {
        let mut frozen = time_source_for(Some(Duration::from_secs(2)));
        assert_eq!(frozen.sample().timestamp_ms, 2000.0);
        let mut live = time_source_for(None);
        assert!(live.sample().timestamp_ms < 2000.0);
    }

    #[test]
    fn first_frame_is_due_immediately() {
        let mut scheduler = FrameScheduler::new(Some(30.0), StopHandle::new());
        assert!(scheduler.ready_for_frame(Instant::now()));
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn uncapped_scheduler_is_always_ready() {
        let mut scheduler = FrameScheduler::new(None, StopHandle::new());
        let now = Instant::now();
        scheduler.mark_rendered_at(now);
        assert!(scheduler.ready_for_frame(now));
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn capped_scheduler_waits_for_interval() {
        let mut scheduler = FrameScheduler::new(Some(10.0), StopHandle::new());
        let start = Instant::now();
        scheduler.mark_rendered_at(start);

        assert!(!scheduler.ready_for_frame(start + Duration::from_millis(50)));
        assert_eq!(
            scheduler.next_deadline(),
            Some(start + Duration::from_millis(100))
        );
        assert!(scheduler.ready_for_frame(start + Duration::from_millis(100)));
    }

    #[test]
    fn invalid_caps_are_ignored() {
        for fps in [Some(0.0), Some(-5.0), Some(f32::NAN), Some(f32::INFINITY), None] {
            let scheduler = FrameScheduler::new(fps, StopHandle::new());
            assert_eq!(scheduler.target_interval(), None, "{fps:?}");
        }
    }

    #[test]
    fn stopped_scheduler_is_never_ready() {
        let stop = StopHandle::new();
        let mut scheduler = FrameScheduler::new(None, stop.clone());
        stop.stop();
        assert!(!scheduler.ready_for_frame(Instant::now()));
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn stop_handle_crosses_threads() {
        let stop = StopHandle::new();
        let remote = stop.clone();
        std::thread::spawn(move || remote.stop())
            .join()
            .expect("stop thread");
        assert!(stop.is_stopped());
    }

    #[test]
    fn run_duration_stops_the_loop() {
        let stop = StopHandle::new();
        let mut scheduler = FrameScheduler::new(None, stop.clone());
        let start = Instant::now();
        scheduler.stop_after(Duration::from_secs(1), start);

        assert_eq!(scheduler.next_deadline(), Some(start + Duration::from_secs(1)));
        assert!(scheduler.ready_for_frame(start + Duration::from_millis(999)));
        assert!(!scheduler.ready_for_frame(start + Duration::from_secs(1)));
        assert!(stop.is_stopped());
    }

    #[test]
    fn reset_makes_next_frame_due() {
        let mut scheduler = FrameScheduler::new(Some(1.0), StopHandle::new());
        let now = Instant::now();
        scheduler.mark_rendered_at(now);
        assert!(!scheduler.ready_for_frame(now));
        scheduler.reset();
        assert!(scheduler.ready_for_frame(now));
    }
}
