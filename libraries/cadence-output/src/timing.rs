//! Track timing and the about-to-finish edge

/// Knows the total time of the track currently queued for playback
///
/// Consulted when the backend has not reported a duration yet.
#[cfg_attr(test, mockall::automock)]
pub trait TrackTimeSource: Send + Sync {
    /// Total time of the current track in milliseconds, 0 when unknown
    fn current_track_total_time(&self) -> i64;
}

#[derive(Debug, Clone)]
pub(crate) struct Timing {
    current: i64,
    total: i64,
    seekable: bool,
    about_to_finish: bool,
    threshold: i64,
}

impl Timing {
    pub fn new(threshold: i64) -> Self {
        Self {
            current: 0,
            total: 0,
            seekable: true,
            about_to_finish: false,
            threshold,
        }
    }

    /// Fresh binding: zero times, assumed seekable
    pub fn reset(&mut self) {
        self.current = 0;
        self.total = 0;
        self.seekable = true;
        self.about_to_finish = false;
    }

    pub fn current(&self) -> i64 {
        self.current
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn seekable(&self) -> bool {
        self.seekable
    }

    pub fn about_to_finish(&self) -> bool {
        self.about_to_finish
    }

    /// Take the duration the backend reported when the media was bound
    ///
    /// Stored as is, -1 included.
    pub fn cache_total(&mut self, total: i64) {
        self.total = total;
        self.seekable = true;
    }

    /// Record the playback position
    ///
    /// Returns true on the rising edge of about-to-finish. The flag re-arms
    /// once the position moves back out of the threshold window.
    pub fn set_current(&mut self, time: i64, fallback: Option<&dyn TrackTimeSource>) -> bool {
        if self.total == 0 {
            if let Some(source) = fallback {
                self.total = source.current_track_total_time();
                self.seekable = true;
            }
        }

        self.current = time;

        let mut total = self.total;
        if total <= 0 {
            if let Some(source) = fallback {
                total = source.current_track_total_time();
            }
        }

        let window_start = total.saturating_sub(self.threshold);
        if time < window_start {
            self.about_to_finish = false;
        }

        if !self.about_to_finish && total > 0 && time >= window_start {
            self.about_to_finish = true;
            return true;
        }

        false
    }

    /// Record a reported duration
    ///
    /// Returns true when a positive duration was stored. A non-positive one
    /// only clears seekability and keeps the previous total.
    pub fn set_total(&mut self, time: i64) -> bool {
        if time <= 0 {
            self.seekable = false;
            return false;
        }
        self.total = time;
        self.seekable = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_timing_is_seekable() {
        let timing = Timing::new(2000);
        assert!(timing.seekable());
        assert_eq!(timing.total(), 0);
    }

    #[test]
    fn fallback_total_triggers_about_to_finish() {
        let mut source = MockTrackTimeSource::new();
        source
            .expect_current_track_total_time()
            .times(1)
            .return_const(180_000i64);

        let mut timing = Timing::new(2000);
        assert!(timing.set_current(178_500, Some(&source)));
        assert_eq!(timing.total(), 180_000);
        assert!(timing.seekable());
        assert!(timing.about_to_finish());
    }

    #[test]
    fn about_to_finish_fires_once_per_approach() {
        let mut timing = Timing::new(2000);
        assert!(timing.set_total(10_000));

        assert!(!timing.set_current(7_000, None));
        assert!(timing.set_current(8_000, None));
        assert!(!timing.set_current(9_000, None));
        assert!(!timing.set_current(9_900, None));

        // Seeking back re-arms the edge
        assert!(!timing.set_current(1_000, None));
        assert!(!timing.about_to_finish());
        assert!(timing.set_current(8_500, None));
    }

    #[test]
    fn unknown_total_never_fires() {
        let mut source = MockTrackTimeSource::new();
        source.expect_current_track_total_time().return_const(0i64);

        let mut timing = Timing::new(2000);
        assert!(!timing.set_current(0, Some(&source)));
        assert!(!timing.set_current(5_000, Some(&source)));
        assert!(!timing.about_to_finish());
    }

    #[test]
    fn fallback_consulted_while_backend_duration_unknown() {
        let mut source = MockTrackTimeSource::new();
        source.expect_current_track_total_time().return_const(60_000i64);

        let mut timing = Timing::new(2000);
        timing.cache_total(-1);
        assert!(timing.set_current(59_000, Some(&source)));
        assert_eq!(timing.total(), -1);
    }

    #[test]
    fn non_positive_total_keeps_previous_value() {
        let mut timing = Timing::new(2000);
        assert!(timing.set_total(240_000));
        assert!(!timing.set_total(0));

        assert_eq!(timing.total(), 240_000);
        assert!(!timing.seekable());
    }

    #[test]
    fn reset_zeroes_times_and_assumes_seekable() {
        let mut timing = Timing::new(2000);
        timing.set_total(5_000);
        timing.set_current(4_000, None);
        timing.reset();

        assert_eq!(timing.current(), 0);
        assert_eq!(timing.total(), 0);
        assert!(timing.seekable());
        assert!(!timing.about_to_finish());
    }
}
