use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// One measured phase duration next to what was predicted for it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct TimingSample {
    pub duration: Duration,
    pub estimate: Duration,
}

/// Samples collected since the last [`RenderingStatsInstrumentation::take_stats`].
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RenderingStats {
    pub begin_main_frame_to_commit: Vec<TimingSample>,
    pub commit_to_activate: Vec<TimingSample>,
    pub draw: Vec<TimingSample>,
}

impl RenderingStats {
    pub fn is_empty(&self) -> bool {
        self.begin_main_frame_to_commit.is_empty()
            && self.commit_to_activate.is_empty()
            && self.draw.is_empty()
    }
}

/// Sink for per-frame timing shared by the main and compositor threads.
///
/// Nothing is kept unless recording is switched on.
#[derive(Debug, Default)]
pub struct RenderingStatsInstrumentation {
    record_rendering_stats: AtomicBool,
    stats: Mutex<RenderingStats>,
}

impl RenderingStatsInstrumentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_rendering_stats(&self) -> bool {
        self.record_rendering_stats.load(Ordering::Relaxed)
    }

    pub fn set_record_rendering_stats(&self, enabled: bool) {
        self.record_rendering_stats.store(enabled, Ordering::Relaxed);
    }

    pub fn add_begin_main_frame_to_commit_duration(&self, duration: Duration, estimate: Duration) {
        if let Some(mut stats) = self.recording() {
            stats
                .begin_main_frame_to_commit
                .push(TimingSample { duration, estimate });
        }
    }

    pub fn add_commit_to_activate_duration(&self, duration: Duration, estimate: Duration) {
        if let Some(mut stats) = self.recording() {
            stats
                .commit_to_activate
                .push(TimingSample { duration, estimate });
        }
    }

    pub fn add_draw_duration(&self, duration: Duration, estimate: Duration) {
        if let Some(mut stats) = self.recording() {
            stats.draw.push(TimingSample { duration, estimate });
        }
    }

    /// Drain everything recorded so far.
    pub fn take_stats(&self) -> RenderingStats {
        std::mem::take(&mut *self.lock())
    }

    fn recording(&self) -> Option<MutexGuard<'_, RenderingStats>> {
        self.record_rendering_stats().then(|| self.lock())
    }

    // A panic mid-push leaves the vectors consistent, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, RenderingStats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scheduler/stats.rs"]
mod tests;
