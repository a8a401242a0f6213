use crate::scheduler::rolling::RollingTimeDeltaHistory;
use crate::scheduler::stats::RenderingStatsInstrumentation;
use crate::settings::TimingSettings;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Time source for phase measurements.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Current duration estimates, in milliseconds, for debug dumps.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct TimingEstimates {
    pub begin_main_frame_to_commit_estimate_ms: f64,
    pub commit_to_ready_to_activate_estimate_ms: f64,
    pub prepare_tiles_estimate_ms: f64,
    pub activate_estimate_ms: f64,
    pub draw_estimate_ms: f64,
}

/// One scheduler phase: its sample window and the start of the run in flight.
#[derive(Clone, Debug)]
struct Phase {
    name: &'static str,
    history: RollingTimeDeltaHistory,
    started: Option<Instant>,
}

impl Phase {
    fn new(name: &'static str, history_size: usize) -> Self {
        Self {
            name,
            history: RollingTimeDeltaHistory::new(history_size),
            started: None,
        }
    }

    fn start(&mut self, now: Instant) {
        debug_assert!(self.started.is_none(), "{} already in progress", self.name);
        self.started = Some(now);
    }

    fn finish(&mut self, now: Instant) -> Option<Duration> {
        debug_assert!(self.started.is_some(), "{} was never started", self.name);
        let started = self.started.take()?;
        Some(now.saturating_duration_since(started))
    }
}

/// Rolling per-phase durations feeding the frame scheduler's deadline estimates.
///
/// Each phase is bracketed by a `will_*`/`did_*` pair. Samples always reach the stats
/// instrumentation; they only enter the estimation windows while recording is enabled.
#[derive(Debug)]
pub struct CompositorTimingHistory {
    enabled: bool,
    estimation_percentile: f64,
    begin_main_frame_to_commit: Phase,
    commit_to_ready_to_activate: Phase,
    prepare_tiles: Phase,
    activate: Phase,
    draw: Phase,
    clock: Arc<dyn Clock>,
    rendering_stats: Arc<RenderingStatsInstrumentation>,
}

impl CompositorTimingHistory {
    pub fn new(
        settings: &TimingSettings,
        rendering_stats: Arc<RenderingStatsInstrumentation>,
    ) -> Self {
        Self::with_clock(settings, rendering_stats, Arc::new(SystemClock))
    }

    pub fn with_clock(
        settings: &TimingSettings,
        rendering_stats: Arc<RenderingStatsInstrumentation>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let size = settings.duration_history_size;
        Self {
            enabled: false,
            estimation_percentile: settings.estimation_percentile,
            begin_main_frame_to_commit: Phase::new("begin_main_frame_to_commit", size),
            commit_to_ready_to_activate: Phase::new("commit_to_ready_to_activate", size),
            prepare_tiles: Phase::new("prepare_tiles", size),
            activate: Phase::new("activate", size),
            draw: Phase::new("draw", size),
            clock,
            rendering_stats,
        }
    }

    pub fn is_recording_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_recording_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn begin_main_frame_to_commit_duration_estimate(&self) -> Duration {
        self.estimate(&self.begin_main_frame_to_commit)
    }

    pub fn commit_to_ready_to_activate_duration_estimate(&self) -> Duration {
        self.estimate(&self.commit_to_ready_to_activate)
    }

    pub fn prepare_tiles_duration_estimate(&self) -> Duration {
        self.estimate(&self.prepare_tiles)
    }

    pub fn activate_duration_estimate(&self) -> Duration {
        self.estimate(&self.activate)
    }

    pub fn draw_duration_estimate(&self) -> Duration {
        self.estimate(&self.draw)
    }

    pub fn estimates(&self) -> TimingEstimates {
        let ms = |d: Duration| d.as_nanos() as f64 / 1e6;
        TimingEstimates {
            begin_main_frame_to_commit_estimate_ms: ms(
                self.begin_main_frame_to_commit_duration_estimate(),
            ),
            commit_to_ready_to_activate_estimate_ms: ms(
                self.commit_to_ready_to_activate_duration_estimate(),
            ),
            prepare_tiles_estimate_ms: ms(self.prepare_tiles_duration_estimate()),
            activate_estimate_ms: ms(self.activate_duration_estimate()),
            draw_estimate_ms: ms(self.draw_duration_estimate()),
        }
    }

    fn estimate(&self, phase: &Phase) -> Duration {
        phase.history.percentile(self.estimation_percentile)
    }

    pub fn will_begin_main_frame(&mut self) {
        let now = self.clock.now();
        self.begin_main_frame_to_commit.start(now);
    }

    /// The main thread gave up on the frame; closes the begin-main-frame timer like a commit.
    pub fn begin_main_frame_aborted(&mut self) {
        self.did_commit();
    }

    pub fn did_commit(&mut self) {
        let now = self.clock.now();
        let estimate = self.begin_main_frame_to_commit_duration_estimate();
        if let Some(duration) = self.begin_main_frame_to_commit.finish(now) {
            self.rendering_stats
                .add_begin_main_frame_to_commit_duration(duration, estimate);
            self.record(PhaseKind::BeginMainFrameToCommit, duration);
        }
        self.commit_to_ready_to_activate.started = Some(now);
    }

    pub fn will_prepare_tiles(&mut self) {
        let now = self.clock.now();
        self.prepare_tiles.start(now);
    }

    pub fn did_prepare_tiles(&mut self) {
        let now = self.clock.now();
        if let Some(duration) = self.prepare_tiles.finish(now) {
            self.record(PhaseKind::PrepareTiles, duration);
        }
    }

    /// Only the first notification after a commit counts.
    pub fn ready_to_activate(&mut self) {
        let Some(committed) = self.commit_to_ready_to_activate.started.take() else {
            return;
        };
        let duration = self.clock.now().saturating_duration_since(committed);
        let estimate = self.commit_to_ready_to_activate_duration_estimate();
        self.rendering_stats
            .add_commit_to_activate_duration(duration, estimate);
        self.record(PhaseKind::CommitToReadyToActivate, duration);
    }

    pub fn will_activate(&mut self) {
        let now = self.clock.now();
        self.activate.start(now);
    }

    pub fn did_activate(&mut self) {
        let now = self.clock.now();
        if let Some(duration) = self.activate.finish(now) {
            self.record(PhaseKind::Activate, duration);
        }
    }

    pub fn will_draw(&mut self) {
        let now = self.clock.now();
        self.draw.start(now);
    }

    pub fn did_draw(&mut self) {
        let now = self.clock.now();
        let estimate = self.draw_duration_estimate();
        if let Some(duration) = self.draw.finish(now) {
            self.rendering_stats.add_draw_duration(duration, estimate);
            self.record(PhaseKind::Draw, duration);
        }
    }

    fn record(&mut self, kind: PhaseKind, duration: Duration) {
        let phase = match kind {
            PhaseKind::BeginMainFrameToCommit => &mut self.begin_main_frame_to_commit,
            PhaseKind::CommitToReadyToActivate => &mut self.commit_to_ready_to_activate,
            PhaseKind::PrepareTiles => &mut self.prepare_tiles,
            PhaseKind::Activate => &mut self.activate,
            PhaseKind::Draw => &mut self.draw,
        };
        tracing::trace!(
            target: "rasterpile::timing",
            phase = phase.name,
            duration_us = duration.as_micros() as u64,
            recorded = self.enabled,
            "phase sample"
        );
        if self.enabled {
            phase.history.insert_sample(duration);
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum PhaseKind {
    BeginMainFrameToCommit,
    CommitToReadyToActivate,
    PrepareTiles,
    Activate,
    Draw,
}

#[cfg(test)]
#[path = "../../tests/unit/scheduler/timing.rs"]
mod tests;
