use super::*;
use crate::scheduler::TimingSample;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

struct Fixture {
    clock: Arc<ManualClock>,
    stats: Arc<RenderingStatsInstrumentation>,
    history: CompositorTimingHistory,
}

fn fixture() -> Fixture {
    let clock = Arc::new(ManualClock::new());
    let stats = Arc::new(RenderingStatsInstrumentation::new());
    let history = CompositorTimingHistory::with_clock(
        &TimingSettings::default(),
        Arc::clone(&stats),
        Arc::clone(&clock) as Arc<dyn Clock>,
    );
    Fixture {
        clock,
        stats,
        history,
    }
}

#[test]
fn estimates_start_at_zero() {
    let f = fixture();
    assert!(!f.history.is_recording_enabled());
    assert_eq!(f.history.estimates(), TimingEstimates::default());
}

#[test]
fn samples_only_count_while_enabled() {
    let mut f = fixture();
    f.history.will_draw();
    f.clock.advance(ms(4));
    f.history.did_draw();
    assert_eq!(f.history.draw_duration_estimate(), Duration::ZERO);

    f.history.set_recording_enabled(true);
    f.history.will_draw();
    f.clock.advance(ms(6));
    f.history.did_draw();
    assert_eq!(f.history.draw_duration_estimate(), ms(6));
}

#[test]
fn full_frame_fills_every_phase() {
    let mut f = fixture();
    f.history.set_recording_enabled(true);

    f.history.will_begin_main_frame();
    f.clock.advance(ms(1));
    f.history.did_commit();
    f.clock.advance(ms(2));
    f.history.will_prepare_tiles();
    f.clock.advance(ms(3));
    f.history.did_prepare_tiles();
    f.clock.advance(ms(4));
    f.history.ready_to_activate();
    f.history.will_activate();
    f.clock.advance(ms(5));
    f.history.did_activate();
    f.history.will_draw();
    f.clock.advance(ms(6));
    f.history.did_draw();

    assert_eq!(f.history.begin_main_frame_to_commit_duration_estimate(), ms(1));
    assert_eq!(f.history.commit_to_ready_to_activate_duration_estimate(), ms(9));
    assert_eq!(f.history.prepare_tiles_duration_estimate(), ms(3));
    assert_eq!(f.history.activate_duration_estimate(), ms(5));
    assert_eq!(f.history.draw_duration_estimate(), ms(6));
    assert_eq!(f.history.estimates().draw_estimate_ms, 6.0);
}

#[test]
fn abort_closes_the_begin_main_frame_timer() {
    let mut f = fixture();
    f.history.set_recording_enabled(true);
    f.history.will_begin_main_frame();
    f.clock.advance(ms(7));
    f.history.begin_main_frame_aborted();
    assert_eq!(f.history.begin_main_frame_to_commit_duration_estimate(), ms(7));

    // A new frame may begin right away.
    f.history.will_begin_main_frame();
    f.clock.advance(ms(3));
    f.history.did_commit();
    assert_eq!(f.history.begin_main_frame_to_commit_duration_estimate(), ms(7));
}

#[test]
fn ready_to_activate_without_commit_is_ignored() {
    let mut f = fixture();
    f.history.set_recording_enabled(true);
    f.history.ready_to_activate();
    assert_eq!(f.history.commit_to_ready_to_activate_duration_estimate(), Duration::ZERO);

    f.history.will_begin_main_frame();
    f.history.did_commit();
    f.clock.advance(ms(8));
    f.history.ready_to_activate();
    f.clock.advance(ms(100));
    f.history.ready_to_activate();
    assert_eq!(f.history.commit_to_ready_to_activate_duration_estimate(), ms(8));
}

#[test]
fn estimate_is_ninetieth_percentile() {
    let mut f = fixture();
    f.history.set_recording_enabled(true);
    for d in 1..=10 {
        f.history.will_draw();
        f.clock.advance(ms(d));
        f.history.did_draw();
    }
    assert_eq!(f.history.draw_duration_estimate(), ms(9));
}

#[test]
fn window_size_comes_from_settings() {
    let clock = Arc::new(ManualClock::new());
    let settings = TimingSettings {
        duration_history_size: 2,
        estimation_percentile: 100.0,
    };
    let mut history = CompositorTimingHistory::with_clock(
        &settings,
        Arc::new(RenderingStatsInstrumentation::new()),
        Arc::clone(&clock) as Arc<dyn Clock>,
    );
    history.set_recording_enabled(true);
    for d in [50, 1, 2] {
        history.will_activate();
        clock.advance(ms(d));
        history.did_activate();
    }
    assert_eq!(history.activate_duration_estimate(), ms(2));
}

#[test]
fn reports_to_rendering_stats_with_prior_estimate() {
    let mut f = fixture();
    f.stats.set_record_rendering_stats(true);
    f.history.set_recording_enabled(true);

    for d in [4, 10] {
        f.history.will_draw();
        f.clock.advance(ms(d));
        f.history.did_draw();
    }
    f.history.will_begin_main_frame();
    f.clock.advance(ms(2));
    f.history.did_commit();
    f.history.ready_to_activate();

    let stats = f.stats.take_stats();
    assert_eq!(
        stats.draw,
        vec![
            TimingSample {
                duration: ms(4),
                estimate: Duration::ZERO
            },
            TimingSample {
                duration: ms(10),
                estimate: ms(4)
            },
        ]
    );
    assert_eq!(stats.begin_main_frame_to_commit.len(), 1);
    assert_eq!(stats.commit_to_activate.len(), 1);
    assert_eq!(stats.commit_to_activate[0].duration, Duration::ZERO);
}

#[test]
fn estimates_serialize_in_milliseconds() {
    let mut f = fixture();
    f.history.set_recording_enabled(true);
    f.history.will_prepare_tiles();
    f.clock.advance(Duration::from_micros(1500));
    f.history.did_prepare_tiles();

    let value = serde_json::to_value(f.history.estimates()).unwrap();
    assert_eq!(value["prepare_tiles_estimate_ms"], 1.5);
    assert_eq!(value["draw_estimate_ms"], 0.0);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "draw already in progress")]
fn overlapping_will_panics_in_debug() {
    let mut f = fixture();
    f.history.will_draw();
    f.history.will_draw();
}
