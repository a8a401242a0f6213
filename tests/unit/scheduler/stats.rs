use super::*;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn nothing_is_kept_while_disabled() {
    let stats = RenderingStatsInstrumentation::new();
    assert!(!stats.record_rendering_stats());
    stats.add_draw_duration(ms(3), ms(4));
    stats.add_commit_to_activate_duration(ms(3), ms(4));
    assert!(stats.take_stats().is_empty());
}

#[test]
fn take_stats_drains() {
    let stats = RenderingStatsInstrumentation::new();
    stats.set_record_rendering_stats(true);
    stats.add_begin_main_frame_to_commit_duration(ms(10), ms(12));
    stats.add_draw_duration(ms(2), ms(1));
    stats.add_draw_duration(ms(3), ms(2));

    let taken = stats.take_stats();
    assert_eq!(
        taken.begin_main_frame_to_commit,
        vec![TimingSample {
            duration: ms(10),
            estimate: ms(12)
        }]
    );
    assert!(taken.commit_to_activate.is_empty());
    assert_eq!(taken.draw.len(), 2);
    assert!(stats.take_stats().is_empty());
}

#[test]
fn shared_between_threads() {
    let stats = std::sync::Arc::new(RenderingStatsInstrumentation::new());
    stats.set_record_rendering_stats(true);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let stats = std::sync::Arc::clone(&stats);
            std::thread::spawn(move || {
                for i in 0..25 {
                    stats.add_draw_duration(ms(i), ms(i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(stats.take_stats().draw.len(), 100);
}
