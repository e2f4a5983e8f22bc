use kinetrace::{
    entities::MarkerProperties, FrameValue, MemorySink, PlayOptions, Replay, SinkRecord, TimeSpan,
    TrailingWindow,
};

fn marker_frames(frames: usize, offset: f64) -> Vec<Vec<[f64; 3]>> {
    (0..frames)
        .map(|f| vec![[offset + f as f64, 0.0, 0.0], [offset + f as f64, 1.0, 0.0]])
        .collect()
}

fn props(names: [&str; 2]) -> MarkerProperties {
    MarkerProperties {
        names: names.iter().map(|n| n.to_string()).collect(),
        radius: 0.01,
        color: [255, 255, 255],
        show_labels: true,
    }
}

/// Phase A: 5 frames at 1 Hz. Phase B: 9 frames at 2 Hz, same span.
fn two_rate_replay() -> Replay {
    let mut replay = Replay::new();
    replay
        .add_phase(TimeSpan::new(vec![0.0, 1.0, 2.0, 3.0, 4.0]).unwrap(), 0, "animation")
        .unwrap();
    replay
        .add_phase(TimeSpan::linspace(0.0, 4.0, 9).unwrap(), 1, "animation")
        .unwrap();
    replay
        .phase_mut(0, "animation")
        .unwrap()
        .add_markers("slow", marker_frames(5, 0.0), props(["A1", "A2"]))
        .unwrap();
    replay
        .phase_mut(1, "animation")
        .unwrap()
        .add_markers("fast", marker_frames(9, 10.0), props(["B1", "B2"]))
        .unwrap();
    replay
}

fn logs_for<'a>(sink: &'a MemorySink, entity: &str) -> Vec<(&'a f64, &'a FrameValue)> {
    sink.records()
        .iter()
        .filter_map(|record| match record {
            SinkRecord::Log { entity: e, at, value } if e == entity => Some((at, value)),
            _ => None,
        })
        .collect()
}

#[test]
fn incremental_playback_advances_each_phase_at_its_own_rate() {
    let replay = two_rate_replay();
    let mut sink = MemorySink::new();
    replay
        .play_incremental(&mut sink, &PlayOptions { clear_trailing_phases: false })
        .unwrap();

    // The slow phase is written once per slow sample, the fast phase once
    // per fast sample: no duplicated frames for shared instants.
    let slow = logs_for(&sink, "animation/animation_phase_0/slow");
    let fast = logs_for(&sink, "animation/animation_phase_1/fast");
    assert_eq!(slow.len(), 5);
    assert_eq!(fast.len(), 9);

    // Slow-phase writes land exactly on its own instants.
    let slow_times: Vec<f64> = slow.iter().map(|(at, _)| **at).collect();
    assert_eq!(slow_times, vec![0.0, 1.0, 2.0, 3.0, 4.0]);

    // The payload at t = 2.0 is the slow phase's own frame 2.
    let FrameValue::Points { positions, .. } = slow[2].1 else {
        panic!("expected points");
    };
    assert_eq!(positions[0], [2.0, 0.0, 0.0]);

    // Writes are issued in canonical time order after the per-phase inits.
    let times: Vec<f64> = sink
        .records()
        .iter()
        .filter_map(|record| match record {
            SinkRecord::Log { at, .. } => Some(*at),
            _ => None,
        })
        .collect();
    assert!(times[2..].windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn incremental_playback_clears_intermediate_phases() {
    let replay = two_rate_replay();
    let mut sink = MemorySink::new();
    replay.play_incremental(&mut sink, &PlayOptions::default()).unwrap();

    let cleared: Vec<&str> = sink
        .records()
        .iter()
        .filter_map(|record| match record {
            SinkRecord::Clear { entity } => Some(entity.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(cleared, vec!["animation/animation_phase_0/slow"]);

    // Clears come after every timestamped write.
    let last_log = sink
        .records()
        .iter()
        .rposition(|record| matches!(record, SinkRecord::Log { .. }))
        .unwrap();
    let first_clear = sink
        .records()
        .iter()
        .position(|record| matches!(record, SinkRecord::Clear { .. }))
        .unwrap();
    assert!(first_clear > last_log);
}

#[test]
fn bulk_playback_sends_one_batch_per_entity_on_native_axes() {
    let replay = two_rate_replay();
    let mut sink = MemorySink::new();
    replay.play_bulk(&mut sink).unwrap();

    let batches: Vec<(&str, usize)> = sink
        .records()
        .iter()
        .filter_map(|record| match record {
            SinkRecord::Columns { entity, times, .. } => Some((entity.as_str(), times.len())),
            _ => None,
        })
        .collect();
    assert_eq!(
        batches,
        vec![
            ("animation/animation_phase_0/slow", 5),
            ("animation/animation_phase_1/fast", 9),
        ]
    );

    // Every column of every batch satisfies the partition contract.
    for record in sink.records() {
        let SinkRecord::Columns { times, columns, .. } = record else {
            continue;
        };
        for column in columns {
            assert_eq!(column.partition.len(), times.len());
            assert_eq!(column.partition.iter().sum::<usize>(), column.values.len());
        }
    }
}

#[test]
fn bulk_trailing_markers_window_their_partitions() {
    let mut replay = Replay::new();
    replay
        .add_phase(TimeSpan::linspace(0.0, 0.4, 5).unwrap(), 0, "animation")
        .unwrap();
    replay
        .phase_mut(0, "animation")
        .unwrap()
        .add_trailing_markers(
            "trajectories",
            marker_frames(5, 0.0),
            props(["M1", "M2"]),
            TrailingWindow::last(3).unwrap(),
        )
        .unwrap();

    let mut sink = MemorySink::new();
    replay.play_bulk(&mut sink).unwrap();

    let SinkRecord::Columns { columns, .. } = &sink.records()[0] else {
        panic!("expected columns");
    };
    // Two markers per retained frame, windows of length 1, 2, 3, 3, 3.
    assert_eq!(columns[0].partition, vec![2, 4, 6, 6, 6]);
}

#[test]
fn incremental_trailing_markers_union_their_window() {
    let mut replay = Replay::new();
    replay
        .add_phase(TimeSpan::linspace(0.0, 0.4, 5).unwrap(), 0, "animation")
        .unwrap();
    replay
        .phase_mut(0, "animation")
        .unwrap()
        .add_trailing_markers(
            "trajectories",
            marker_frames(5, 0.0),
            props(["M1", "M2"]),
            TrailingWindow::last(3).unwrap(),
        )
        .unwrap();

    let mut sink = MemorySink::new();
    replay.play_incremental(&mut sink, &PlayOptions::default()).unwrap();

    let logs = logs_for(&sink, "animation/animation_phase_0/trajectories");
    assert_eq!(logs.len(), 5);
    let expected_counts = [2, 4, 6, 6, 6];
    for (frame, (_, value)) in logs.iter().enumerate() {
        let FrameValue::Points { positions, labels, .. } = value else {
            panic!("expected points");
        };
        assert_eq!(positions.len(), expected_counts[frame], "frame {frame}");
        assert_eq!(labels.len(), expected_counts[frame]);
    }
}
