use approx::assert_relative_eq;
use kinetrace::{CanonicalTimeline, TimeSpan};

#[test]
fn subset_axis_merges_without_duplicates() {
    // An 11-point axis over [0, 1] is a subset of a 41-point axis over
    // [0, 2]: the merged timeline is exactly the finer axis.
    let slow = TimeSpan::linspace(0.0, 1.0, 11).unwrap();
    let fast = TimeSpan::linspace(0.0, 2.0, 41).unwrap();
    let timeline = CanonicalTimeline::merge(&[&slow, &fast]);

    assert_eq!(timeline.len(), 41);
    assert_relative_eq!(timeline.instant(0), 0.0);
    assert_relative_eq!(timeline.instant(40), 2.0);
    assert!(timeline.instants().windows(2).all(|w| w[0] < w[1]));

    // Membership alternates while both phases run, then only the fast
    // phase remains.
    for index in 0..=20 {
        let expected: &[usize] = if index % 2 == 0 { &[0, 1] } else { &[1] };
        assert_eq!(timeline.membership(index), expected, "index {index}");
    }
    for index in 21..41 {
        assert_eq!(timeline.membership(index), &[1], "index {index}");
    }

    // The slow phase advances on its own samples and then holds frame 10.
    let slow_frames: Vec<Option<usize>> = timeline.displayed_frames(0).to_vec();
    assert_eq!(slow_frames[0], Some(0));
    assert_eq!(slow_frames[1], Some(0));
    assert_eq!(slow_frames[2], Some(1));
    assert_eq!(slow_frames[19], Some(9));
    assert_eq!(slow_frames[20], Some(10));
    assert_eq!(slow_frames[40], Some(10));

    // The fast phase is present everywhere.
    for (index, frame) in timeline.displayed_frames(1).iter().enumerate() {
        assert_eq!(*frame, Some(index));
    }
}

#[test]
fn two_rate_trial_holds_the_slow_phase() {
    // Phase A: 5 frames at 1 Hz. Phase B: 9 frames at 2 Hz.
    let a = TimeSpan::new(vec![0.0, 1.0, 2.0, 3.0, 4.0]).unwrap();
    let b = TimeSpan::linspace(0.0, 4.0, 9).unwrap();
    let timeline = CanonicalTimeline::merge(&[&a, &b]);

    assert_eq!(timeline.len(), 9);

    // At t = 0.5, phase A still displays frame 0 while phase B has moved on.
    assert_relative_eq!(timeline.instant(1), 0.5);
    assert_eq!(timeline.displayed_frame(0, 1), Some(0));
    assert_eq!(timeline.displayed_frame(1, 1), Some(1));

    // At t = 1.0 both phases advance.
    assert_eq!(timeline.displayed_frame(0, 2), Some(1));
    assert_eq!(timeline.displayed_frame(1, 2), Some(2));
}

#[test]
fn displayed_frames_never_step_by_more_than_one() {
    let spans = [
        TimeSpan::new(vec![0.0, 0.4, 0.5, 0.9]).unwrap(),
        TimeSpan::new(vec![0.1, 0.4, 0.8, 0.9, 1.3]).unwrap(),
        TimeSpan::new(vec![0.5, 0.6]).unwrap(),
    ];
    let refs: Vec<&TimeSpan> = spans.iter().collect();
    let timeline = CanonicalTimeline::merge(&refs);

    let total: usize = spans.iter().map(TimeSpan::len).sum();
    assert!(timeline.len() <= total);

    for phase in 0..timeline.phase_count() {
        let mut previous: Option<usize> = None;
        for index in 0..timeline.len() {
            let frame = timeline.displayed_frame(phase, index);
            match (previous, frame) {
                (None, None) => {}
                (None, Some(first)) => assert_eq!(first, 0),
                (Some(_), None) => panic!("phase {phase} became undefined after its first sample"),
                (Some(prev), Some(now)) => assert!(now == prev || now == prev + 1),
            }
            previous = frame;
        }
        // Every phase ends on its own last frame.
        assert_eq!(
            timeline.displayed_frame(phase, timeline.len() - 1),
            Some(spans[phase].len() - 1)
        );
    }
}
