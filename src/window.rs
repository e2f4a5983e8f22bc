use std::ops::Range;

use crate::error::{KinetraceError, KinetraceResult};

/// Trailing retention window for entities that render a persistent
/// trajectory rather than a single current sample.
///
/// An unbounded window keeps every frame seen so far; a bounded window of
/// depth `d` keeps the last `d` frames once `d` frames have elapsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TrailingWindow {
    depth: Option<usize>,
}

impl TrailingWindow {
    /// Keep every frame from the start of the trial.
    pub fn unbounded() -> Self {
        Self { depth: None }
    }

    /// Keep the last `depth` frames. `depth` must be at least 1.
    pub fn last(depth: usize) -> KinetraceResult<Self> {
        if depth == 0 {
            return Err(KinetraceError::config(
                "trailing window depth must be at least 1",
            ));
        }
        Ok(Self { depth: Some(depth) })
    }

    /// Retention depth, or `None` when unbounded.
    pub fn depth(&self) -> Option<usize> {
        self.depth
    }

    /// Frame indices to display when the playhead is at `frame`.
    pub fn frames_at(&self, frame: usize) -> Range<usize> {
        match self.depth {
            Some(depth) if frame >= depth => frame + 1 - depth..frame + 1,
            _ => 0..frame + 1,
        }
    }

    /// Number of frames retained at `frame`.
    pub fn len_at(&self, frame: usize) -> usize {
        self.frames_at(frame).len()
    }

    /// The full keep-table for a trial of `total` frames.
    ///
    /// Empty when `total == 0`.
    pub fn table(&self, total: usize) -> Vec<Range<usize>> {
        (0..total).map(|frame| self.frames_at(frame)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_zero_is_rejected() {
        assert!(TrailingWindow::last(0).is_err());
        assert!(TrailingWindow::last(1).is_ok());
    }

    #[test]
    fn bounded_window_slides_after_filling() {
        let window = TrailingWindow::last(3).unwrap();
        let table: Vec<Vec<usize>> = window.table(5).into_iter().map(|r| r.collect()).collect();
        assert_eq!(
            table,
            vec![
                vec![0],
                vec![0, 1],
                vec![0, 1, 2],
                vec![1, 2, 3],
                vec![2, 3, 4],
            ]
        );
    }

    #[test]
    fn bounded_window_length_is_min_of_elapsed_and_depth() {
        for depth in 1..6usize {
            let window = TrailingWindow::last(depth).unwrap();
            for frame in 0..12usize {
                assert_eq!(window.len_at(frame), (frame + 1).min(depth));
            }
        }
    }

    #[test]
    fn unbounded_window_grows_from_zero() {
        let window = TrailingWindow::unbounded();
        assert_eq!(window.frames_at(0), 0..1);
        assert_eq!(window.frames_at(9), 0..10);
        assert_eq!(window.len_at(41), 42);
    }

    #[test]
    fn empty_trial_has_empty_table() {
        assert!(TrailingWindow::unbounded().table(0).is_empty());
        assert!(TrailingWindow::last(4).unwrap().table(0).is_empty());
    }
}
