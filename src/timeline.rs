use std::collections::{BTreeSet, HashSet};

use crate::error::{KinetraceError, KinetraceResult};

/// Decimal places retained when comparing instants across phases. Instants
/// that agree to the nanosecond are treated as the same canonical instant.
const MERGE_DECIMALS: u32 = 9;

fn time_key(t: f64) -> i64 {
    (t * 10f64.powi(MERGE_DECIMALS as i32)).round() as i64
}

fn key_to_seconds(key: i64) -> f64 {
    key as f64 / 10f64.powi(MERGE_DECIMALS as i32)
}

/// The ordered, immutable time axis of one phase: one instant per frame.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSpan {
    instants: Vec<f64>,
}

impl TimeSpan {
    /// Create a validated axis: finite, non-empty, strictly increasing.
    pub fn new(instants: Vec<f64>) -> KinetraceResult<Self> {
        if instants.is_empty() {
            return Err(KinetraceError::config(
                "a time span must contain at least one instant",
            ));
        }
        if instants.iter().any(|t| !t.is_finite()) {
            return Err(KinetraceError::config("time instants must be finite"));
        }
        if !instants.windows(2).all(|w| w[0] < w[1]) {
            return Err(KinetraceError::config(
                "time instants must be strictly increasing",
            ));
        }
        Ok(Self { instants })
    }

    /// Build an axis of `frames` instants evenly spaced over `[start, end]`.
    pub fn linspace(start: f64, end: f64, frames: usize) -> KinetraceResult<Self> {
        if frames < 2 {
            return Err(KinetraceError::config(
                "a linspace time span needs at least 2 frames",
            ));
        }
        let step = (end - start) / (frames - 1) as f64;
        Self::new((0..frames).map(|i| start + step * i as f64).collect())
    }

    pub fn len(&self) -> usize {
        self.instants.len()
    }

    pub fn is_empty(&self) -> bool {
        false // non-empty by construction
    }

    pub fn first(&self) -> f64 {
        self.instants[0]
    }

    pub fn last(&self) -> f64 {
        self.instants[self.instants.len() - 1]
    }

    pub fn get(&self, frame: usize) -> Option<f64> {
        self.instants.get(frame).copied()
    }

    pub fn instants(&self) -> &[f64] {
        &self.instants
    }
}

/// The deduplicated, sorted union of several phases' time axes, with the
/// per-instant phase membership and per-phase hold-last-frame counters
/// derived once and cached.
#[derive(Clone, Debug)]
pub struct CanonicalTimeline {
    instants: Vec<f64>,
    membership: Vec<Vec<usize>>,
    displayed: Vec<Vec<Option<usize>>>,
}

impl CanonicalTimeline {
    pub fn merge(spans: &[&TimeSpan]) -> Self {
        let keys: Vec<Vec<i64>> = spans
            .iter()
            .map(|span| span.instants().iter().map(|&t| time_key(t)).collect())
            .collect();
        let sets: Vec<HashSet<i64>> = keys.iter().map(|k| k.iter().copied().collect()).collect();

        let merged: BTreeSet<i64> = keys.iter().flatten().copied().collect();
        let instants: Vec<f64> = merged.iter().map(|&key| key_to_seconds(key)).collect();

        let membership: Vec<Vec<usize>> = merged
            .iter()
            .map(|key| {
                sets.iter()
                    .enumerate()
                    .filter(|(_, set)| set.contains(key))
                    .map(|(phase, _)| phase)
                    .collect()
            })
            .collect();

        // One forward pass per phase: the counter advances exactly at that
        // phase's own sample instants and holds its value in between.
        let displayed: Vec<Vec<Option<usize>>> = (0..spans.len())
            .map(|phase| {
                let mut current = None;
                membership
                    .iter()
                    .map(|members| {
                        if members.contains(&phase) {
                            current = Some(current.map_or(0, |frame| frame + 1));
                        }
                        current
                    })
                    .collect()
            })
            .collect();

        Self {
            instants,
            membership,
            displayed,
        }
    }

    pub fn len(&self) -> usize {
        self.instants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instants.is_empty()
    }

    pub fn phase_count(&self) -> usize {
        self.displayed.len()
    }

    /// Canonical instants in seconds, strictly increasing.
    pub fn instants(&self) -> &[f64] {
        &self.instants
    }

    pub fn instant(&self, index: usize) -> f64 {
        self.instants[index]
    }

    /// Phases holding a sample at exactly this canonical instant.
    pub fn membership(&self, index: usize) -> &[usize] {
        &self.membership[index]
    }

    /// The frame of `phase` currently displayed at canonical `index`, or
    /// `None` before the phase's first sample.
    pub fn displayed_frame(&self, phase: usize, index: usize) -> Option<usize> {
        self.displayed[phase][index]
    }

    pub fn displayed_frames(&self, phase: usize) -> &[Option<usize>] {
        &self.displayed[phase]
    }
}
