use crate::{
    entities::RigidTransform,
    error::{KinetraceError, KinetraceResult},
    window::TrailingWindow,
};

/// A flattened attribute array together with the per-frame instance counts
/// ("partition") that mark its frame boundaries.
///
/// The invariant `sum(partition) == values.len()` is enforced at
/// construction and holds for every column produced by this module.
#[derive(Clone, Debug, PartialEq)]
pub struct Partitioned<T> {
    values: Vec<T>,
    partition: Vec<usize>,
}

impl<T> Partitioned<T> {
    pub fn new(values: Vec<T>, partition: Vec<usize>) -> KinetraceResult<Self> {
        let expected: usize = partition.iter().sum();
        if expected != values.len() {
            return Err(KinetraceError::shape(format!(
                "partition sums to {expected} but the flattened array holds {} values",
                values.len()
            )));
        }
        Ok(Self { values, partition })
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn partition(&self) -> &[usize] {
        &self.partition
    }

    pub fn frame_count(&self) -> usize {
        self.partition.len()
    }

    /// Split the flattened array back into per-frame instance slices.
    pub fn iter_frames(&self) -> impl Iterator<Item = &[T]> {
        self.partition.iter().scan(0usize, |offset, &count| {
            let start = *offset;
            *offset += count;
            Some(&self.values[start..*offset])
        })
    }

    pub fn into_parts(self) -> (Vec<T>, Vec<usize>) {
        (self.values, self.partition)
    }
}

/// Encode a fixed-instance-count entity: `frames` frames of exactly
/// `per_frame` instances each, pulled from a per-frame callback.
///
/// A frame yielding any other count fails with a shape error naming the
/// entity and the offending frame.
pub fn encode_per_frame<T>(
    entity: &str,
    frames: usize,
    per_frame: usize,
    mut fill: impl FnMut(usize) -> Vec<T>,
) -> KinetraceResult<Partitioned<T>> {
    let mut values = Vec::with_capacity(frames * per_frame);
    let mut partition = Vec::with_capacity(frames);
    for frame in 0..frames {
        let mut instances = fill(frame);
        if instances.len() != per_frame {
            return Err(KinetraceError::shape_mismatch(
                entity,
                frame,
                per_frame,
                instances.len(),
            ));
        }
        values.append(&mut instances);
        partition.push(per_frame);
    }
    Partitioned::new(values, partition)
}

/// Encode a trailing-window entity: frame `i` contributes the union of its
/// retained frames, so its partition entry is `per_frame * |window(i)|`.
pub fn encode_windowed<T: Clone>(
    entity: &str,
    frames: usize,
    per_frame: usize,
    window: &TrailingWindow,
    mut fill: impl FnMut(usize) -> Vec<T>,
) -> KinetraceResult<Partitioned<T>> {
    let mut per_frame_values = Vec::with_capacity(frames);
    for frame in 0..frames {
        let instances = fill(frame);
        if instances.len() != per_frame {
            return Err(KinetraceError::shape_mismatch(
                entity,
                frame,
                per_frame,
                instances.len(),
            ));
        }
        per_frame_values.push(instances);
    }

    let mut values = Vec::new();
    let mut partition = Vec::with_capacity(frames);
    for ranges in window.table(frames) {
        partition.push(per_frame * ranges.len());
        for kept in ranges {
            values.extend_from_slice(&per_frame_values[kept]);
        }
    }
    Partitioned::new(values, partition)
}

/// One instance per frame, repeated. The partition is all ones.
pub fn repeat_per_frame<T: Clone>(value: T, frames: usize) -> Partitioned<T> {
    Partitioned {
        values: vec![value; frames],
        partition: vec![1; frames],
    }
}

/// Repeat `items` to fill each partition slot; every slot must be a
/// multiple of `items.len()`. Used for label columns, where the same names
/// recur once per retained frame.
pub fn tile<T: Clone>(items: &[T], partition: &[usize]) -> KinetraceResult<Partitioned<T>> {
    let mut values = Vec::with_capacity(partition.iter().sum());
    for (frame, &count) in partition.iter().enumerate() {
        if items.is_empty() || count % items.len() != 0 {
            return Err(KinetraceError::shape(format!(
                "cannot tile {} labels into a partition slot of {count} at frame {frame}",
                items.len()
            )));
        }
        for _ in 0..count / items.len() {
            values.extend_from_slice(items);
        }
    }
    Partitioned::new(values, partition.to_vec())
}

/// What a column carries, for sinks that dispatch on meaning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ColumnRole {
    Position,
    Color,
    Radius,
    Label,
    Visibility,
    Transform,
    Strip,
    Scalar,
    ScalarMin,
    ScalarMax,
    VectorOrigin,
    Vector,
    ImageBuffer,
}

/// Typed payload of one column.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum ColumnValues {
    Points(Vec<[f64; 3]>),
    Colors(Vec<[u8; 3]>),
    Scalars(Vec<f64>),
    Labels(Vec<String>),
    Flags(Vec<bool>),
    Transforms(Vec<RigidTransform>),
    Strips(Vec<Vec<[f64; 3]>>),
    Buffers(Vec<Vec<u8>>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            Self::Points(v) => v.len(),
            Self::Colors(v) => v.len(),
            Self::Scalars(v) => v.len(),
            Self::Labels(v) => v.len(),
            Self::Flags(v) => v.len(),
            Self::Transforms(v) => v.len(),
            Self::Strips(v) => v.len(),
            Self::Buffers(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One partition-tagged column of a bulk transfer.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Column {
    pub role: ColumnRole,
    pub values: ColumnValues,
    pub partition: Vec<usize>,
}

impl Column {
    pub fn new(role: ColumnRole, values: ColumnValues, partition: Vec<usize>) -> KinetraceResult<Self> {
        let expected: usize = partition.iter().sum();
        if expected != values.len() {
            return Err(KinetraceError::shape(format!(
                "column {role:?} partition sums to {expected} but holds {} values",
                values.len()
            )));
        }
        Ok(Self {
            role,
            values,
            partition,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.partition.len()
    }
}

/// The complete columnar encoding of one entity: every column spans the
/// same frame range and is written to the sink in one call.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct EntityColumns {
    pub entity: String,
    pub columns: Vec<Column>,
}

impl EntityColumns {
    pub fn new(entity: impl Into<String>, columns: Vec<Column>) -> KinetraceResult<Self> {
        let entity = entity.into();
        if let Some(first) = columns.first() {
            let frames = first.frame_count();
            for column in &columns {
                if column.frame_count() != frames {
                    return Err(KinetraceError::shape(format!(
                        "entity '{entity}' column {:?} spans {} frames, expected {frames}",
                        column.role,
                        column.frame_count()
                    )));
                }
            }
        }
        Ok(Self { entity, columns })
    }

    pub fn frame_count(&self) -> usize {
        self.columns.first().map_or(0, Column::frame_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_sum_must_match_values() {
        assert!(Partitioned::new(vec![1, 2, 3], vec![2, 1]).is_ok());
        assert!(Partitioned::new(vec![1, 2, 3], vec![2, 2]).is_err());
    }

    #[test]
    fn encode_per_frame_preserves_frame_order() {
        let encoded = encode_per_frame("e", 3, 2, |frame| vec![frame * 10, frame * 10 + 1]).unwrap();
        assert_eq!(encoded.values(), &[0, 1, 10, 11, 20, 21]);
        assert_eq!(encoded.partition(), &[2, 2, 2]);

        let frames: Vec<Vec<usize>> = encoded.iter_frames().map(|f| f.to_vec()).collect();
        assert_eq!(frames, vec![vec![0, 1], vec![10, 11], vec![20, 21]]);
    }

    #[test]
    fn encode_per_frame_rejects_inconsistent_counts() {
        let err = encode_per_frame("world/markers", 3, 2, |frame| vec![0u8; if frame == 1 { 3 } else { 2 }])
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("world/markers"));
        assert!(msg.contains("frame 1"));
    }

    #[test]
    fn encode_windowed_repeats_retained_frames() {
        let window = TrailingWindow::last(3).unwrap();
        let encoded = encode_windowed("e", 5, 2, &window, |frame| vec![frame, frame]).unwrap();
        assert_eq!(encoded.partition(), &[2, 4, 6, 6, 6]);
        assert_eq!(encoded.values().len(), 24);
        // Frame 3 shows frames 1..=3, oldest first.
        let frames: Vec<Vec<usize>> = encoded.iter_frames().map(|f| f.to_vec()).collect();
        assert_eq!(frames[3], vec![1, 1, 2, 2, 3, 3]);
    }

    #[test]
    fn windowed_roundtrip_reconstructs_input() {
        let window = TrailingWindow::unbounded();
        let encoded = encode_windowed("e", 4, 1, &window, |frame| vec![frame]).unwrap();
        let frames: Vec<Vec<usize>> = encoded.iter_frames().map(|f| f.to_vec()).collect();
        assert_eq!(
            frames,
            vec![vec![0], vec![0, 1], vec![0, 1, 2], vec![0, 1, 2, 3]]
        );
    }

    #[test]
    fn tile_fills_each_partition_slot() {
        let labels = vec!["a".to_string(), "b".to_string()];
        let tiled = tile(&labels, &[2, 4, 2]).unwrap();
        assert_eq!(
            tiled.values(),
            &["a", "b", "a", "b", "a", "b", "a", "b"]
        );
        assert!(tile(&labels, &[3]).is_err());
    }

    #[test]
    fn entity_columns_require_equal_frame_counts() {
        let positions = Column::new(
            ColumnRole::Position,
            ColumnValues::Points(vec![[0.0; 3]; 4]),
            vec![2, 2],
        )
        .unwrap();
        let colors = Column::new(
            ColumnRole::Color,
            ColumnValues::Colors(vec![[0; 3]; 3]),
            vec![1, 1, 1],
        )
        .unwrap();
        assert!(EntityColumns::new("e", vec![positions.clone()]).is_ok());
        assert!(EntityColumns::new("e", vec![positions, colors]).is_err());
    }
}
