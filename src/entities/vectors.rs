use crate::{
    column::{self, Column, ColumnRole, ColumnValues, EntityColumns},
    entities::{check_frame, Entity, FrameValue},
    error::{KinetraceError, KinetraceResult},
};

/// Raw force magnitudes are divided by this factor before display so that
/// newton-scale vectors stay readable next to meter-scale geometry.
pub const FORCE_DISPLAY_SCALE: f64 = 200.0;

const FORCE_COLOR: [u8; 3] = [201, 219, 227];

/// Vector glyphs: one origin and one direction per vector per frame
/// (ground-reaction forces, residual loads).
#[derive(Clone, Debug)]
pub struct VectorSeries {
    name: String,
    origins: Vec<[f64; 3]>, // frame-major, per_frame * frame_count
    vectors: Vec<[f64; 3]>,
    per_frame: usize,
    frame_count: usize,
    color: [u8; 3],
}

impl VectorSeries {
    pub fn new(
        name: impl Into<String>,
        origin_frames: Vec<Vec<[f64; 3]>>,
        vector_frames: Vec<Vec<[f64; 3]>>,
        per_frame: usize,
        color: [u8; 3],
    ) -> KinetraceResult<Self> {
        let name = name.into();
        if origin_frames.len() != vector_frames.len() {
            return Err(KinetraceError::config(format!(
                "vector series '{name}' has {} origin frames but {} vector frames",
                origin_frames.len(),
                vector_frames.len()
            )));
        }

        let frame_count = origin_frames.len();
        let mut origins = Vec::with_capacity(per_frame * frame_count);
        let mut vectors = Vec::with_capacity(per_frame * frame_count);
        for (frame, (origin, vector)) in origin_frames
            .into_iter()
            .zip(vector_frames.into_iter())
            .enumerate()
        {
            if origin.len() != per_frame {
                return Err(KinetraceError::shape_mismatch(&name, frame, per_frame, origin.len()));
            }
            if vector.len() != per_frame {
                return Err(KinetraceError::shape_mismatch(&name, frame, per_frame, vector.len()));
            }
            origins.extend(origin);
            vectors.extend(vector);
        }

        Ok(Self {
            name,
            origins,
            vectors,
            per_frame,
            frame_count,
            color,
        })
    }

    /// A measured force: one arrow per frame, magnitudes scaled down by
    /// [`FORCE_DISPLAY_SCALE`] for display.
    pub fn force(
        name: &str,
        plate: usize,
        origin_frames: Vec<[f64; 3]>,
        magnitude_frames: Vec<[f64; 3]>,
    ) -> KinetraceResult<Self> {
        let scaled = magnitude_frames
            .into_iter()
            .map(|v| {
                vec![[
                    v[0] / FORCE_DISPLAY_SCALE,
                    v[1] / FORCE_DISPLAY_SCALE,
                    v[2] / FORCE_DISPLAY_SCALE,
                ]]
            })
            .collect();
        let origins = origin_frames.into_iter().map(|o| vec![o]).collect();
        Self::new(
            format!("{name}/force_vector_{plate}"),
            origins,
            scaled,
            1,
            FORCE_COLOR,
        )
    }

    fn frame_slice<'a>(&self, flat: &'a [[f64; 3]], frame: usize) -> &'a [[f64; 3]] {
        &flat[frame * self.per_frame..(frame + 1) * self.per_frame]
    }
}

impl Entity for VectorSeries {
    fn name(&self) -> &str {
        &self.name
    }

    fn frame_count(&self) -> usize {
        self.frame_count
    }

    fn value_at(&self, frame: usize) -> KinetraceResult<FrameValue> {
        check_frame(&self.name, frame, self.frame_count)?;
        Ok(FrameValue::Arrows {
            origins: self.frame_slice(&self.origins, frame).to_vec(),
            vectors: self.frame_slice(&self.vectors, frame).to_vec(),
            color: self.color,
        })
    }

    fn to_columns(&self) -> KinetraceResult<EntityColumns> {
        let origins = column::encode_per_frame(&self.name, self.frame_count, self.per_frame, |frame| {
            self.frame_slice(&self.origins, frame).to_vec()
        })?;
        let vectors = column::encode_per_frame(&self.name, self.frame_count, self.per_frame, |frame| {
            self.frame_slice(&self.vectors, frame).to_vec()
        })?;
        let colors = column::repeat_per_frame(self.color, self.frame_count);

        let (origin_values, origin_partition) = origins.into_parts();
        let (vector_values, vector_partition) = vectors.into_parts();
        let (color_values, color_partition) = colors.into_parts();
        EntityColumns::new(
            self.name.clone(),
            vec![
                Column::new(
                    ColumnRole::VectorOrigin,
                    ColumnValues::Points(origin_values),
                    origin_partition,
                )?,
                Column::new(
                    ColumnRole::Vector,
                    ColumnValues::Points(vector_values),
                    vector_partition,
                )?,
                Column::new(
                    ColumnRole::Color,
                    ColumnValues::Colors(color_values),
                    color_partition,
                )?,
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn force_scales_magnitudes_for_display() {
        let origins = vec![[0.0, 0.0, 0.0], [0.1, 0.0, 0.0]];
        let magnitudes = vec![[0.0, 0.0, 400.0], [0.0, 0.0, 800.0]];
        let series = VectorSeries::force("xp", 1, origins, magnitudes).unwrap();
        assert_eq!(series.name(), "xp/force_vector_1");

        let FrameValue::Arrows { vectors, .. } = series.value_at(1).unwrap() else {
            panic!("expected arrows");
        };
        assert_eq!(vectors, vec![[0.0, 0.0, 4.0]]);
    }

    #[test]
    fn mismatched_origin_and_vector_frames_are_rejected() {
        let err = VectorSeries::new(
            "xp/forces",
            vec![vec![[0.0; 3]]],
            vec![vec![[0.0; 3]], vec![[0.0; 3]]],
            1,
            FORCE_COLOR,
        )
        .unwrap_err();
        assert!(err.to_string().contains("origin frames"));
    }

    #[test]
    fn columns_align_origins_and_vectors() {
        let origins = vec![[0.0; 3], [1.0, 0.0, 0.0]];
        let magnitudes = vec![[0.0, 0.0, 200.0], [0.0, 0.0, 200.0]];
        let series = VectorSeries::force("xp", 0, origins, magnitudes).unwrap();
        let columns = series.to_columns().unwrap();
        assert_eq!(columns.columns[0].partition, columns.columns[1].partition);
        assert_eq!(columns.columns[0].values.len(), 2);
    }
}
