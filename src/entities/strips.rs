use crate::{
    column::{self, Column, ColumnRole, ColumnValues, EntityColumns},
    entities::{check_frame, Entity, FrameValue},
    error::{KinetraceError, KinetraceResult},
};

/// Shared display attributes of one line-strip set.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StripProperties {
    pub names: Vec<String>,
    pub radius: f64,
    pub color: [u8; 3],
}

impl StripProperties {
    pub fn strip_count(&self) -> usize {
        self.names.len()
    }
}

/// A line-strip set: one polyline per strip per frame (muscle and ligament
/// paths, segment wireframes).
#[derive(Clone, Debug)]
pub struct LineStripSet {
    name: String,
    strips: Vec<Vec<[f64; 3]>>, // frame-major, strip_count * frame_count
    frame_count: usize,
    properties: StripProperties,
}

impl LineStripSet {
    pub fn new(
        name: impl Into<String>,
        frames: Vec<Vec<Vec<[f64; 3]>>>,
        properties: StripProperties,
    ) -> KinetraceResult<Self> {
        let name = name.into();
        let strip_count = properties.strip_count();
        if strip_count == 0 {
            return Err(KinetraceError::config(format!(
                "line-strip set '{name}' needs at least one strip name"
            )));
        }

        let frame_count = frames.len();
        let mut strips = Vec::with_capacity(strip_count * frame_count);
        for (frame, instances) in frames.into_iter().enumerate() {
            if instances.len() != strip_count {
                return Err(KinetraceError::shape_mismatch(
                    &name,
                    frame,
                    strip_count,
                    instances.len(),
                ));
            }
            strips.extend(instances);
        }

        Ok(Self {
            name,
            strips,
            frame_count,
            properties,
        })
    }

    pub fn strip_count(&self) -> usize {
        self.properties.strip_count()
    }

    fn frame_strips(&self, frame: usize) -> &[Vec<[f64; 3]>] {
        let k = self.strip_count();
        &self.strips[frame * k..(frame + 1) * k]
    }
}

impl Entity for LineStripSet {
    fn name(&self) -> &str {
        &self.name
    }

    fn frame_count(&self) -> usize {
        self.frame_count
    }

    fn value_at(&self, frame: usize) -> KinetraceResult<FrameValue> {
        check_frame(&self.name, frame, self.frame_count)?;
        let k = self.strip_count();
        Ok(FrameValue::Strips {
            strips: self.frame_strips(frame).to_vec(),
            radii: vec![self.properties.radius; k],
            colors: vec![self.properties.color; k],
        })
    }

    fn to_columns(&self) -> KinetraceResult<EntityColumns> {
        let strips = column::encode_per_frame(&self.name, self.frame_count, self.strip_count(), |frame| {
            self.frame_strips(frame).to_vec()
        })?;
        let colors = column::repeat_per_frame(self.properties.color, self.frame_count);
        let radii = column::repeat_per_frame(self.properties.radius, self.frame_count);

        let (strip_values, strip_partition) = strips.into_parts();
        let (color_values, color_partition) = colors.into_parts();
        let (radius_values, radius_partition) = radii.into_parts();
        EntityColumns::new(
            self.name.clone(),
            vec![
                Column::new(
                    ColumnRole::Strip,
                    ColumnValues::Strips(strip_values),
                    strip_partition,
                )?,
                Column::new(
                    ColumnRole::Color,
                    ColumnValues::Colors(color_values),
                    color_partition,
                )?,
                Column::new(
                    ColumnRole::Radius,
                    ColumnValues::Scalars(radius_values),
                    radius_partition,
                )?,
            ],
        )
    }
}
