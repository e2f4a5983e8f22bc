use crate::{
    column::{Column, ColumnRole, ColumnValues, EntityColumns},
    entities::{check_frame, Entity, FrameValue, RigidTransform},
    error::{KinetraceError, KinetraceResult},
};

/// A rigid-transform series: one segment frame per instant.
#[derive(Clone, Debug)]
pub struct TransformSeries {
    name: String,
    transforms: Vec<RigidTransform>,
}

impl TransformSeries {
    pub fn new(name: impl Into<String>, transforms: Vec<RigidTransform>) -> KinetraceResult<Self> {
        let name = name.into();
        if transforms.is_empty() {
            return Err(KinetraceError::config(format!(
                "transform series '{name}' needs at least one frame"
            )));
        }
        Ok(Self { name, transforms })
    }
}

impl Entity for TransformSeries {
    fn name(&self) -> &str {
        &self.name
    }

    fn frame_count(&self) -> usize {
        self.transforms.len()
    }

    fn value_at(&self, frame: usize) -> KinetraceResult<FrameValue> {
        check_frame(&self.name, frame, self.transforms.len())?;
        Ok(FrameValue::Transform(self.transforms[frame].clone()))
    }

    fn to_columns(&self) -> KinetraceResult<EntityColumns> {
        let frames = self.transforms.len();
        EntityColumns::new(
            self.name.clone(),
            vec![Column::new(
                ColumnRole::Transform,
                ColumnValues::Transforms(self.transforms.clone()),
                vec![1; frames],
            )?],
        )
    }
}
