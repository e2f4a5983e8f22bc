use crate::{
    column::{Column, ColumnRole, ColumnValues, EntityColumns},
    entities::{check_frame, Entity, FrameValue},
    error::{KinetraceError, KinetraceResult},
};

/// Per-frame RGB8 image buffers (a synchronized video stream).
///
/// The pixel format is logged once as static metadata so the sink can
/// interpret the raw buffers.
#[derive(Clone, Debug)]
pub struct ImageSeries {
    name: String,
    width: u32,
    height: u32,
    frames: Vec<Vec<u8>>,
}

impl ImageSeries {
    pub fn new(
        name: impl Into<String>,
        width: u32,
        height: u32,
        frames: Vec<Vec<u8>>,
    ) -> KinetraceResult<Self> {
        let name = name.into();
        let expected = width as usize * height as usize * 3;
        for (frame, buffer) in frames.iter().enumerate() {
            if buffer.len() != expected {
                return Err(KinetraceError::shape(format!(
                    "entity '{name}' image at frame {frame} holds {} bytes, expected {expected} ({width}x{height} RGB8)",
                    buffer.len()
                )));
            }
        }
        Ok(Self {
            name,
            width,
            height,
            frames,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

impl Entity for ImageSeries {
    fn name(&self) -> &str {
        &self.name
    }

    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn value_at(&self, frame: usize) -> KinetraceResult<FrameValue> {
        check_frame(&self.name, frame, self.frames.len())?;
        Ok(FrameValue::Image {
            width: self.width,
            height: self.height,
            data: self.frames[frame].clone(),
        })
    }

    fn to_columns(&self) -> KinetraceResult<EntityColumns> {
        let frames = self.frames.len();
        EntityColumns::new(
            self.name.clone(),
            vec![Column::new(
                ColumnRole::ImageBuffer,
                ColumnValues::Buffers(self.frames.clone()),
                vec![1; frames],
            )?],
        )
    }

    fn static_value(&self) -> Option<FrameValue> {
        Some(FrameValue::ImageFormat {
            width: self.width,
            height: self.height,
        })
    }
}
