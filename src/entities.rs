use nalgebra::{Point3, Rotation3, Vector3};

use crate::{column::EntityColumns, error::KinetraceResult};

pub mod images;
pub mod points;
pub mod scalars;
pub mod strips;
pub mod transforms;
pub mod vectors;

pub use images::ImageSeries;
pub use points::{MarkerProperties, MarkerSet, TrailingMarkerSet};
pub use scalars::ScalarSeries;
pub use strips::{LineStripSet, StripProperties};
pub use transforms::TransformSeries;
pub use vectors::VectorSeries;

/// A rigid transform: translation plus 3x3 rotation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RigidTransform {
    pub translation: Vector3<f64>,
    pub rotation: Rotation3<f64>,
}

impl RigidTransform {
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: Rotation3::identity(),
        }
    }

    pub fn new(translation: Vector3<f64>, rotation: Rotation3<f64>) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Apply the transform to a point expressed in the local frame.
    pub fn transform_point(&self, point: [f64; 3]) -> [f64; 3] {
        let mapped = self.rotation * Point3::new(point[0], point[1], point[2]) + self.translation;
        [mapped.x, mapped.y, mapped.z]
    }
}

/// One value of one entity at one instant, as handed to the renderer sink.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum FrameValue {
    /// A set of labelled points.
    Points {
        positions: Vec<[f64; 3]>,
        radii: Vec<f64>,
        colors: Vec<[u8; 3]>,
        labels: Vec<String>,
        show_labels: bool,
    },
    /// A set of polylines.
    Strips {
        strips: Vec<Vec<[f64; 3]>>,
        radii: Vec<f64>,
        colors: Vec<[u8; 3]>,
    },
    /// One rigid frame.
    Transform(RigidTransform),
    /// One scalar sample, optionally bracketed by display bounds.
    Scalar {
        value: f64,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// One RGB8 image buffer.
    Image {
        width: u32,
        height: u32,
        data: Vec<u8>,
    },
    /// Static image-stream metadata, logged once before playback.
    ImageFormat { width: u32, height: u32 },
    /// A set of vector glyphs.
    Arrows {
        origins: Vec<[f64; 3]>,
        vectors: Vec<[f64; 3]>,
        color: [u8; 3],
    },
}

/// Capability surface shared by every renderable variant.
///
/// Entities are assembled once before playback and read-only afterwards;
/// both playback modes drive them through this trait.
pub trait Entity {
    /// Stable sink path of the entity.
    fn name(&self) -> &str;

    /// Number of frames this entity holds; always the length of the
    /// owning phase's time span.
    fn frame_count(&self) -> usize;

    /// Value to display at `frame`. Trailing variants return the union of
    /// their retained window rather than the single current sample.
    fn value_at(&self, frame: usize) -> KinetraceResult<FrameValue>;

    /// Self-contained columnar encoding of the entire frame range, for one
    /// bulk transfer instead of one call per frame.
    fn to_columns(&self) -> KinetraceResult<EntityColumns>;

    /// Static metadata to log once before playback, if any.
    fn static_value(&self) -> Option<FrameValue> {
        None
    }
}

pub(crate) fn check_frame(name: &str, frame: usize, frame_count: usize) -> KinetraceResult<()> {
    if frame >= frame_count {
        return Err(crate::error::KinetraceError::shape(format!(
            "frame {frame} out of range for entity '{name}' with {frame_count} frames"
        )));
    }
    Ok(())
}
