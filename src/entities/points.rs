use crate::{
    column::{self, Column, ColumnRole, ColumnValues, EntityColumns},
    entities::{check_frame, Entity, FrameValue},
    error::{KinetraceError, KinetraceResult},
    window::TrailingWindow,
};

/// Shared display attributes of one marker set.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MarkerProperties {
    pub names: Vec<String>,
    pub radius: f64,
    pub color: [u8; 3],
    pub show_labels: bool,
}

impl MarkerProperties {
    pub fn marker_count(&self) -> usize {
        self.names.len()
    }
}

/// A point-set entity: one position per marker per frame.
#[derive(Clone, Debug)]
pub struct MarkerSet {
    name: String,
    positions: Vec<[f64; 3]>, // frame-major, marker_count * frame_count
    frame_count: usize,
    properties: MarkerProperties,
}

impl MarkerSet {
    /// Build from per-frame position lists; every frame must hold one
    /// position per marker name.
    pub fn new(
        name: impl Into<String>,
        frames: Vec<Vec<[f64; 3]>>,
        properties: MarkerProperties,
    ) -> KinetraceResult<Self> {
        let name = name.into();
        let marker_count = properties.marker_count();
        if marker_count == 0 {
            return Err(KinetraceError::config(format!(
                "marker set '{name}' needs at least one marker name"
            )));
        }

        let frame_count = frames.len();
        let mut positions = Vec::with_capacity(marker_count * frame_count);
        for (frame, instances) in frames.into_iter().enumerate() {
            if instances.len() != marker_count {
                return Err(KinetraceError::shape_mismatch(
                    &name,
                    frame,
                    marker_count,
                    instances.len(),
                ));
            }
            positions.extend(instances);
        }

        Ok(Self {
            name,
            positions,
            frame_count,
            properties,
        })
    }

    pub fn properties(&self) -> &MarkerProperties {
        &self.properties
    }

    pub fn marker_count(&self) -> usize {
        self.properties.marker_count()
    }

    fn frame_positions(&self, frame: usize) -> &[[f64; 3]] {
        let k = self.marker_count();
        &self.positions[frame * k..(frame + 1) * k]
    }

    fn points_value(&self, positions: Vec<[f64; 3]>, labels: Vec<String>) -> FrameValue {
        let count = positions.len();
        FrameValue::Points {
            positions,
            radii: vec![self.properties.radius; count],
            colors: vec![self.properties.color; count],
            labels,
            show_labels: self.properties.show_labels,
        }
    }
}

impl Entity for MarkerSet {
    fn name(&self) -> &str {
        &self.name
    }

    fn frame_count(&self) -> usize {
        self.frame_count
    }

    fn value_at(&self, frame: usize) -> KinetraceResult<FrameValue> {
        check_frame(&self.name, frame, self.frame_count)?;
        Ok(self.points_value(
            self.frame_positions(frame).to_vec(),
            self.properties.names.clone(),
        ))
    }

    fn to_columns(&self) -> KinetraceResult<EntityColumns> {
        let positions = column::encode_per_frame(
            &self.name,
            self.frame_count,
            self.marker_count(),
            |frame| self.frame_positions(frame).to_vec(),
        )?;
        let labels = column::tile(&self.properties.names, positions.partition())?;
        let colors = column::repeat_per_frame(self.properties.color, self.frame_count);
        let radii = column::repeat_per_frame(self.properties.radius, self.frame_count);
        let flags = column::repeat_per_frame(self.properties.show_labels, self.frame_count);

        let (values, partition) = positions.into_parts();
        let (label_values, label_partition) = labels.into_parts();
        let (color_values, color_partition) = colors.into_parts();
        let (radius_values, radius_partition) = radii.into_parts();
        let (flag_values, flag_partition) = flags.into_parts();
        EntityColumns::new(
            self.name.clone(),
            vec![
                Column::new(ColumnRole::Position, ColumnValues::Points(values), partition)?,
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
                Column::new(
                    ColumnRole::Label,
                    ColumnValues::Labels(label_values),
                    label_partition,
                )?,
                Column::new(
                    ColumnRole::Visibility,
                    ColumnValues::Flags(flag_values),
                    flag_partition,
                )?,
            ],
        )
    }
}

/// A point-set entity that renders the union of a trailing frame window,
/// leaving a persistent trajectory behind each marker.
#[derive(Clone, Debug)]
pub struct TrailingMarkerSet {
    markers: MarkerSet,
    window: TrailingWindow,
}

impl TrailingMarkerSet {
    pub fn new(
        name: impl Into<String>,
        frames: Vec<Vec<[f64; 3]>>,
        properties: MarkerProperties,
        window: TrailingWindow,
    ) -> KinetraceResult<Self> {
        Ok(Self {
            markers: MarkerSet::new(name, frames, properties)?,
            window,
        })
    }

    pub fn window(&self) -> &TrailingWindow {
        &self.window
    }
}

impl Entity for TrailingMarkerSet {
    fn name(&self) -> &str {
        self.markers.name()
    }

    fn frame_count(&self) -> usize {
        self.markers.frame_count()
    }

    fn value_at(&self, frame: usize) -> KinetraceResult<FrameValue> {
        check_frame(self.name(), frame, self.frame_count())?;
        let kept = self.window.frames_at(frame);
        let mut positions = Vec::with_capacity(kept.len() * self.markers.marker_count());
        let mut labels = Vec::with_capacity(kept.len() * self.markers.marker_count());
        for retained in kept {
            positions.extend_from_slice(self.markers.frame_positions(retained));
            labels.extend(self.markers.properties.names.iter().cloned());
        }
        Ok(self.markers.points_value(positions, labels))
    }

    fn to_columns(&self) -> KinetraceResult<EntityColumns> {
        let frame_count = self.frame_count();
        let positions = column::encode_windowed(
            self.name(),
            frame_count,
            self.markers.marker_count(),
            &self.window,
            |frame| self.markers.frame_positions(frame).to_vec(),
        )?;
        let labels = column::tile(&self.markers.properties.names, positions.partition())?;
        let colors = column::repeat_per_frame(self.markers.properties.color, frame_count);
        let radii = column::repeat_per_frame(self.markers.properties.radius, frame_count);
        let flags = column::repeat_per_frame(self.markers.properties.show_labels, frame_count);

        let (values, partition) = positions.into_parts();
        let (label_values, label_partition) = labels.into_parts();
        let (color_values, color_partition) = colors.into_parts();
        let (radius_values, radius_partition) = radii.into_parts();
        let (flag_values, flag_partition) = flags.into_parts();
        EntityColumns::new(
            self.name().to_string(),
            vec![
                Column::new(ColumnRole::Position, ColumnValues::Points(values), partition)?,
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
                Column::new(
                    ColumnRole::Label,
                    ColumnValues::Labels(label_values),
                    label_partition,
                )?,
                Column::new(
                    ColumnRole::Visibility,
                    ColumnValues::Flags(flag_values),
                    flag_partition,
                )?,
            ],
        )
    }
}
