use crate::{
    entities::{
        Entity, ImageSeries, LineStripSet, MarkerProperties, MarkerSet, RigidTransform,
        ScalarSeries, StripProperties, TrailingMarkerSet, TransformSeries, VectorSeries,
    },
    error::{KinetraceError, KinetraceResult},
    sink::RendererSink,
    statics::{self, StaticComponent},
    timeline::TimeSpan,
    window::TrailingWindow,
};

/// One independently time-stamped animation segment: a time span plus the
/// entities and static scenery shown under its window.
///
/// Phases are assembled before playback and read-only afterwards.
pub struct Phase {
    name: String,
    index: usize,
    t_span: TimeSpan,
    entities: Vec<Box<dyn Entity>>,
    statics: Vec<StaticComponent>,
}

impl std::fmt::Debug for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Phase")
            .field("name", &self.name)
            .field("index", &self.index)
            .field("entities", &self.entities.len())
            .field("statics", &self.statics.len())
            .finish()
    }
}

impl Phase {
    pub fn new(t_span: TimeSpan, index: usize, window: Option<&str>) -> Self {
        let name = match window {
            Some(window) => format!("{window}/animation_phase_{index}"),
            None => format!("animation_phase_{index}"),
        };
        Self {
            name,
            index,
            t_span,
            entities: Vec::new(),
            statics: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn t_span(&self) -> &TimeSpan {
        &self.t_span
    }

    pub fn frame_count(&self) -> usize {
        self.t_span.len()
    }

    /// Sink paths of everything this phase renders.
    pub fn entity_names(&self) -> Vec<&str> {
        self.entities
            .iter()
            .map(|entity| entity.name())
            .chain(self.statics.iter().map(|component| component.name.as_str()))
            .collect()
    }

    fn check_unique(&self, name: &str) -> KinetraceResult<()> {
        if self.entity_names().contains(&name) {
            return Err(KinetraceError::consistency(format!(
                "entity '{name}' is already registered in phase '{}'",
                self.name
            )));
        }
        Ok(())
    }

    fn check_span(&self, what: &str, frames: usize) -> KinetraceResult<()> {
        if frames != self.frame_count() {
            return Err(KinetraceError::config(format!(
                "the shapes of {what} and the time span are inconsistent: {frames} frames vs {} instants",
                self.frame_count()
            )));
        }
        Ok(())
    }

    /// Register a pre-built entity. Its frame count must match the time
    /// span, and its path must be new to this phase.
    pub fn add_entity(&mut self, entity: Box<dyn Entity>) -> KinetraceResult<()> {
        self.check_span(&format!("entity '{}'", entity.name()), entity.frame_count())?;
        self.check_unique(entity.name())?;
        self.entities.push(entity);
        Ok(())
    }

    pub fn add_static(&mut self, component: StaticComponent) -> KinetraceResult<()> {
        self.check_unique(&component.name)?;
        self.statics.push(component);
        Ok(())
    }

    /// Experimental markers recorded over this phase's time span.
    pub fn add_markers(
        &mut self,
        name: &str,
        frames: Vec<Vec<[f64; 3]>>,
        properties: MarkerProperties,
    ) -> KinetraceResult<()> {
        let set = MarkerSet::new(format!("{}/{name}", self.name), frames, properties)?;
        self.add_entity(Box::new(set))
    }

    /// Markers that leave a trailing trajectory behind them.
    pub fn add_trailing_markers(
        &mut self,
        name: &str,
        frames: Vec<Vec<[f64; 3]>>,
        properties: MarkerProperties,
        window: TrailingWindow,
    ) -> KinetraceResult<()> {
        let set =
            TrailingMarkerSet::new(format!("{}/{name}", self.name), frames, properties, window)?;
        self.add_entity(Box::new(set))
    }

    pub fn add_line_strips(
        &mut self,
        name: &str,
        frames: Vec<Vec<Vec<[f64; 3]>>>,
        properties: StripProperties,
    ) -> KinetraceResult<()> {
        let set = LineStripSet::new(format!("{}/{name}", self.name), frames, properties)?;
        self.add_entity(Box::new(set))
    }

    pub fn add_transforms(
        &mut self,
        name: &str,
        transforms: Vec<RigidTransform>,
    ) -> KinetraceResult<()> {
        let series = TransformSeries::new(format!("{}/{name}", self.name), transforms)?;
        self.add_entity(Box::new(series))
    }

    pub fn add_scalar_series(
        &mut self,
        name: &str,
        values: Vec<f64>,
        range: Option<(f64, f64)>,
    ) -> KinetraceResult<()> {
        let series = ScalarSeries::new(format!("{}/{name}", self.name), values, range)?;
        self.add_entity(Box::new(series))
    }

    /// A measured force per frame, anchored at its center of pressure.
    pub fn add_force_data(
        &mut self,
        plate: usize,
        origins: Vec<[f64; 3]>,
        magnitudes: Vec<[f64; 3]>,
    ) -> KinetraceResult<()> {
        let series = VectorSeries::force(&self.name, plate, origins, magnitudes)?;
        self.add_entity(Box::new(series))
    }

    pub fn add_video(
        &mut self,
        name: &str,
        width: u32,
        height: u32,
        frames: Vec<Vec<u8>>,
    ) -> KinetraceResult<()> {
        let series = ImageSeries::new(format!("{}/{name}", self.name), width, height, frames)?;
        self.add_entity(Box::new(series))
    }

    pub fn add_floor(
        &mut self,
        square_width: f64,
        height_offset: f64,
        subsquares: usize,
    ) -> KinetraceResult<()> {
        self.add_static(statics::floor(&self.name, square_width, height_offset, subsquares))
    }

    pub fn add_gravity(&mut self, vector: [f64; 3]) -> KinetraceResult<()> {
        self.add_static(statics::gravity(&self.name, vector))
    }

    pub fn add_force_plate(&mut self, plate: usize, corners: [[f64; 3]; 4]) -> KinetraceResult<()> {
        self.add_static(statics::force_plate(&self.name, plate, corners))
    }

    /// Statics and static entity metadata, issued once before any frame.
    pub(crate) fn play_statics(&self, sink: &mut dyn RendererSink) -> KinetraceResult<()> {
        let start = self.t_span.first();
        for component in &self.statics {
            sink.log(&component.name, &component.value, start)?;
        }
        for entity in &self.entities {
            if let Some(value) = entity.static_value() {
                sink.log_static(entity.name(), &value)?;
            }
        }
        Ok(())
    }

    /// One timestamped log per entity for `frame`, at the phase's own
    /// instant for that frame.
    pub(crate) fn play_frame(&self, frame: usize, sink: &mut dyn RendererSink) -> KinetraceResult<()> {
        let at = self.t_span.get(frame).ok_or_else(|| {
            KinetraceError::shape(format!(
                "frame {frame} out of range for phase '{}' with {} instants",
                self.name,
                self.frame_count()
            ))
        })?;
        for entity in &self.entities {
            sink.log(entity.name(), &entity.value_at(frame)?, at)?;
        }
        Ok(())
    }

    /// Single-phase incremental playback over this phase's own axis.
    pub fn play_frames(&self, sink: &mut dyn RendererSink) -> KinetraceResult<()> {
        self.play_statics(sink)?;
        for frame in 0..self.frame_count() {
            self.play_frame(frame, sink)?;
        }
        Ok(())
    }

    /// Bulk playback: statics, then one columnar transfer per entity,
    /// tagged with this phase's native time axis.
    pub fn play_columns(&self, sink: &mut dyn RendererSink) -> KinetraceResult<()> {
        self.play_statics(sink)?;
        for entity in &self.entities {
            let columns = entity.to_columns()?;
            sink.send_columns(entity.name(), self.t_span.instants(), &columns)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{MemorySink, SinkRecord};

    fn span(frames: usize) -> TimeSpan {
        TimeSpan::new((0..frames).map(|i| i as f64 * 0.1).collect()).unwrap()
    }

    fn props() -> MarkerProperties {
        MarkerProperties {
            names: vec!["M1".to_string()],
            radius: 0.01,
            color: [255, 255, 255],
            show_labels: false,
        }
    }

    fn marker_frames(frames: usize) -> Vec<Vec<[f64; 3]>> {
        (0..frames).map(|f| vec![[f as f64, 0.0, 0.0]]).collect()
    }

    #[test]
    fn window_prefix_shapes_the_phase_name() {
        let phase = Phase::new(span(2), 1, Some("animation"));
        assert_eq!(phase.name(), "animation/animation_phase_1");
        let bare = Phase::new(span(2), 0, None);
        assert_eq!(bare.name(), "animation_phase_0");
    }

    #[test]
    fn frame_count_mismatch_is_a_config_error() {
        let mut phase = Phase::new(span(5), 0, None);
        let err = phase.add_markers("xp", marker_frames(4), props()).unwrap_err();
        assert!(matches!(err, KinetraceError::Config(_)));
    }

    #[test]
    fn duplicate_entity_path_is_a_consistency_error() {
        let mut phase = Phase::new(span(3), 0, None);
        phase.add_markers("xp", marker_frames(3), props()).unwrap();
        let err = phase.add_markers("xp", marker_frames(3), props()).unwrap_err();
        assert!(matches!(err, KinetraceError::Consistency(_)));
    }

    #[test]
    fn play_frames_logs_every_entity_at_its_instant() {
        let mut phase = Phase::new(span(3), 0, None);
        phase.add_markers("xp", marker_frames(3), props()).unwrap();
        phase.add_scalar_series("q/hip", vec![0.0, 0.1, 0.2], None).unwrap();

        let mut sink = MemorySink::new();
        phase.play_frames(&mut sink).unwrap();

        // Two entities, three frames.
        assert_eq!(sink.records().len(), 6);
        let times: Vec<f64> = sink
            .records()
            .iter()
            .filter_map(|record| match record {
                SinkRecord::Log { at, .. } => Some(*at),
                _ => None,
            })
            .collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn play_columns_sends_one_batch_per_entity() {
        let mut phase = Phase::new(span(4), 0, None);
        phase.add_markers("xp", marker_frames(4), props()).unwrap();
        phase.add_floor(3.0, 0.0, 4).unwrap();

        let mut sink = MemorySink::new();
        phase.play_columns(&mut sink).unwrap();

        let batches: Vec<_> = sink
            .records()
            .iter()
            .filter(|record| matches!(record, SinkRecord::Columns { .. }))
            .collect();
        assert_eq!(batches.len(), 1);
        let SinkRecord::Columns { times, columns, .. } = batches[0] else {
            unreachable!();
        };
        assert_eq!(times.len(), 4);
        assert!(!columns.is_empty());
    }

    #[test]
    fn statics_are_logged_at_the_first_instant() {
        let mut phase = Phase::new(span(2), 0, None);
        phase.add_gravity([0.0, 0.0, -9.81]).unwrap();

        let mut sink = MemorySink::new();
        phase.play_statics(&mut sink).unwrap();
        let SinkRecord::Log { at, entity, .. } = &sink.records()[0] else {
            panic!("expected log");
        };
        assert_eq!(*at, 0.0);
        assert!(entity.ends_with("/gravity"));
    }
}
