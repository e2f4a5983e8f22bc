use crate::{
    color::ColorCycle,
    entities::{LineStripSet, MarkerProperties, MarkerSet, RigidTransform, StripProperties, TrailingMarkerSet, TransformSeries},
    error::{KinetraceError, KinetraceResult},
    phase::Phase,
    window::TrailingWindow,
};

/// Geometry source for one articulated model.
///
/// Implementations wrap a model description (URDF, biomechanical, robotic)
/// and must be pure functions of the generalized coordinates `q`: the same
/// sample always yields the same geometry, so playback may call them once
/// per frame or once per batch.
pub trait ModelProvider {
    fn name(&self) -> &str;

    fn dof_names(&self) -> &[String];

    fn marker_names(&self) -> &[String];

    /// Model marker positions for one coordinate sample, one per marker
    /// name and in the same order.
    fn markers_at(&self, q: &[f64]) -> Vec<[f64; 3]>;

    fn segment_names(&self) -> &[String];

    /// World transform of every segment for one coordinate sample.
    fn segment_transforms_at(&self, q: &[f64]) -> Vec<RigidTransform>;

    /// Names of the line strips (muscles, ligaments, wireframes) this model
    /// exposes, if any.
    fn strip_names(&self) -> &[String] {
        &[]
    }

    fn strips_at(&self, _q: &[f64]) -> Vec<Vec<[f64; 3]>> {
        Vec::new()
    }

    /// Display bounds for each degree of freedom, when the model defines
    /// them.
    fn dof_ranges(&self) -> Option<Vec<(f64, f64)>> {
        None
    }
}

/// Display tuning for one animated model.
#[derive(Clone, Debug)]
pub struct ModelDisplayOptions {
    pub marker_radius: f64,
    pub marker_color: [u8; 3],
    pub show_marker_labels: bool,
    pub strip_radius: f64,
    pub strip_color: [u8; 3],
    /// Retain a trailing trajectory for a subset of the model markers.
    pub trailing: Option<TrailingOptions>,
    /// Chart every degree of freedom as a scalar series.
    pub display_q: bool,
}

impl Default for ModelDisplayOptions {
    fn default() -> Self {
        Self {
            marker_radius: 0.01,
            marker_color: [0, 0, 255],
            show_marker_labels: false,
            strip_radius: 0.004,
            strip_color: [255, 0, 0],
            trailing: None,
            display_q: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TrailingOptions {
    pub marker_names: Vec<String>,
    pub window: TrailingWindow,
}

/// Precompute a coordinate trajectory into renderable entities and register
/// them on `phase`.
///
/// `q` holds one coordinate vector per frame; its length must match the
/// phase's time span.
pub fn assemble_animated_model(
    phase: &mut Phase,
    provider: &dyn ModelProvider,
    q: &[Vec<f64>],
    options: &ModelDisplayOptions,
    colors: &mut ColorCycle,
) -> KinetraceResult<()> {
    if q.len() != phase.frame_count() {
        return Err(KinetraceError::config(format!(
            "the shapes of q and the time span are inconsistent: {} coordinate samples vs {} instants",
            q.len(),
            phase.frame_count()
        )));
    }

    let base = format!("{}/{}", phase.name(), provider.name());

    let marker_names = provider.marker_names();
    if !marker_names.is_empty() {
        let frames: Vec<Vec<[f64; 3]>> = q.iter().map(|sample| provider.markers_at(sample)).collect();
        let set = MarkerSet::new(
            format!("{base}/model_markers"),
            frames.clone(),
            MarkerProperties {
                names: marker_names.to_vec(),
                radius: options.marker_radius,
                color: options.marker_color,
                show_labels: options.show_marker_labels,
            },
        )?;
        phase.add_entity(Box::new(set))?;

        if let Some(trailing) = &options.trailing {
            let kept = select_markers(marker_names, &trailing.marker_names, &frames, &base)?;
            let set = TrailingMarkerSet::new(
                format!("{base}/marker_trajectories"),
                kept,
                MarkerProperties {
                    names: trailing.marker_names.clone(),
                    radius: options.marker_radius,
                    color: colors.next_color(),
                    show_labels: false,
                },
                trailing.window,
            )?;
            phase.add_entity(Box::new(set))?;
        }
    }

    let segment_names = provider.segment_names();
    if !segment_names.is_empty() {
        let per_frame: Vec<Vec<RigidTransform>> =
            q.iter().map(|sample| provider.segment_transforms_at(sample)).collect();
        for (frame, transforms) in per_frame.iter().enumerate() {
            if transforms.len() != segment_names.len() {
                return Err(KinetraceError::shape_mismatch(
                    &base,
                    frame,
                    segment_names.len(),
                    transforms.len(),
                ));
            }
        }
        for (segment, name) in segment_names.iter().enumerate() {
            let series = TransformSeries::new(
                format!("{base}/{name}/frame"),
                per_frame.iter().map(|frame| frame[segment].clone()).collect(),
            )?;
            phase.add_entity(Box::new(series))?;
        }
    }

    let strip_names = provider.strip_names();
    if !strip_names.is_empty() {
        let frames: Vec<Vec<Vec<[f64; 3]>>> = q.iter().map(|sample| provider.strips_at(sample)).collect();
        let set = LineStripSet::new(
            format!("{base}/line_strips"),
            frames,
            StripProperties {
                names: strip_names.to_vec(),
                radius: options.strip_radius,
                color: options.strip_color,
            },
        )?;
        phase.add_entity(Box::new(set))?;
    }

    if options.display_q {
        let ranges = provider.dof_ranges();
        for (dof, name) in provider.dof_names().iter().enumerate() {
            let values: Vec<f64> = q
                .iter()
                .enumerate()
                .map(|(frame, sample)| {
                    sample.get(dof).copied().ok_or_else(|| {
                        KinetraceError::shape_mismatch(&base, frame, provider.dof_names().len(), sample.len())
                    })
                })
                .collect::<KinetraceResult<_>>()?;
            let range = ranges.as_ref().map(|r| r[dof]);
            phase.add_scalar_series(&format!("{}/q/{name}", provider.name()), values, range)?;
        }
    }

    Ok(())
}

/// Keep only the markers named in `wanted`, in `wanted` order.
fn select_markers(
    all_names: &[String],
    wanted: &[String],
    frames: &[Vec<[f64; 3]>],
    entity: &str,
) -> KinetraceResult<Vec<Vec<[f64; 3]>>> {
    let indices: Vec<usize> = wanted
        .iter()
        .map(|name| {
            all_names.iter().position(|candidate| candidate == name).ok_or_else(|| {
                KinetraceError::config(format!(
                    "trailing marker '{name}' is not a marker of '{entity}'"
                ))
            })
        })
        .collect::<KinetraceResult<_>>()?;
    Ok(frames
        .iter()
        .map(|frame| indices.iter().map(|&i| frame[i]).collect())
        .collect())
}
