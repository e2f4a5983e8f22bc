use crate::{
    entities::MarkerProperties,
    error::KinetraceResult,
    replay::Replay,
    timeline::TimeSpan,
    window::TrailingWindow,
};

fn default_window_name() -> String {
    "animation".to_string()
}

fn default_true() -> bool {
    true
}

/// A recorded multi-phase trial, loadable from JSON.
///
/// The scenario model carries raw experimental data only; model-driven
/// entities need a [`crate::provider::ModelProvider`] and are assembled in
/// code.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Scenario {
    pub name: String,
    pub phases: Vec<PhaseSpec>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PhaseSpec {
    pub index: usize,
    #[serde(default = "default_window_name")]
    pub window: String,
    pub t_span: Vec<f64>,
    #[serde(default)]
    pub markers: Vec<MarkerSetSpec>,
    #[serde(default)]
    pub scalars: Vec<ScalarSeriesSpec>,
    #[serde(default)]
    pub forces: Vec<ForceSpec>,
    #[serde(default)]
    pub floor: Option<FloorSpec>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct MarkerSetSpec {
    pub name: String,
    pub labels: Vec<String>,
    /// One position per label per frame.
    pub frames: Vec<Vec<[f64; 3]>>,
    /// Keep a trailing trajectory of this many frames.
    #[serde(default)]
    pub trailing: Option<usize>,
    #[serde(default)]
    pub radius: Option<f64>,
    #[serde(default = "default_true")]
    pub show_labels: bool,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ScalarSeriesSpec {
    pub name: String,
    pub values: Vec<f64>,
    #[serde(default)]
    pub range: Option<(f64, f64)>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ForceSpec {
    pub plate: usize,
    /// Center of pressure per frame.
    pub origins: Vec<[f64; 3]>,
    /// Raw force per frame, in newtons.
    pub magnitudes: Vec<[f64; 3]>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct FloorSpec {
    pub square_width: f64,
    #[serde(default)]
    pub height_offset: f64,
    #[serde(default = "FloorSpec::default_subsquares")]
    pub subsquares: usize,
}

impl FloorSpec {
    fn default_subsquares() -> usize {
        10
    }
}

impl Scenario {
    pub fn from_json(json: &str) -> KinetraceResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| crate::error::KinetraceError::config(format!("invalid scenario JSON: {e}")))
    }

    /// Assemble the scenario into a ready-to-play [`Replay`]. All
    /// registration-time validation applies: phase ordering, axis
    /// monotonicity, frame-count consistency, path uniqueness.
    pub fn build(&self) -> KinetraceResult<Replay> {
        let mut replay = Replay::new();
        for spec in &self.phases {
            let span = TimeSpan::new(spec.t_span.clone())?;
            replay.add_phase(span, spec.index, &spec.window)?;

            for markers in &spec.markers {
                let color = replay.next_color();
                let phase = replay.phase_mut(spec.index, &spec.window)?;
                let properties = MarkerProperties {
                    names: markers.labels.clone(),
                    radius: markers.radius.unwrap_or(0.01),
                    color,
                    show_labels: markers.show_labels,
                };
                match markers.trailing {
                    Some(depth) => phase.add_trailing_markers(
                        &markers.name,
                        markers.frames.clone(),
                        properties,
                        TrailingWindow::last(depth)?,
                    )?,
                    None => phase.add_markers(&markers.name, markers.frames.clone(), properties)?,
                }
            }

            let phase = replay.phase_mut(spec.index, &spec.window)?;
            for scalar in &spec.scalars {
                phase.add_scalar_series(&scalar.name, scalar.values.clone(), scalar.range)?;
            }
            for force in &spec.forces {
                phase.add_force_data(force.plate, force.origins.clone(), force.magnitudes.clone())?;
            }
            if let Some(floor) = &spec.floor {
                phase.add_floor(floor.square_width, floor.height_offset, floor.subsquares)?;
            }
        }
        Ok(replay)
    }
}
