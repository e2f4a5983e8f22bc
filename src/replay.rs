use std::collections::BTreeMap;

use tracing::debug;

use crate::{
    color::ColorCycle,
    error::{KinetraceError, KinetraceResult},
    phase::Phase,
    provider::{assemble_animated_model, ModelDisplayOptions, ModelProvider},
    sink::RendererSink,
    timeline::{CanonicalTimeline, TimeSpan},
};

/// Playback tuning.
#[derive(Clone, Copy, Debug)]
pub struct PlayOptions {
    /// After incremental playback, clear every entity belonging to all but
    /// the last phase so intermediate phases do not linger visually.
    pub clear_trailing_phases: bool,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            clear_trailing_phases: true,
        }
    }
}

/// Top-level driver: owns the ordered phase list, each index mapped to the
/// windows it renders under, and replays all of them into a sink.
#[derive(Default)]
pub struct Replay {
    slots: Vec<BTreeMap<String, Phase>>,
    colors: ColorCycle,
}

impl Replay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered phase indices.
    pub fn phase_count(&self) -> usize {
        self.slots.len()
    }

    /// Window names of one phase index, in display order.
    pub fn windows(&self, index: usize) -> Vec<&str> {
        self.slots
            .get(index)
            .map(|slot| slot.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Register a phase. Indices must arrive in order: `index` may extend
    /// the list by one or add a new window to an existing index.
    pub fn add_phase(
        &mut self,
        t_span: TimeSpan,
        index: usize,
        window: &str,
    ) -> KinetraceResult<&mut Phase> {
        if index > self.slots.len() {
            return Err(KinetraceError::config(format!(
                "phases must be added in order: add phase {} before adding phase {index}",
                self.slots.len()
            )));
        }
        if index == self.slots.len() {
            self.slots.push(BTreeMap::new());
        }
        let slot = &mut self.slots[index];
        if slot.contains_key(window) {
            return Err(KinetraceError::config(format!(
                "phase {index} already renders a '{window}' window"
            )));
        }
        Ok(slot
            .entry(window.to_string())
            .or_insert(Phase::new(t_span, index, Some(window))))
    }

    pub fn phase(&self, index: usize, window: &str) -> Option<&Phase> {
        self.slots.get(index).and_then(|slot| slot.get(window))
    }

    pub fn phase_mut(&mut self, index: usize, window: &str) -> KinetraceResult<&mut Phase> {
        self.slots
            .get_mut(index)
            .and_then(|slot| slot.get_mut(window))
            .ok_or_else(|| {
                KinetraceError::config(format!("no phase {index} with a '{window}' window"))
            })
    }

    /// Precompute a model trajectory into entities of one phase, drawing
    /// trajectory colors from the replay-owned cycle.
    pub fn add_animated_model(
        &mut self,
        index: usize,
        window: &str,
        provider: &dyn ModelProvider,
        q: &[Vec<f64>],
        options: &ModelDisplayOptions,
    ) -> KinetraceResult<()> {
        let Self { slots, colors } = self;
        let phase = slots
            .get_mut(index)
            .and_then(|slot| slot.get_mut(window))
            .ok_or_else(|| {
                KinetraceError::config(format!("no phase {index} with a '{window}' window"))
            })?;
        assemble_animated_model(phase, provider, q, options, colors)
    }

    /// Hand out the next trajectory color; exposed so callers assembling
    /// entities by hand stay consistent with the model path.
    pub fn next_color(&mut self) -> [u8; 3] {
        self.colors.next_color()
    }

    /// All phases in playback order: by index, then by window name.
    fn ordered_phases(&self) -> Vec<&Phase> {
        self.slots.iter().flat_map(|slot| slot.values()).collect()
    }

    /// Incremental playback on the merged canonical timeline.
    ///
    /// Correct for any number of phases at any mix of frame rates: every
    /// phase is initialized at its own first instant, then each canonical
    /// instant advances exactly the phases sampled there. Phases absent
    /// from an instant keep their last rendered state (the sink log is
    /// write-only, so omission is a hold).
    #[tracing::instrument(skip(self, sink, options))]
    pub fn play_incremental(
        &self,
        sink: &mut dyn RendererSink,
        options: &PlayOptions,
    ) -> KinetraceResult<()> {
        let phases = self.ordered_phases();
        if phases.is_empty() {
            debug!("no phases registered, nothing to replay");
            return Ok(());
        }

        if phases.len() == 1 {
            phases[0].play_frames(sink)?;
            return Ok(());
        }

        let spans: Vec<&TimeSpan> = phases.iter().map(|phase| phase.t_span()).collect();
        let timeline = CanonicalTimeline::merge(&spans);
        debug!(
            phases = phases.len(),
            instants = timeline.len(),
            "replaying merged timeline"
        );

        for phase in &phases {
            phase.play_statics(sink)?;
            phase.play_frame(0, sink)?;
        }

        for index in 1..timeline.len() {
            for &member in timeline.membership(index) {
                if let Some(frame) = timeline.displayed_frame(member, index) {
                    phases[member].play_frame(frame, sink)?;
                }
            }
        }

        if options.clear_trailing_phases {
            self.clear_all_but_last(sink)?;
        }
        Ok(())
    }

    /// Bulk playback: one columnar transfer per entity, each phase tagged
    /// with its own native time axis.
    ///
    /// No canonical axis is synthesized, so phases recorded at different
    /// rates are transferred as independently-timestamped columns; callers
    /// needing true cross-phase alignment use [`Replay::play_incremental`].
    #[tracing::instrument(skip(self, sink))]
    pub fn play_bulk(&self, sink: &mut dyn RendererSink) -> KinetraceResult<()> {
        let phases = self.ordered_phases();
        debug!(phases = phases.len(), "replaying columnar batches");
        for phase in phases {
            phase.play_columns(sink)?;
        }
        Ok(())
    }

    fn clear_all_but_last(&self, sink: &mut dyn RendererSink) -> KinetraceResult<()> {
        if self.slots.len() < 2 {
            return Ok(());
        }
        for slot in &self.slots[..self.slots.len() - 1] {
            for phase in slot.values() {
                for name in phase.entity_names() {
                    sink.clear(name)?;
                }
            }
        }
        Ok(())
    }
}
