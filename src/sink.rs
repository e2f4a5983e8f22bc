use std::io;

use anyhow::Context as _;

use crate::{
    column::{Column, EntityColumns},
    entities::FrameValue,
    error::KinetraceResult,
};

/// Write-only rendering log consumed by playback.
///
/// Ordering contract: within incremental playback, every call for canonical
/// instant `t` is issued before any call for a later instant; within bulk
/// playback, all columns of one entity arrive in one `send_columns` call.
pub trait RendererSink {
    /// Record one entity value at one instant.
    fn log(&mut self, entity: &str, value: &FrameValue, at: f64) -> KinetraceResult<()>;

    /// Record static metadata that is not tied to an instant.
    fn log_static(&mut self, entity: &str, value: &FrameValue) -> KinetraceResult<()>;

    /// Record an entity's entire frame range in one logically atomic call.
    /// `times` carries one instant per partition slot of every column.
    fn send_columns(
        &mut self,
        entity: &str,
        times: &[f64],
        columns: &EntityColumns,
    ) -> KinetraceResult<()>;

    /// Remove an entity from display.
    fn clear(&mut self, entity: &str) -> KinetraceResult<()>;
}

/// One recorded sink call.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SinkRecord {
    Log {
        entity: String,
        at: f64,
        value: FrameValue,
    },
    Static {
        entity: String,
        value: FrameValue,
    },
    Columns {
        entity: String,
        times: Vec<f64>,
        columns: Vec<Column>,
    },
    Clear {
        entity: String,
    },
}

impl SinkRecord {
    pub fn entity(&self) -> &str {
        match self {
            Self::Log { entity, .. }
            | Self::Static { entity, .. }
            | Self::Columns { entity, .. }
            | Self::Clear { entity } => entity,
        }
    }
}

/// In-memory sink for tests and debugging: records every call in order.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<SinkRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[SinkRecord] {
        &self.records
    }

    pub fn records_for(&self, entity: &str) -> Vec<&SinkRecord> {
        self.records.iter().filter(|r| r.entity() == entity).collect()
    }
}

impl RendererSink for MemorySink {
    fn log(&mut self, entity: &str, value: &FrameValue, at: f64) -> KinetraceResult<()> {
        self.records.push(SinkRecord::Log {
            entity: entity.to_string(),
            at,
            value: value.clone(),
        });
        Ok(())
    }

    fn log_static(&mut self, entity: &str, value: &FrameValue) -> KinetraceResult<()> {
        self.records.push(SinkRecord::Static {
            entity: entity.to_string(),
            value: value.clone(),
        });
        Ok(())
    }

    fn send_columns(
        &mut self,
        entity: &str,
        times: &[f64],
        columns: &EntityColumns,
    ) -> KinetraceResult<()> {
        self.records.push(SinkRecord::Columns {
            entity: entity.to_string(),
            times: times.to_vec(),
            columns: columns.columns.clone(),
        });
        Ok(())
    }

    fn clear(&mut self, entity: &str) -> KinetraceResult<()> {
        self.records.push(SinkRecord::Clear {
            entity: entity.to_string(),
        });
        Ok(())
    }
}

/// Streams one JSON object per sink call to a writer, newline-delimited.
#[derive(Debug)]
pub struct JsonLinesSink<W: io::Write> {
    out: W,
}

impl<W: io::Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, record: &SinkRecord) -> KinetraceResult<()> {
        serde_json::to_writer(&mut self.out, record)
            .context("serialize sink record")
            .map_err(crate::error::KinetraceError::from)?;
        self.out
            .write_all(b"\n")
            .context("write sink record")
            .map_err(crate::error::KinetraceError::from)
    }
}

impl<W: io::Write> RendererSink for JsonLinesSink<W> {
    fn log(&mut self, entity: &str, value: &FrameValue, at: f64) -> KinetraceResult<()> {
        self.write(&SinkRecord::Log {
            entity: entity.to_string(),
            at,
            value: value.clone(),
        })
    }

    fn log_static(&mut self, entity: &str, value: &FrameValue) -> KinetraceResult<()> {
        self.write(&SinkRecord::Static {
            entity: entity.to_string(),
            value: value.clone(),
        })
    }

    fn send_columns(
        &mut self,
        entity: &str,
        times: &[f64],
        columns: &EntityColumns,
    ) -> KinetraceResult<()> {
        self.write(&SinkRecord::Columns {
            entity: entity.to_string(),
            times: times.to_vec(),
            columns: columns.columns.clone(),
        })
    }

    fn clear(&mut self, entity: &str) -> KinetraceResult<()> {
        self.write(&SinkRecord::Clear {
            entity: entity.to_string(),
        })
    }
}
