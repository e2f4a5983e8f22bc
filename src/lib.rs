#![forbid(unsafe_code)]

pub mod color;
pub mod column;
pub mod entities;
pub mod error;
pub mod phase;
pub mod provider;
pub mod replay;
pub mod scenario;
pub mod sink;
pub mod statics;
pub mod timeline;
pub mod window;

pub use color::ColorCycle;
pub use column::{Column, ColumnRole, ColumnValues, EntityColumns, Partitioned};
pub use entities::{Entity, FrameValue, RigidTransform};
pub use error::{KinetraceError, KinetraceResult};
pub use phase::Phase;
pub use provider::{ModelDisplayOptions, ModelProvider, TrailingOptions};
pub use replay::{PlayOptions, Replay};
pub use scenario::Scenario;
pub use sink::{JsonLinesSink, MemorySink, RendererSink, SinkRecord};
pub use timeline::{CanonicalTimeline, TimeSpan};
pub use window::TrailingWindow;
