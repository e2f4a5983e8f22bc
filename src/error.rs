pub type KinetraceResult<T> = Result<T, KinetraceError>;

#[derive(thiserror::Error, Debug)]
pub enum KinetraceError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("shape error: {0}")]
    Shape(String),

    #[error("consistency error: {0}")]
    Consistency(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KinetraceError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn shape(msg: impl Into<String>) -> Self {
        Self::Shape(msg.into())
    }

    pub fn consistency(msg: impl Into<String>) -> Self {
        Self::Consistency(msg.into())
    }

    pub(crate) fn shape_mismatch(entity: &str, frame: usize, expected: usize, got: usize) -> Self {
        Self::Shape(format!(
            "entity '{entity}' produced {got} instances at frame {frame}, expected {expected}"
        ))
    }
}
