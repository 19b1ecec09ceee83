/// Convenience result type used across slidecast.
pub type SlidecastResult<T> = Result<T, SlidecastError>;

/// Top-level error taxonomy used by the rendering and encoding pipeline.
#[derive(thiserror::Error, Debug)]
pub enum SlidecastError {
    /// Project dimensions, frame rate or slide data failed local validation.
    #[error("invalid project: {0}")]
    InvalidProject(String),

    /// The external encoder engine could not be constructed or loaded.
    #[error("encoder engine init error: {0}")]
    EngineInit(String),

    /// The raster surface or its font stack is unavailable.
    #[error("raster error: {0}")]
    Raster(String),

    /// Staging frames into the engine or running the engine failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// The run observed its cancellation flag between frames.
    #[error("run cancelled")]
    Cancelled,

    /// Errors when serializing or deserializing project files.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SlidecastError {
    /// Build a [`SlidecastError::InvalidProject`] value.
    pub fn invalid_project(msg: impl Into<String>) -> Self {
        Self::InvalidProject(msg.into())
    }

    /// Build a [`SlidecastError::EngineInit`] value.
    pub fn engine_init(msg: impl Into<String>) -> Self {
        Self::EngineInit(msg.into())
    }

    /// Build a [`SlidecastError::Raster`] value.
    pub fn raster(msg: impl Into<String>) -> Self {
        Self::Raster(msg.into())
    }

    /// Build a [`SlidecastError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`SlidecastError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
