/// Result alias used across the crate.
pub type DubframeResult<T> = Result<T, DubframeError>;

/// Error type for every fallible dubframe operation.
///
/// Input errors (unreadable sources, malformed base64 speech) surface immediately. Resource
/// errors abort the running export after its resources are released.
#[derive(thiserror::Error, Debug)]
pub enum DubframeError {
    /// A value failed validation (bad dimensions, bad configuration).
    #[error("validation error: {0}")]
    Validation(String),

    /// Caller-provided input could not be read or decoded.
    #[error("input error: {0}")]
    Input(String),

    /// A native resource (audio graph, encoder process, file) failed.
    #[error("resource error: {0}")]
    Resource(String),

    /// The export pipeline failed outside of a more specific category.
    #[error("export error: {0}")]
    Export(String),

    /// Export was requested before a voice track was generated.
    #[error("no audio track available")]
    NoAudioTrack,

    /// The recorder cannot produce the requested container/codec pair.
    #[error("unsupported recording format: {0}")]
    UnsupportedRecordingFormat(String),

    /// A drawing surface could not be created for the export canvas.
    #[error("render surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// Another export session currently owns the export slot.
    #[error("an export is already in progress")]
    ExportInProgress,

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped error with context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DubframeError {
    /// Build a [`DubframeError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`DubframeError::Input`].
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Build a [`DubframeError::Resource`].
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`DubframeError::Export`].
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`DubframeError::UnsupportedRecordingFormat`].
    pub fn unsupported_format(msg: impl Into<String>) -> Self {
        Self::UnsupportedRecordingFormat(msg.into())
    }

    /// Build a [`DubframeError::SurfaceUnavailable`].
    pub fn surface_unavailable(msg: impl Into<String>) -> Self {
        Self::SurfaceUnavailable(msg.into())
    }

    /// Build a [`DubframeError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for DubframeError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
