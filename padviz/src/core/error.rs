use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No default user profile exists for a visualization profile. This is a
    /// packaging bug, not a runtime condition.
    #[error("no default user profile for visualization profile '{profile}'")]
    MissingDefault { profile: String },

    #[error("no device connected at index {0}")]
    UnknownDevice(usize),

    #[error("device {index} is rendered by '{current}', not '{requested}'")]
    VisualizationMismatch {
        index: usize,
        current: String,
        requested: String,
    },

    #[error("unknown option '{option}' for visualization profile '{profile}'")]
    UnknownOption { profile: String, option: String },

    #[error("option '{option}' expects a {kind} value")]
    InvalidValue { option: String, kind: String },

    #[error("malformed user profile: {0}")]
    MalformedProfile(String),

    #[error("haptics error: {0}")]
    Haptics(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
