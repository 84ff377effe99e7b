use thiserror::Error;

/// Top-level error type for footfall.
#[derive(Debug, Error)]
pub enum FootfallError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Rig error: {0}")]
    Rig(#[from] RigError),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_owned(),
            message: message.into(),
        }
    }
}

/// Errors raised while building or binding a rig.
///
/// Only raised at initialization. The per-tick path never fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RigError {
    #[error("Degenerate {segment} segment: length {length} is too short")]
    DegenerateSegment { segment: &'static str, length: f32 },

    #[error("Unknown parent bone index {0}")]
    UnknownParent(usize),

    #[error("Bone not found: {0}")]
    BoneNotFound(String),

    #[error("Duplicate bone name: {0}")]
    DuplicateBone(String),

    #[error("Joint is missing from the rig: {0}")]
    MissingJoint(String),
}
