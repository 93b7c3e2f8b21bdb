//! Error types for the tactical engine.

use thiserror::Error;

/// Which entity table a failed lookup targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Vehicle,
    Obstacle,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Vehicle => f.write_str("vehicle"),
            EntityKind::Obstacle => f.write_str("obstacle"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkywatchError {
    /// Geometry or input that would make a projection undefined.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },

    /// The view has not received enough configuration to project anything yet.
    #[error("{0} view is not configured")]
    Unconfigured(&'static str),

    /// Malformed JSON, either a telemetry snapshot or a config file.
    #[error("decode error: {0}")]
    Decode(String),
}

impl SkywatchError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        SkywatchError::InvalidConfig(message.into())
    }

    pub fn vehicle_not_found(id: &str) -> Self {
        SkywatchError::NotFound {
            kind: EntityKind::Vehicle,
            id: id.to_string(),
        }
    }

    pub fn obstacle_not_found(id: &str) -> Self {
        SkywatchError::NotFound {
            kind: EntityKind::Obstacle,
            id: id.to_string(),
        }
    }
}

impl From<serde_json::Error> for SkywatchError {
    fn from(e: serde_json::Error) -> Self {
        SkywatchError::Decode(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SkywatchError>;
