//! Error types for configuration loading and geometry persistence.

use crate::geo::ZoneId;

/// Error returned by [`crate::config::EngineConfig::from_json`] and
/// [`crate::config::EngineConfig::validate`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The document is not valid JSON or does not match the config shape.
    #[error("failed to parse engine config: {0}")]
    Parse(#[from] serde_json::Error),
    /// The config parsed but holds an unusable value.
    #[error("invalid engine config: {0}")]
    Invalid(String),
}

/// Failure reported by an injected [`crate::session::GeometryStore`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backend answered and refused the update.
    #[error("update rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    /// The request never produced a response.
    #[error("transport failure: {0}")]
    Transport(String),
}

/// One zone whose geometry update failed during a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneFailure {
    pub id: ZoneId,
    pub error: StoreError,
}

/// Error returned when committing an edit session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SaveError {
    /// Save was requested while no edit session is open.
    #[error("no edit session is open")]
    NotEditing,
    /// A previous save has not finished yet.
    #[error("a save is already in progress")]
    InProgress,
    /// At least one zone update failed. The session stays open.
    #[error("{} of {} zone updates failed", failed.len(), failed.len() + succeeded.len())]
    Failed { failed: Vec<ZoneFailure>, succeeded: Vec<ZoneId> },
}
