use thiserror::Error;

#[derive(Error, Debug)]
pub enum GoalcastError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Upstream API unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Missing team statistics for match {match_id}")]
    MissingStatistics { match_id: String },

    #[error("Model artifacts unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Data integrity failure for match {match_id}: {reason}")]
    DataIntegrity { match_id: String, reason: String },

    #[error("Settled result not yet available for match {match_id}")]
    ResultUnavailable { match_id: String },

    #[error("Persistence conflict for match {match_id}")]
    PersistenceConflict { match_id: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GoalcastError {
    /// Errors that abort the whole run before any writes happen.
    /// Everything else is handled at per-fixture granularity.
    pub fn is_fatal_for_run(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::ModelUnavailable(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, GoalcastError>;
