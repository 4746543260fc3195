use thiserror::Error;

/// Errors surfaced by construction, configuration and calibration.
///
/// Input handlers never return these; failures inside a handler are logged
/// and the event degrades to "no motion".
#[derive(Debug, Error)]
pub enum NavError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Rejected base step calibration from diagonal {diagonal}")]
    InvalidCalibration { diagonal: f32 },

    #[error("Rejected base step size {0}")]
    InvalidStep(f32),

    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure of an asynchronous scene intersection query.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryError {
    #[error("Scene query failed: {0}")]
    Failed(String),

    #[error("Scene query was cancelled")]
    Cancelled,
}
