use thiserror::Error;

#[derive(Debug, Error)]
pub enum TmsError {
    #[error("not initialized: no .cortexrc found, run 'cortex-tms init'")]
    NotInitialized,

    #[error("invalid tier '{0}': expected HOT, WARM, or COLD")]
    InvalidTier(String),

    #[error("invalid scope '{0}': expected nano, standard, or enterprise")]
    InvalidScope(String),

    #[error("invalid glob '{pattern}': {reason}")]
    InvalidGlob { pattern: String, reason: String },

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TmsError>;
