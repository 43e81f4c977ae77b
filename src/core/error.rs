use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoxError {
    #[error("NLU error: {0}")]
    Nlu(String),

    /// Transport failure talking to a remote store
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, VoxError>;
