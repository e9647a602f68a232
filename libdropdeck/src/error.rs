//! Error types for Dropdeck

use thiserror::Error;

use crate::types::TaskStatus;

pub type Result<T> = std::result::Result<T, DropdeckError>;

#[derive(Error, Debug)]
pub enum DropdeckError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Cannot {action} a task in status '{from}'")]
    Transition {
        from: TaskStatus,
        action: &'static str,
    },

    #[error("No task with id {0}")]
    UnknownTask(String),

    #[error("A publish is already in flight for task {0}")]
    PublishInFlight(String),

    #[error("Server error: {0}")]
    Server(String),
}

impl DropdeckError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            DropdeckError::InvalidInput(_)
            | DropdeckError::Transition { .. }
            | DropdeckError::UnknownTask(_)
            | DropdeckError::PublishInFlight(_) => 3,
            DropdeckError::Config(_)
            | DropdeckError::Store(_)
            | DropdeckError::Publish(_)
            | DropdeckError::Server(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to serialize tasks: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug, Clone)]
pub enum PublishError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream error: {0}")]
    Upstream(String),
}
