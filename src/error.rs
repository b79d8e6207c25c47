//! Error types for EchoLab

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EchoLabError {
    #[error("Invalid room configuration: {0}")]
    InvalidRoom(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Engine error: {0}")]
    Engine(String),
}

pub type Result<T> = std::result::Result<T, EchoLabError>;
