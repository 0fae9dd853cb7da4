//! Runner errors

use swapflow_ports::PortError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Port error: {0}")]
    Port(#[from] PortError),

    #[error("Runner task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, RunnerError>;
