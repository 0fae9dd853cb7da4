use thiserror::Error;

/// Errors raised at the infrastructure boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortError {
    #[error("No exchange rate available for {0}")]
    RateUnavailable(String),

    #[error("Trade {0} has no leg with both amount and currency")]
    NoNotional(String),

    #[error("Replay source unavailable: {0}")]
    ReplayUnavailable(String),

    #[error("Replay data malformed: {0}")]
    ReplayMalformed(String),
}

pub type PortResult<T> = std::result::Result<T, PortError>;
