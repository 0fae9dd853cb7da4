//! Analytics errors

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("Arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error("Insufficient data for {0}")]
    InsufficientData(&'static str),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
