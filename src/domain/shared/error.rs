//! Domain errors

use thiserror::Error;

/// Domain result type
pub type Result<T> = std::result::Result<T, DomainError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An external object broke a precondition the monitor relies on
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Transfer monitor stopped")]
    MonitorStopped,
}
