//! Domain layer - Core business logic and rules
//!
//! This layer contains:
//! - Shared kernel: identifiers, errors, event metadata
//! - Transfer: the transfer-in-progress state machine and the call
//!   capability it observes

pub mod shared;
pub mod transfer;

// Re-export commonly used types
pub use shared::{DomainError, Result};
