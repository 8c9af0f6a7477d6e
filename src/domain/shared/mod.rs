//! Shared kernel - types used by every bounded context

pub mod error;
pub mod events;
pub mod value_objects;

pub use error::{DomainError, Result};
pub use value_objects::*;
