//! Infrastructure layer - Technical implementations
//!
//! This layer contains:
//! - In-memory observable calls fed by the signaling layer

pub mod observable_call;

pub use observable_call::ObservableCall;
