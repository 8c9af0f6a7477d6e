//! transfer-monitor - Coordination core for a "call transfer in progress" screen
//!
//! Watches the transfer status of a call, derives the text the screen shows,
//! and tells the host when and where to navigate once the transfer ends.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use application::{DismissOrigin, HostInstruction, TransferMonitorService};
pub use domain::shared::error::{DomainError, Result};
pub use domain::transfer::{DismissTarget, TransferCall, TransferDisplay, TransferStatus};
pub use infrastructure::ObservableCall;
