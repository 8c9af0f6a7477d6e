//! Application layer - Use cases and application services
//!
//! Runs domain state machines on tokio and connects them to their hosts.

pub mod transfer_monitor;

pub use transfer_monitor::{DismissOrigin, HostInstruction, TransferMonitorService};
