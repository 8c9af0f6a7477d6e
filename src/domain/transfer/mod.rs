//! Transfer bounded context - watches an in-flight call transfer and decides
//! when the transfer screen closes

pub mod call;
pub mod display;
pub mod monitor;
pub mod subscription;
pub mod value_object;

pub use call::{FieldChange, FieldListener, TransferCall};
pub use display::TransferDisplay;
pub use monitor::{MonitorAction, MonitorSnapshot, TransferMonitor, DEFAULT_DISMISS_DELAY};
pub use subscription::StatusSubscription;
pub use value_object::{CallField, DismissTarget, TransferStatus};
