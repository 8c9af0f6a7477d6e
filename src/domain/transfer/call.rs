//! Call capability consumed by the transfer monitor
//!
//! The monitor never owns or mutates a call. It reads the caller number and
//! transfer status, and registers a listener for field-change notifications.

use crate::domain::shared::events::EventMetadata;
use crate::domain::shared::value_objects::{CallId, SubscriptionId};
use crate::domain::transfer::value_object::{CallField, TransferStatus};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Sending half a call publishes field changes into
pub type FieldListener = mpsc::UnboundedSender<FieldChange>;

/// A call whose transfer progress can be observed
#[cfg_attr(test, mockall::automock)]
pub trait TransferCall: Send + Sync {
    fn id(&self) -> CallId;

    fn caller_number(&self) -> Option<String>;

    fn transfer_status(&self) -> TransferStatus;

    /// Register `listener` for changes of `field`
    fn subscribe(&self, field: CallField, listener: FieldListener) -> SubscriptionId;

    /// Returns false when `subscription` was not registered
    fn unsubscribe(&self, subscription: SubscriptionId) -> bool;
}

/// Notification that a field of a call changed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldChange {
    pub metadata: EventMetadata,
    /// Registration the notification was delivered through
    pub subscription: SubscriptionId,
    pub call_id: CallId,
    pub field: CallField,
}

impl FieldChange {
    pub fn new(subscription: SubscriptionId, call_id: CallId, field: CallField) -> Self {
        Self {
            metadata: EventMetadata::new(event_type_name(field)),
            subscription,
            call_id,
            field,
        }
    }
}

fn event_type_name(field: CallField) -> &'static str {
    match field {
        CallField::CallerNumber => "call.caller_number_changed",
        CallField::TransferStatus => "call.transfer_status_changed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_change_tags_event_type() {
        let change = FieldChange::new(SubscriptionId::new(), CallId::new(), CallField::TransferStatus);
        assert_eq!(change.metadata.event_type, "call.transfer_status_changed");

        let change = FieldChange::new(SubscriptionId::new(), CallId::new(), CallField::CallerNumber);
        assert_eq!(change.metadata.event_type, "call.caller_number_changed");
    }
}
