//! Listener registration on the primary call's transfer status

use crate::domain::shared::value_objects::{CallId, SubscriptionId};
use crate::domain::transfer::call::{FieldChange, FieldListener, TransferCall};
use crate::domain::transfer::value_object::CallField;
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

/// A live `transferStatus` registration held by one monitor.
///
/// Only the holder may close it. The call is referenced weakly so the
/// subscription never keeps a finished call alive.
pub struct StatusSubscription {
    call: Weak<dyn TransferCall>,
    call_id: CallId,
    id: SubscriptionId,
}

impl StatusSubscription {
    /// Register `listener` for transfer status changes of `call`
    pub fn open(call: &Arc<dyn TransferCall>, listener: FieldListener) -> Self {
        let id = call.subscribe(CallField::TransferStatus, listener);
        let call_id = call.id();
        debug!("Subscribed {} to transferStatus of call {}", id, call_id);

        Self {
            call: Arc::downgrade(call),
            call_id,
            id,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn call_id(&self) -> CallId {
        self.call_id
    }

    /// Whether `change` was delivered through this registration
    pub fn accepts(&self, change: &FieldChange) -> bool {
        change.subscription == self.id
            && change.call_id == self.call_id
            && change.field == CallField::TransferStatus
    }

    /// Unregister from the call, if it still exists
    pub fn close(self) {
        match self.call.upgrade() {
            Some(call) => {
                if call.unsubscribe(self.id) {
                    debug!("Unsubscribed {} from call {}", self.id, self.call_id);
                } else {
                    warn!(
                        "Subscription {} was no longer registered on call {}",
                        self.id, self.call_id
                    );
                }
            }
            None => debug!(
                "Call {} already released, dropping subscription {}",
                self.call_id, self.id
            ),
        }
    }
}
