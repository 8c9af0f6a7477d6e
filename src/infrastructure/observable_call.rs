//! In-memory call publishing field changes to registered listeners
//!
//! The signaling layer owns an `ObservableCall` and writes REFER progress into
//! it; transfer monitors read it through [`TransferCall`].

use crate::domain::shared::value_objects::{CallId, SubscriptionId};
use crate::domain::transfer::call::{FieldChange, FieldListener, TransferCall};
use crate::domain::transfer::value_object::{CallField, TransferStatus};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};
use tracing::debug;

struct Listener {
    field: CallField,
    sender: FieldListener,
}

/// Call whose caller number and transfer status can be observed
pub struct ObservableCall {
    id: CallId,
    caller_number: RwLock<Option<String>>,
    transfer_status: RwLock<TransferStatus>,
    listeners: Mutex<HashMap<SubscriptionId, Listener>>,
}

impl ObservableCall {
    pub fn new(caller_number: Option<String>) -> Self {
        Self::with_status(caller_number, TransferStatus::Unknown)
    }

    pub fn with_status(caller_number: Option<String>, transfer_status: TransferStatus) -> Self {
        Self {
            id: CallId::new(),
            caller_number: RwLock::new(caller_number),
            transfer_status: RwLock::new(transfer_status),
            listeners: Mutex::new(HashMap::new()),
        }
    }

    /// Update the transfer status.
    ///
    /// Every assignment is published, including one that repeats the
    /// current value.
    pub fn set_transfer_status(&self, status: TransferStatus) {
        let previous = {
            let mut current = self
                .transfer_status
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *current, status)
        };

        debug!("Call {} transfer status {} -> {}", self.id, previous, status);
        self.notify(CallField::TransferStatus);
    }

    /// Apply the status code of a REFER progress notification
    pub fn apply_refer_progress(&self, status_code: u16) -> TransferStatus {
        let status = TransferStatus::from_refer_progress(status_code);
        self.set_transfer_status(status);
        status
    }

    pub fn set_caller_number(&self, caller_number: Option<String>) {
        *self
            .caller_number
            .write()
            .unwrap_or_else(PoisonError::into_inner) = caller_number;
        self.notify(CallField::CallerNumber);
    }

    /// Number of registered listeners across all fields
    pub fn listener_count(&self) -> usize {
        self.listeners().len()
    }

    fn listeners(&self) -> MutexGuard<'_, HashMap<SubscriptionId, Listener>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, field: CallField) {
        let mut listeners = self.listeners();

        // Listeners whose receiver is gone are pruned
        listeners.retain(|subscription, listener| {
            if listener.field != field {
                return true;
            }

            let change = FieldChange::new(*subscription, self.id, field);
            let delivered = listener.sender.send(change).is_ok();
            if !delivered {
                debug!("Pruning closed listener {} on call {}", subscription, self.id);
            }
            delivered
        });
    }
}

impl TransferCall for ObservableCall {
    fn id(&self) -> CallId {
        self.id
    }

    fn caller_number(&self) -> Option<String> {
        self.caller_number
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn transfer_status(&self) -> TransferStatus {
        *self
            .transfer_status
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn subscribe(&self, field: CallField, listener: FieldListener) -> SubscriptionId {
        let subscription = SubscriptionId::new();
        self.listeners().insert(
            subscription,
            Listener {
                field,
                sender: listener,
            },
        );
        subscription
    }

    fn unsubscribe(&self, subscription: SubscriptionId) -> bool {
        self.listeners().remove(&subscription).is_some()
    }
}
