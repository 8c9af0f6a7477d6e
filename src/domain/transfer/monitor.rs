//! Transfer monitor state machine
//!
//! The monitor turns host lifecycle calls, status notifications and the
//! dismissal timer into [`MonitorAction`]s. It performs no I/O and owns no
//! timer itself; the caller applies the returned actions, in order, on a
//! single serialization point.

use crate::domain::shared::error::Result;
use crate::domain::transfer::call::{FieldChange, FieldListener, TransferCall};
use crate::domain::transfer::display::TransferDisplay;
use crate::domain::transfer::subscription::StatusSubscription;
use crate::domain::transfer::value_object::{DismissTarget, TransferStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Delay between the first terminal status and the automatic dismissal
pub const DEFAULT_DISMISS_DELAY: Duration = Duration::from_secs(2);

/// Effect requested by the monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorAction {
    /// Show this text
    Render(TransferDisplay),
    /// Call [`TransferMonitor::on_dismiss_timer`] once after this delay
    ScheduleDismiss(Duration),
    /// Close the screen
    Dismiss(DismissTarget),
}

/// Point-in-time view of the monitor's internal state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorSnapshot {
    pub active: bool,
    pub subscribed: bool,
    pub dismiss_scheduled: bool,
    pub dismiss_fired: bool,
    pub has_primary_call: bool,
    pub has_secondary_call: bool,
    pub primary_status: Option<TransferStatus>,
}

/// Coordinates the transfer-in-progress screen
pub struct TransferMonitor {
    /// Shared with the host and the signaling layer; never mutated here
    primary_call: Option<Arc<dyn TransferCall>>,
    secondary_call: Option<Arc<dyn TransferCall>>,
    /// Handed to the primary call on every subscription
    listener: FieldListener,
    subscription: Option<StatusSubscription>,
    active: bool,
    dismiss_delay: Duration,
    /// Latched once; never reset
    dismiss_scheduled: bool,
    dismiss_fired: bool,
}

impl TransferMonitor {
    /// Create a monitor with no calls set
    pub fn new(dismiss_delay: Duration, listener: FieldListener) -> Self {
        Self {
            primary_call: None,
            secondary_call: None,
            listener,
            subscription: None,
            active: false,
            dismiss_delay,
            dismiss_scheduled: false,
            dismiss_fired: false,
        }
    }

    /// Replace the primary call and re-render.
    ///
    /// A call that cannot be rendered is rejected and the previous call stays
    /// in place. While active, the status subscription follows the new call.
    pub fn set_primary_call(
        &mut self,
        call: Option<Arc<dyn TransferCall>>,
    ) -> Result<Vec<MonitorAction>> {
        let display = TransferDisplay::derive(call.as_deref(), self.secondary_call.as_deref())?;
        self.primary_call = call;

        if self.active {
            self.sync_subscription();
        }

        Ok(vec![MonitorAction::Render(display)])
    }

    /// Replace the secondary call and re-render.
    ///
    /// A call that cannot be rendered is rejected and the previous call stays
    /// in place.
    pub fn set_secondary_call(
        &mut self,
        call: Option<Arc<dyn TransferCall>>,
    ) -> Result<Vec<MonitorAction>> {
        let display = TransferDisplay::derive(self.primary_call.as_deref(), call.as_deref())?;
        self.secondary_call = call;
        Ok(vec![MonitorAction::Render(display)])
    }

    /// The screen became visible
    pub fn activate(&mut self) -> Result<Vec<MonitorAction>> {
        if self.active {
            debug!("Transfer monitor already active");
        }
        self.active = true;
        self.sync_subscription();

        let mut actions = vec![MonitorAction::Render(self.render()?)];
        actions.extend(self.evaluate_dismissal());
        Ok(actions)
    }

    /// The screen is going away. An armed dismissal stays armed.
    pub fn deactivate(&mut self) {
        self.active = false;

        if let Some(subscription) = self.subscription.take() {
            subscription.close();
        }
    }

    /// A notification arrived from the subscription adapter
    pub fn on_status_changed(&mut self, change: &FieldChange) -> Result<Vec<MonitorAction>> {
        let accepted = self.active
            && self
                .subscription
                .as_ref()
                .map(|subscription| subscription.accepts(change))
                .unwrap_or(false);

        if !accepted {
            debug!(
                "Ignoring {} {} via {} for call {} (sent {})",
                change.metadata.event_type,
                change.metadata.event_id,
                change.subscription,
                change.call_id,
                change.metadata.occurred_at
            );
            return Ok(Vec::new());
        }

        let mut actions = vec![MonitorAction::Render(self.render()?)];
        actions.extend(self.evaluate_dismissal());
        Ok(actions)
    }

    /// The delay requested by [`MonitorAction::ScheduleDismiss`] elapsed.
    ///
    /// The target is chosen from the primary call's status now, not the
    /// status that armed the timer.
    pub fn on_dismiss_timer(&mut self) -> Option<MonitorAction> {
        if !self.dismiss_scheduled || self.dismiss_fired {
            warn!("Dismiss timer fired without a pending dismissal");
            return None;
        }
        self.dismiss_fired = true;

        let status = self.primary_call.as_ref().map(|call| call.transfer_status());
        let target = DismissTarget::for_status(status);
        info!("Dismissing transfer screen ({:?}, status {:?})", target, status);

        Some(MonitorAction::Dismiss(target))
    }

    /// The user pressed back; independent of the automatic dismissal
    pub fn back_pressed(&self) -> DismissTarget {
        info!("Transfer screen dismissed by user");
        DismissTarget::UnwindOnce
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            active: self.active,
            subscribed: self.subscription.is_some(),
            dismiss_scheduled: self.dismiss_scheduled,
            dismiss_fired: self.dismiss_fired,
            has_primary_call: self.primary_call.is_some(),
            has_secondary_call: self.secondary_call.is_some(),
            primary_status: self.primary_call.as_ref().map(|call| call.transfer_status()),
        }
    }

    /// Current display derived from the calls
    pub fn render(&self) -> Result<TransferDisplay> {
        TransferDisplay::derive(self.primary_call.as_deref(), self.secondary_call.as_deref())
    }

    /// Point the subscription at the current primary call
    fn sync_subscription(&mut self) {
        if let (Some(subscription), Some(call)) = (&self.subscription, &self.primary_call) {
            if subscription.call_id() == call.id() {
                return;
            }
        }

        if let Some(subscription) = self.subscription.take() {
            subscription.close();
        }

        if let Some(call) = &self.primary_call {
            self.subscription = Some(StatusSubscription::open(call, self.listener.clone()));
        }
    }

    fn evaluate_dismissal(&mut self) -> Option<MonitorAction> {
        let status = self.primary_call.as_ref()?.transfer_status();

        if !status.is_terminal() || self.dismiss_scheduled {
            return None;
        }

        self.dismiss_scheduled = true;
        info!(
            "Transfer {}, dismissing in {:?}",
            status, self.dismiss_delay
        );

        Some(MonitorAction::ScheduleDismiss(self.dismiss_delay))
    }
}
