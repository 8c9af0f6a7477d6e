//! Metadata carried by domain notifications

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub event_type: String,
}

impl EventMetadata {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            event_type: event_type.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_metadata_ids_are_unique() {
        let a = EventMetadata::new("call.transfer_status_changed");
        let b = EventMetadata::new("call.transfer_status_changed");

        assert_ne!(a.event_id, b.event_id);
        assert_eq!(a.event_type, "call.transfer_status_changed");
        assert!(b.occurred_at >= a.occurred_at);
    }
}
