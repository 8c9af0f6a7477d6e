//! Transfer value objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// Progress of an attended/blind transfer as reported by the signaling layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    /// No transfer information received yet
    #[default]
    Unknown,
    /// Transfer request created but not yet sent
    Initialized,
    /// Transfer target is being contacted
    Trying,
    /// Transfer target answered
    Accepted,
    /// Transfer failed or was declined
    Rejected,
}

impl TransferStatus {
    /// Accepted and Rejected end the transfer; nothing follows them
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStatus::Accepted | TransferStatus::Rejected)
    }

    /// Status line shown above the primary call's number
    pub fn label(&self) -> &'static str {
        match self {
            TransferStatus::Unknown | TransferStatus::Initialized => "Transfer requested for",
            TransferStatus::Trying => "Transfer in progress to",
            TransferStatus::Accepted => "Successfully connected with",
            TransferStatus::Rejected => "Transfer rejected for",
        }
    }

    /// Map the status code carried in a REFER progress notification
    /// (`message/sipfrag` body) onto a transfer status.
    pub fn from_refer_progress(status_code: u16) -> Self {
        match status_code {
            100..=199 => TransferStatus::Trying,
            200..=299 => TransferStatus::Accepted,
            300..=699 => TransferStatus::Rejected,
            _ => TransferStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Unknown => "unknown",
            TransferStatus::Initialized => "initialized",
            TransferStatus::Trying => "trying",
            TransferStatus::Accepted => "accepted",
            TransferStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the host should navigate when the transfer screen closes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DismissTarget {
    /// Back one level, to the primary call screen
    UnwindOnce,
    /// Back two levels, to the secondary call screen
    UnwindPast,
}

impl DismissTarget {
    /// Choose the target from the primary call's status when the dismissal fires
    pub fn for_status(status: Option<TransferStatus>) -> Self {
        match status {
            Some(TransferStatus::Rejected) => DismissTarget::UnwindPast,
            _ => DismissTarget::UnwindOnce,
        }
    }

    /// Number of screens popped off the navigation stack
    pub fn depth(&self) -> usize {
        match self {
            DismissTarget::UnwindOnce => 1,
            DismissTarget::UnwindPast => 2,
        }
    }
}

/// Observable attributes of a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallField {
    #[serde(rename = "callerNumber")]
    CallerNumber,
    #[serde(rename = "transferStatus")]
    TransferStatus,
}

impl CallField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallField::CallerNumber => "callerNumber",
            CallField::TransferStatus => "transferStatus",
        }
    }
}

impl fmt::Display for CallField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(TransferStatus::Accepted.is_terminal());
        assert!(TransferStatus::Rejected.is_terminal());
        assert!(!TransferStatus::Unknown.is_terminal());
        assert!(!TransferStatus::Initialized.is_terminal());
        assert!(!TransferStatus::Trying.is_terminal());
    }

    #[test]
    fn test_unknown_and_initialized_share_label() {
        assert_eq!(TransferStatus::Unknown.label(), "Transfer requested for");
        assert_eq!(
            TransferStatus::Unknown.label(),
            TransferStatus::Initialized.label()
        );
        assert_eq!(TransferStatus::Trying.label(), "Transfer in progress to");
        assert_eq!(TransferStatus::Accepted.label(), "Successfully connected with");
        assert_eq!(TransferStatus::Rejected.label(), "Transfer rejected for");
    }

    #[test]
    fn test_refer_progress_mapping() {
        assert_eq!(TransferStatus::from_refer_progress(100), TransferStatus::Trying);
        assert_eq!(TransferStatus::from_refer_progress(180), TransferStatus::Trying);
        assert_eq!(TransferStatus::from_refer_progress(200), TransferStatus::Accepted);
        assert_eq!(TransferStatus::from_refer_progress(486), TransferStatus::Rejected);
        assert_eq!(TransferStatus::from_refer_progress(603), TransferStatus::Rejected);
        assert_eq!(TransferStatus::from_refer_progress(0), TransferStatus::Unknown);
    }

    #[test]
    fn test_dismiss_target_for_status() {
        assert_eq!(
            DismissTarget::for_status(Some(TransferStatus::Rejected)),
            DismissTarget::UnwindPast
        );
        assert_eq!(
            DismissTarget::for_status(Some(TransferStatus::Accepted)),
            DismissTarget::UnwindOnce
        );
        assert_eq!(DismissTarget::for_status(None), DismissTarget::UnwindOnce);
        assert_eq!(DismissTarget::UnwindPast.depth(), 2);
    }

    #[test]
    fn test_call_field_wire_name() {
        assert_eq!(CallField::TransferStatus.to_string(), "transferStatus");
        let json = serde_json::to_string(&CallField::TransferStatus).unwrap();
        assert_eq!(json, "\"transferStatus\"");
    }
}
