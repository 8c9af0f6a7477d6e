//! Display state derived from the monitored calls

use crate::domain::shared::error::{DomainError, Result};
use crate::domain::transfer::call::TransferCall;
use serde::{Deserialize, Serialize};

/// Text the host renders on the transfer screen
///
/// An absent line means "leave the label untouched".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferDisplay {
    pub primary_line: Option<String>,
    pub secondary_line: Option<String>,
    pub status_line: Option<String>,
}

impl TransferDisplay {
    /// Derive the display from the current calls.
    ///
    /// Pure with respect to the primary call's status and the presence of
    /// each call. Fails with [`DomainError::InvariantViolation`] when a
    /// present call has no caller number.
    pub fn derive(
        primary: Option<&dyn TransferCall>,
        secondary: Option<&dyn TransferCall>,
    ) -> Result<Self> {
        let mut display = TransferDisplay::default();

        if let Some(call) = primary {
            display.primary_line = Some(required_caller_number(call, "primary")?);
            display.status_line = Some(call.transfer_status().label().to_string());
        }

        if let Some(call) = secondary {
            display.secondary_line = Some(required_caller_number(call, "secondary")?);
        }

        Ok(display)
    }
}

fn required_caller_number(call: &dyn TransferCall, role: &str) -> Result<String> {
    call.caller_number().ok_or_else(|| {
        DomainError::InvariantViolation(format!(
            "{} call {} has no caller number",
            role,
            call.id()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::value_objects::CallId;
    use crate::domain::transfer::call::MockTransferCall;
    use crate::domain::transfer::value_object::TransferStatus;

    fn mock_call(number: Option<&str>, status: TransferStatus) -> MockTransferCall {
        let number = number.map(str::to_string);
        let mut call = MockTransferCall::new();
        call.expect_id().return_const(CallId::new());
        call.expect_caller_number().returning(move || number.clone());
        call.expect_transfer_status().return_const(status);
        call
    }

    fn derive(
        primary: Option<&MockTransferCall>,
        secondary: Option<&MockTransferCall>,
    ) -> Result<TransferDisplay> {
        TransferDisplay::derive(
            primary.map(|c| c as &dyn TransferCall),
            secondary.map(|c| c as &dyn TransferCall),
        )
    }

    #[test]
    fn test_no_calls_renders_nothing() {
        let display = derive(None, None).unwrap();
        assert_eq!(display, TransferDisplay::default());
    }

    #[test]
    fn test_status_lines() {
        let cases = [
            (TransferStatus::Unknown, "Transfer requested for"),
            (TransferStatus::Initialized, "Transfer requested for"),
            (TransferStatus::Trying, "Transfer in progress to"),
            (TransferStatus::Accepted, "Successfully connected with"),
            (TransferStatus::Rejected, "Transfer rejected for"),
        ];

        for (status, expected) in cases {
            let primary = mock_call(Some("0612345678"), status);
            let display = derive(Some(&primary), None).unwrap();
            assert_eq!(display.status_line.as_deref(), Some(expected));
            assert_eq!(display.primary_line.as_deref(), Some("0612345678"));
            assert_eq!(display.secondary_line, None);
        }
    }

    #[test]
    fn test_secondary_only() {
        let secondary = mock_call(Some("204"), TransferStatus::Unknown);
        let display = derive(None, Some(&secondary)).unwrap();

        assert_eq!(display.primary_line, None);
        assert_eq!(display.status_line, None);
        assert_eq!(display.secondary_line.as_deref(), Some("204"));
    }

    #[test]
    fn test_derive_is_idempotent() {
        let primary = mock_call(Some("201"), TransferStatus::Trying);
        let secondary = mock_call(Some("202"), TransferStatus::Unknown);

        let first = derive(Some(&primary), Some(&secondary)).unwrap();
        let second = derive(Some(&primary), Some(&secondary)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_caller_number_is_invariant_violation() {
        let primary = mock_call(None, TransferStatus::Trying);
        let err = derive(Some(&primary), None).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));

        let primary = mock_call(Some("201"), TransferStatus::Trying);
        let secondary = mock_call(None, TransferStatus::Unknown);
        let err = derive(Some(&primary), Some(&secondary)).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(msg) if msg.starts_with("secondary")));
    }
}
