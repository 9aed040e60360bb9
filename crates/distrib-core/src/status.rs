//! # Sale Status Machine
//!
//! The closed set of sale statuses and the single transition table every
//! lifecycle operation is checked against.
//!
//! ## Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Draft ──submit──► Pending ──confirm──► Confirmed ──complete──► Completed
//! │     │                  │                    │                     ┊     │
//! │     │                  │                    │                (reserved) │
//! │     └──────cancel──────┴───────cancel───────┘                     ┊     │
//! │                        ▼                                       Refunded │
//! │                    Cancelled                                            │
//! │                                                                         │
//! │   Edits (items, customer, notes, discount, tax): Draft | Pending only   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Refunded` is only reachable from `Completed` and no operation in this
//! engine produces it; it belongs to a separate refund workflow.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Sale Status
// =============================================================================

/// Lifecycle status of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Created, items being assembled.
    Draft,
    /// Submitted for confirmation, still editable.
    Pending,
    /// Stock reserved against the inventory ledger.
    Confirmed,
    /// Delivered/closed. Terminal for normal flow.
    Completed,
    /// Abandoned. Any reservation was released.
    Cancelled,
    /// Reserved for the refund workflow.
    Refunded,
}

impl SaleStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [SaleStatus; 6] = [
        SaleStatus::Draft,
        SaleStatus::Pending,
        SaleStatus::Confirmed,
        SaleStatus::Completed,
        SaleStatus::Cancelled,
        SaleStatus::Refunded,
    ];

    /// Statuses directly reachable from `self`.
    pub const fn next_statuses(self) -> &'static [SaleStatus] {
        match self {
            SaleStatus::Draft => &[SaleStatus::Pending, SaleStatus::Cancelled],
            SaleStatus::Pending => &[SaleStatus::Confirmed, SaleStatus::Cancelled],
            SaleStatus::Confirmed => &[SaleStatus::Completed, SaleStatus::Cancelled],
            SaleStatus::Completed => &[SaleStatus::Refunded],
            SaleStatus::Cancelled | SaleStatus::Refunded => &[],
        }
    }

    /// Whether the table allows `self -> next`.
    pub fn can_transition_to(self, next: SaleStatus) -> bool {
        self.next_statuses().contains(&next)
    }

    /// Items and sale fields may only change in these statuses.
    pub const fn is_editable(self) -> bool {
        matches!(self, SaleStatus::Draft | SaleStatus::Pending)
    }

    /// True when the sale currently holds stock in the ledger.
    pub const fn holds_reservation(self) -> bool {
        matches!(self, SaleStatus::Confirmed)
    }

    pub const fn is_terminal(self) -> bool {
        self.next_statuses().is_empty() || matches!(self, SaleStatus::Completed)
    }

    /// Lowercase storage name, as persisted in `sales.status`.
    pub const fn as_str(self) -> &'static str {
        match self {
            SaleStatus::Draft => "draft",
            SaleStatus::Pending => "pending",
            SaleStatus::Confirmed => "confirmed",
            SaleStatus::Completed => "completed",
            SaleStatus::Cancelled => "cancelled",
            SaleStatus::Refunded => "refunded",
        }
    }
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Draft
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SaleStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SaleStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: SaleStatus::ALL.iter().map(|s| s.to_string()).collect(),
            })
    }
}

// =============================================================================
// Sale Operation
// =============================================================================

/// An operation that is gated on the sale's current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleOperation {
    /// Item add/update/remove and sale field edits.
    Edit,
    Submit,
    Confirm,
    Complete,
    Cancel,
}

impl SaleOperation {
    /// The status the operation moves the sale into, if it is a transition.
    pub const fn target(self) -> Option<SaleStatus> {
        match self {
            SaleOperation::Edit => None,
            SaleOperation::Submit => Some(SaleStatus::Pending),
            SaleOperation::Confirm => Some(SaleStatus::Confirmed),
            SaleOperation::Complete => Some(SaleStatus::Completed),
            SaleOperation::Cancel => Some(SaleStatus::Cancelled),
        }
    }

    /// Statuses in which the operation is permitted, derived from the
    /// transition table.
    pub fn permitted_from(self) -> Vec<SaleStatus> {
        match self.target() {
            None => SaleStatus::ALL
                .into_iter()
                .filter(|s| s.is_editable())
                .collect(),
            Some(target) => SaleStatus::ALL
                .into_iter()
                .filter(|s| s.can_transition_to(target))
                .collect(),
        }
    }

    /// Whether the operation may run while the sale is in `status`.
    pub fn is_permitted_in(self, status: SaleStatus) -> bool {
        match self.target() {
            None => status.is_editable(),
            Some(target) => status.can_transition_to(target),
        }
    }
}

impl fmt::Display for SaleOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SaleOperation::Edit => "edit",
            SaleOperation::Submit => "submit",
            SaleOperation::Confirm => "confirm",
            SaleOperation::Complete => "complete",
            SaleOperation::Cancel => "cancel",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        assert!(SaleStatus::Draft.can_transition_to(SaleStatus::Pending));
        assert!(SaleStatus::Pending.can_transition_to(SaleStatus::Confirmed));
        assert!(SaleStatus::Confirmed.can_transition_to(SaleStatus::Completed));
        assert!(SaleStatus::Completed.can_transition_to(SaleStatus::Refunded));

        assert!(!SaleStatus::Draft.can_transition_to(SaleStatus::Confirmed));
        assert!(!SaleStatus::Completed.can_transition_to(SaleStatus::Cancelled));
        assert!(!SaleStatus::Cancelled.can_transition_to(SaleStatus::Draft));
        assert!(SaleStatus::Refunded.next_statuses().is_empty());
    }

    #[test]
    fn test_cancel_permitted_from() {
        assert_eq!(
            SaleOperation::Cancel.permitted_from(),
            vec![SaleStatus::Draft, SaleStatus::Pending, SaleStatus::Confirmed]
        );
        assert!(!SaleOperation::Cancel.is_permitted_in(SaleStatus::Refunded));
    }

    #[test]
    fn test_edit_permitted_from() {
        assert_eq!(
            SaleOperation::Edit.permitted_from(),
            vec![SaleStatus::Draft, SaleStatus::Pending]
        );
        for status in [SaleStatus::Confirmed, SaleStatus::Completed, SaleStatus::Cancelled] {
            assert!(!SaleOperation::Edit.is_permitted_in(status));
        }
    }

    #[test]
    fn test_confirm_only_from_pending() {
        assert_eq!(SaleOperation::Confirm.permitted_from(), vec![SaleStatus::Pending]);
        assert_eq!(SaleOperation::Complete.permitted_from(), vec![SaleStatus::Confirmed]);
        assert_eq!(SaleOperation::Submit.permitted_from(), vec![SaleStatus::Draft]);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(SaleStatus::Completed.is_terminal());
        assert!(SaleStatus::Cancelled.is_terminal());
        assert!(SaleStatus::Refunded.is_terminal());
        assert!(!SaleStatus::Pending.is_terminal());
    }

    #[test]
    fn test_parse_round_trip_names() {
        assert_eq!("CONFIRMED".parse::<SaleStatus>().unwrap(), SaleStatus::Confirmed);
        assert_eq!(" pending ".parse::<SaleStatus>().unwrap(), SaleStatus::Pending);
        assert!("shipped".parse::<SaleStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&SaleStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
    }
}
