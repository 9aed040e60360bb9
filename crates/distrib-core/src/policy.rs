//! # Access Policy
//!
//! Capability checks for sale operations. Role resolution and
//! authentication happen upstream; this module only answers "may this
//! actor perform this action on a sale owned by that user?".
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  (actor, action, owner_id) ──► AccessPolicy::authorize ──► Ok | Denied  │
//! │                                                                         │
//! │  RoleOwnershipPolicy:                                                   │
//! │    Admin, Manager  → any sale                                           │
//! │    Salesperson     → only sales where owner_id == actor.user_id         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Actor
// =============================================================================

/// Role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Manager,
    Salesperson,
}

impl Role {
    /// Elevated roles act on every sale.
    pub const fn is_elevated(self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

/// The authenticated caller of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub user_id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Actor {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Actor::new(user_id, Role::Admin)
    }

    pub fn manager(user_id: impl Into<String>) -> Self {
        Actor::new(user_id, Role::Manager)
    }

    pub fn salesperson(user_id: impl Into<String>) -> Self {
        Actor::new(user_id, Role::Salesperson)
    }
}

/// What the actor is trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleAction {
    View,
    Create,
    Edit,
    Submit,
    Confirm,
    Complete,
    Cancel,
}

impl fmt::Display for SaleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SaleAction::View => "view",
            SaleAction::Create => "create",
            SaleAction::Edit => "edit",
            SaleAction::Submit => "submit",
            SaleAction::Confirm => "confirm",
            SaleAction::Complete => "complete",
            SaleAction::Cancel => "cancel",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Policy
// =============================================================================

/// Decides whether an actor may act on a sale.
///
/// Implementations must be pure: they are called inside open transactions.
pub trait AccessPolicy: Send + Sync {
    /// `sale_id` is only used for the error detail.
    fn authorize(
        &self,
        actor: &Actor,
        action: SaleAction,
        sale_id: &str,
        owner_id: &str,
    ) -> CoreResult<()>;

    /// When true, listings are restricted to the actor's own sales.
    fn restrict_to_own(&self, actor: &Actor) -> bool;
}

/// Elevated roles see everything; salespeople only their own sales.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleOwnershipPolicy;

impl AccessPolicy for RoleOwnershipPolicy {
    fn authorize(
        &self,
        actor: &Actor,
        action: SaleAction,
        sale_id: &str,
        owner_id: &str,
    ) -> CoreResult<()> {
        if actor.role.is_elevated() || actor.user_id == owner_id {
            return Ok(());
        }

        Err(CoreError::PermissionDenied {
            user_id: actor.user_id.clone(),
            action: action.to_string(),
            sale_id: sale_id.to_string(),
        })
    }

    fn restrict_to_own(&self, actor: &Actor) -> bool {
        !actor.role.is_elevated()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
