//! Lifecycle errors

use super::Action;
use crate::models::schedule_item::ItemStatus;
use crate::models::user::Role;
use crate::validation::ValidationError;
use std::fmt;
use thiserror::Error;

/// Why a permission check failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// Actor's role ranks below the action's minimum
    RoleTooLow { required: Role },

    /// Action is reserved for the admin role exactly
    AdminOnly,

    /// Item belongs to a tenant outside the actor's portal scope
    OutsideTenant,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denial::RoleTooLow { required } => write!(f, "requires {required} or above"),
            Denial::AdminOnly => f.write_str("requires admin"),
            Denial::OutsideTenant => f.write_str("item belongs to another tenant"),
        }
    }
}

/// Rejected lifecycle action
///
/// All variants are recoverable: the view shows the message and the user
/// re-issues the action once state or role allows it.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LifecycleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Cannot {action} an item that is {status}")]
    InvalidState { action: Action, status: ItemStatus },

    #[error("Not allowed to {action} this item: {denial}")]
    Permission { action: Action, denial: Denial },
}

impl LifecycleError {
    pub fn is_validation(&self) -> bool {
        matches!(self, LifecycleError::Validation(_))
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, LifecycleError::InvalidState { .. })
    }

    pub fn is_permission(&self) -> bool {
        matches!(self, LifecycleError::Permission { .. })
    }
}
