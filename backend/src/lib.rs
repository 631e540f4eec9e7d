//! Offer Billing Core
//!
//! Lifecycle and permission rules for payment schedule items on offer
//! letters, shared by every view of the billing client.
//!
//! # Architecture
//!
//! - **core**: Time source and money handling
//! - **models**: Domain types (PaymentScheduleItem, User, BillingEvent, ScheduleBook)
//! - **lifecycle**: Status transitions and action checks
//! - **permission**: Role-rank and portal-scope permission gate
//! - **validation**: Client-side input checks
//! - **recurrence**: Recurring due-date computation
//! - **summary**: Dashboard aggregates
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 (cents)
//! 2. Status never leaves a terminal state (completed, cancelled, retired)
//! 3. Every check is a pure function of already-fetched state

// Module declarations
pub mod core;
pub mod lifecycle;
pub mod models;
pub mod permission;
pub mod recurrence;
pub mod summary;
pub mod validation;

// Re-exports for convenience
pub use crate::core::time::{Clock, FixedClock, SystemClock};
pub use lifecycle::{
    allowed_actions, apply_action, Action, ActionPayload, Denial, LifecycleError, Outcome,
};
pub use models::{
    book::{BookError, ScheduleBook},
    event::{BillingEvent, EventLog},
    filter::{ItemFilter, Sort, SortField, SortOrder},
    payload::{ItemUpdate, NewScheduleItem},
    schedule_item::{ItemStatus, ItemType, MilestoneType, PaymentScheduleItem, Priority},
    user::{Account, AccountStatus, Agency, PortalType, Role, User},
};
pub use permission::{can_delete_user, can_manage, can_manage_user, Access, EntityKind, Field, Subject};
pub use recurrence::{Frequency, RecurringSettings};
pub use summary::ScheduleSummary;
pub use validation::ValidationError;
