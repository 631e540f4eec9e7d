//! Domain models for payment schedules

pub mod book;
pub mod event;
pub mod filter;
pub mod payload;
pub mod schedule_item;
pub mod user;

// Re-exports
pub use book::{BookError, ScheduleBook};
pub use event::{BillingEvent, EventLog};
pub use filter::{ItemFilter, Sort, SortField, SortOrder};
pub use payload::{ItemUpdate, NewScheduleItem};
pub use schedule_item::{ItemStatus, ItemType, MilestoneType, PaymentScheduleItem, Priority};
pub use user::{Account, AccountStatus, Agency, PortalType, Role, User};
