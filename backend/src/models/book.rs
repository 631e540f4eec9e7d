//! Schedule book
//!
//! Local projection of the schedule items a view has fetched, plus the
//! billing event history of every change made through it. All list,
//! detail and form views read from one book instead of re-deriving
//! state.
//!
//! # Critical Invariants
//!
//! 1. **Item Uniqueness**: Each item ID appears exactly once
//! 2. **Monotonic Status**: No change, local or from the server, moves an
//!    item backwards along the lifecycle graph or out of a terminal status
//! 3. **Logged Changes**: Every applied action appends exactly one event

use crate::core::time::Clock;
use crate::lifecycle::{self, Action, ActionPayload, LifecycleError, Outcome};
use crate::models::event::{BillingEvent, EventLog};
use crate::models::filter::{ItemFilter, Sort};
use crate::models::schedule_item::{ItemStatus, PaymentScheduleItem};
use crate::models::user::User;
use crate::summary::ScheduleSummary;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Errors from schedule book operations
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BookError {
    #[error("Unknown schedule item: {0}")]
    UnknownItem(String),

    #[error("Schedule item {0} already exists")]
    DuplicateItem(String),

    #[error("Stale copy of {id}: {incoming} would move it back from {current}")]
    StaleStatus {
        id: String,
        current: ItemStatus,
        incoming: ItemStatus,
    },

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

/// Position along the lifecycle graph; terminal statuses share the top
fn progress(status: ItemStatus) -> u8 {
    match status {
        ItemStatus::Draft => 0,
        ItemStatus::Pending => 1,
        ItemStatus::Approved => 2,
        ItemStatus::InProgress => 3,
        ItemStatus::Completed | ItemStatus::Cancelled | ItemStatus::Retired => 4,
    }
}

/// Whether replacing `current` with `incoming` would break monotonicity
pub fn is_regression(current: ItemStatus, incoming: ItemStatus) -> bool {
    if current.is_terminal() {
        return incoming != current;
    }
    progress(incoming) < progress(current)
}

/// Fetched schedule items and their event history
///
/// # Example
///
/// ```rust
/// use chrono::Utc;
/// use offer_billing_core::lifecycle::{Action, ActionPayload};
/// use offer_billing_core::models::book::ScheduleBook;
/// use offer_billing_core::{
///     ItemStatus, ItemType, PaymentScheduleItem, PortalType, Role, SystemClock, User,
/// };
///
/// let mut book = ScheduleBook::new();
/// book.insert(
///     PaymentScheduleItem::new("psi-1", "acc-1", "ol-1", ItemType::OneTime, 10_000, Utc::now())
///         .with_status(ItemStatus::Pending),
/// )
/// .unwrap();
///
/// let manager = User::new("m-1", Role::Manager, PortalType::Account).with_account("acc-1");
/// book.apply("psi-1", Action::Approve, &manager, &ActionPayload::none(), &SystemClock)
///     .unwrap();
///
/// assert_eq!(book.get("psi-1").unwrap().status(), ItemStatus::Approved);
/// assert_eq!(book.events().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScheduleBook {
    items: BTreeMap<String, PaymentScheduleItem>,
    events: EventLog,
}

impl ScheduleBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a book from a fetched page
    pub fn from_items<I>(items: I) -> Result<Self, BookError>
    where
        I: IntoIterator<Item = PaymentScheduleItem>,
    {
        let mut book = Self::new();
        for item in items {
            book.insert(item)?;
        }
        Ok(book)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&PaymentScheduleItem> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    /// All items in id order
    pub fn items(&self) -> impl Iterator<Item = &PaymentScheduleItem> {
        self.items.values()
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Add a new item
    pub fn insert(&mut self, item: PaymentScheduleItem) -> Result<(), BookError> {
        if self.items.contains_key(&item.id) {
            return Err(BookError::DuplicateItem(item.id));
        }
        self.items.insert(item.id.clone(), item);
        Ok(())
    }

    /// Store a server-confirmed copy, inserting it if new
    ///
    /// A copy whose status would move the item backwards is a stale
    /// response and is refused. A status change is logged as a sync event.
    pub fn sync(&mut self, item: PaymentScheduleItem, clock: &impl Clock) -> Result<(), BookError> {
        if let Some(current) = self.items.get(&item.id) {
            let (from, to) = (current.status(), item.status());
            if is_regression(from, to) {
                tracing::warn!(item_id = %item.id, %from, %to, "ignoring stale schedule item");
                return Err(BookError::StaleStatus {
                    id: item.id,
                    current: from,
                    incoming: to,
                });
            }
            if from != to {
                self.events.log(BillingEvent::Synced {
                    at: clock.now(),
                    item_id: item.id.clone(),
                    from,
                    to,
                });
            }
        }
        self.items.insert(item.id.clone(), item);
        Ok(())
    }

    /// Drop an item without recording an event (e.g. it left the query)
    pub fn evict(&mut self, id: &str) -> Option<PaymentScheduleItem> {
        self.items.remove(id)
    }

    /// Actions the actor may take on a stored item
    pub fn allowed_actions(&self, id: &str, actor: &User) -> Result<BTreeSet<Action>, BookError> {
        let item = self.require(id)?;
        Ok(lifecycle::allowed_actions(item, actor))
    }

    /// Apply an action to a stored item and record it
    ///
    /// Returns the updated item, or `None` when the action deleted it. On
    /// error the book is unchanged.
    pub fn apply(
        &mut self,
        id: &str,
        action: Action,
        actor: &User,
        payload: &ActionPayload,
        clock: &impl Clock,
    ) -> Result<Option<&PaymentScheduleItem>, BookError> {
        let current = self.require(id)?;
        let from = current.status();
        let outcome = lifecycle::apply_action(current, action, actor, payload)?;

        let at = clock.now();
        let actor_id = actor.id.clone();
        let item_id = id.to_string();

        match outcome {
            Outcome::Removed { id } => {
                self.items.remove(&id);
                self.events.log(BillingEvent::Deleted {
                    at,
                    item_id,
                    actor_id,
                });
                Ok(None)
            }
            Outcome::Updated(updated) => {
                let event = match action {
                    Action::Edit => BillingEvent::Edited {
                        at,
                        item_id,
                        actor_id,
                    },
                    Action::Cancel => BillingEvent::Cancelled {
                        at,
                        item_id,
                        actor_id,
                        from,
                        reason: updated.cancellation_reason().unwrap_or_default().to_string(),
                    },
                    Action::Retire => BillingEvent::Retired {
                        at,
                        item_id,
                        actor_id,
                        from,
                        reason: updated.retirement_reason().unwrap_or_default().to_string(),
                    },
                    _ => BillingEvent::StatusChanged {
                        at,
                        item_id,
                        actor_id,
                        from,
                        to: updated.status(),
                    },
                };
                self.events.log(event);

                let id = updated.id.clone();
                self.items.insert(id.clone(), updated);
                Ok(self.items.get(&id))
            }
        }
    }

    /// Items matching the filter, in the given order
    pub fn query(&self, filter: &ItemFilter, sort: Sort, now: DateTime<Utc>) -> Vec<&PaymentScheduleItem> {
        let mut items: Vec<_> = self
            .items
            .values()
            .filter(|item| filter.matches(item, now))
            .collect();
        items.sort_by(|a, b| sort.compare(a, b));
        items
    }

    /// Overdue items, most overdue first
    pub fn overdue(&self, now: DateTime<Utc>) -> Vec<&PaymentScheduleItem> {
        let mut items: Vec<_> = self.items.values().filter(|i| i.is_overdue(now)).collect();
        items.sort_by(|a, b| {
            a.scheduled_due_date
                .cmp(&b.scheduled_due_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        items
    }

    /// Generated occurrences of a recurring item
    pub fn occurrences_of(&self, parent_id: &str) -> Vec<&PaymentScheduleItem> {
        let mut items: Vec<_> = self
            .items
            .values()
            .filter(|i| i.parent_item_id.as_deref() == Some(parent_id))
            .collect();
        items.sort_by_key(|i| i.scheduled_due_date);
        items
    }

    pub fn summary(&self, now: DateTime<Utc>) -> ScheduleSummary {
        ScheduleSummary::from_items(self.items.values(), now)
    }

    fn require(&self, id: &str) -> Result<&PaymentScheduleItem, BookError> {
        self.items
            .get(id)
            .ok_or_else(|| BookError::UnknownItem(id.to_string()))
    }
}
