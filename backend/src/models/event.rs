//! Billing event history
//!
//! Every change the schedule book makes to an item is recorded as a
//! [`BillingEvent`]. The log answers "what happened to this item, who did
//! it, and when" for the item detail view's history panel.
//!
//! # Event Types
//!
//! - **StatusChanged**: approve, start, complete
//! - **Edited**: fields changed on a draft/pending item
//! - **Cancelled** / **Retired**: terminal transitions carrying a reason
//! - **Deleted**: draft removed
//! - **Synced**: a server copy replaced the local one with a different status
//!
//! # Example
//!
//! ```rust
//! use chrono::Utc;
//! use offer_billing_core::models::event::{BillingEvent, EventLog};
//! use offer_billing_core::ItemStatus;
//!
//! let mut log = EventLog::new();
//! log.log(BillingEvent::StatusChanged {
//!     at: Utc::now(),
//!     item_id: "psi-1".to_string(),
//!     actor_id: "u-1".to_string(),
//!     from: ItemStatus::Pending,
//!     to: ItemStatus::Approved,
//! });
//!
//! assert_eq!(log.events_for_item("psi-1").len(), 1);
//! ```

use crate::models::schedule_item::ItemStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded change to a schedule item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BillingEvent {
    /// Plain status transition (approve, start, complete)
    #[serde(rename_all = "camelCase")]
    StatusChanged {
        at: DateTime<Utc>,
        item_id: String,
        actor_id: String,
        from: ItemStatus,
        to: ItemStatus,
    },

    /// Draft or pending item edited
    #[serde(rename_all = "camelCase")]
    Edited {
        at: DateTime<Utc>,
        item_id: String,
        actor_id: String,
    },

    #[serde(rename_all = "camelCase")]
    Cancelled {
        at: DateTime<Utc>,
        item_id: String,
        actor_id: String,
        from: ItemStatus,
        reason: String,
    },

    #[serde(rename_all = "camelCase")]
    Retired {
        at: DateTime<Utc>,
        item_id: String,
        actor_id: String,
        from: ItemStatus,
        reason: String,
    },

    /// Draft removed
    #[serde(rename_all = "camelCase")]
    Deleted {
        at: DateTime<Utc>,
        item_id: String,
        actor_id: String,
    },

    /// Server copy replaced the local one and the status differed
    #[serde(rename_all = "camelCase")]
    Synced {
        at: DateTime<Utc>,
        item_id: String,
        from: ItemStatus,
        to: ItemStatus,
    },
}

impl BillingEvent {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            BillingEvent::StatusChanged { at, .. }
            | BillingEvent::Edited { at, .. }
            | BillingEvent::Cancelled { at, .. }
            | BillingEvent::Retired { at, .. }
            | BillingEvent::Deleted { at, .. }
            | BillingEvent::Synced { at, .. } => *at,
        }
    }

    pub fn item_id(&self) -> &str {
        match self {
            BillingEvent::StatusChanged { item_id, .. }
            | BillingEvent::Edited { item_id, .. }
            | BillingEvent::Cancelled { item_id, .. }
            | BillingEvent::Retired { item_id, .. }
            | BillingEvent::Deleted { item_id, .. }
            | BillingEvent::Synced { item_id, .. } => item_id,
        }
    }

    /// Acting user; `None` for server syncs
    pub fn actor_id(&self) -> Option<&str> {
        match self {
            BillingEvent::StatusChanged { actor_id, .. }
            | BillingEvent::Edited { actor_id, .. }
            | BillingEvent::Cancelled { actor_id, .. }
            | BillingEvent::Retired { actor_id, .. }
            | BillingEvent::Deleted { actor_id, .. } => Some(actor_id),
            BillingEvent::Synced { .. } => None,
        }
    }

    /// Wire name of the event kind
    pub fn event_type(&self) -> &'static str {
        match self {
            BillingEvent::StatusChanged { .. } => "status-changed",
            BillingEvent::Edited { .. } => "edited",
            BillingEvent::Cancelled { .. } => "cancelled",
            BillingEvent::Retired { .. } => "retired",
            BillingEvent::Deleted { .. } => "deleted",
            BillingEvent::Synced { .. } => "synced",
        }
    }

    /// Status the item ended in, when the event moved it
    pub fn resulting_status(&self) -> Option<ItemStatus> {
        match self {
            BillingEvent::StatusChanged { to, .. } | BillingEvent::Synced { to, .. } => Some(*to),
            BillingEvent::Cancelled { .. } => Some(ItemStatus::Cancelled),
            BillingEvent::Retired { .. } => Some(ItemStatus::Retired),
            BillingEvent::Edited { .. } | BillingEvent::Deleted { .. } => None,
        }
    }
}

/// Append-only list of billing events with simple queries
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<BillingEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log(&mut self, event: BillingEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[BillingEvent] {
        &self.events
    }

    /// History of one item, oldest first
    pub fn events_for_item(&self, item_id: &str) -> Vec<&BillingEvent> {
        self.events
            .iter()
            .filter(|e| e.item_id() == item_id)
            .collect()
    }

    pub fn events_by_actor(&self, actor_id: &str) -> Vec<&BillingEvent> {
        self.events
            .iter()
            .filter(|e| e.actor_id() == Some(actor_id))
            .collect()
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<&BillingEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Events with `from <= at < to`
    pub fn events_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<&BillingEvent> {
        self.events
            .iter()
            .filter(|e| e.at() >= from && e.at() < to)
            .collect()
    }

    /// History of one item as a JSON array (for export)
    pub fn item_history_json(&self, item_id: &str) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self.events_for_item(item_id))
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
