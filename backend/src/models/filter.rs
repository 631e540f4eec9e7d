//! Filters and sort order for schedule item lists
//!
//! The same filter drives the backend list query (serialized into query
//! parameters by the client crate) and local queries over the schedule
//! book, so a list view filters identically online and from cache.

use crate::models::schedule_item::{ItemStatus, ItemType, PaymentScheduleItem, Priority};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Criteria a listed item must meet; empty criteria match everything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFilter {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statuses: Vec<ItemStatus>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub item_types: Vec<ItemType>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub priorities: Vec<Priority>,

    /// Due on or after
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_from: Option<DateTime<Utc>>,

    /// Due on or before
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_to: Option<DateTime<Utc>>,

    /// Case-insensitive match on id, title, description and milestone type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    #[serde(default)]
    pub overdue_only: bool,
}

impl ItemFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: ItemStatus) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn item_type(mut self, item_type: ItemType) -> Self {
        self.item_types.push(item_type);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priorities.push(priority);
        self
    }

    pub fn due_between(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.due_from = Some(from);
        self.due_to = Some(to);
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn overdue_only(mut self) -> Self {
        self.overdue_only = true;
        self
    }

    pub fn matches(&self, item: &PaymentScheduleItem, now: DateTime<Utc>) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(&item.status()) {
            return false;
        }
        if !self.item_types.is_empty() && !self.item_types.contains(&item.item_type) {
            return false;
        }
        if !self.priorities.is_empty() && !self.priorities.contains(&item.priority) {
            return false;
        }
        if self.due_from.is_some_and(|from| item.scheduled_due_date < from) {
            return false;
        }
        if self.due_to.is_some_and(|to| item.scheduled_due_date > to) {
            return false;
        }
        if self.overdue_only && !item.is_overdue(now) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => search_matches(item, needle),
            _ => true,
        }
    }
}

fn search_matches(item: &PaymentScheduleItem, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    let haystacks = [
        Some(item.id.as_str()),
        item.title.as_deref(),
        item.description.as_deref(),
        item.milestone_type.as_ref().map(|m| m.as_str()),
    ];
    haystacks
        .into_iter()
        .flatten()
        .any(|text| text.to_lowercase().contains(&needle))
}

/// Column to sort a list by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    ScheduledDueDate,
    ScheduledAmount,
    Priority,
    Status,
    CreatedAt,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::ScheduledDueDate => "scheduledDueDate",
            SortField::ScheduledAmount => "scheduledAmount",
            SortField::Priority => "priority",
            SortField::Status => "status",
            SortField::CreatedAt => "createdAt",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Sort field plus direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

impl Sort {
    pub fn asc(field: SortField) -> Self {
        Self {
            field,
            order: SortOrder::Asc,
        }
    }

    pub fn desc(field: SortField) -> Self {
        Self {
            field,
            order: SortOrder::Desc,
        }
    }

    /// Compare two items; ties fall back to id so order is stable
    pub fn compare(&self, a: &PaymentScheduleItem, b: &PaymentScheduleItem) -> Ordering {
        let primary = match self.field {
            SortField::ScheduledDueDate => a.scheduled_due_date.cmp(&b.scheduled_due_date),
            SortField::ScheduledAmount => a.scheduled_amount.cmp(&b.scheduled_amount),
            SortField::Priority => a.priority.cmp(&b.priority),
            SortField::Status => a.status().cmp(&b.status()),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        let primary = match self.order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}
