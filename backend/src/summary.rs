//! Dashboard aggregates over schedule items
//!
//! CRITICAL: All money values are i64 (cents)

use crate::models::schedule_item::{ItemStatus, PaymentScheduleItem};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Counts and totals for a set of items at a point in time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSummary {
    pub total_items: usize,

    /// Items per status; statuses with no items are absent
    pub by_status: BTreeMap<ItemStatus, usize>,

    pub overdue_items: usize,

    /// Sum over non-terminal items (cents)
    pub outstanding_amount: i64,

    /// Sum over overdue items (cents)
    pub overdue_amount: i64,

    /// Sum over completed items (cents)
    pub completed_amount: i64,
}

impl ScheduleSummary {
    /// Aggregate `items` as of `now`
    ///
    /// # Example
    /// ```
    /// use chrono::{Duration, Utc};
    /// use offer_billing_core::summary::ScheduleSummary;
    /// use offer_billing_core::{ItemStatus, ItemType, PaymentScheduleItem};
    ///
    /// let now = Utc::now();
    /// let items = vec![
    ///     PaymentScheduleItem::new("a", "acc", "ol", ItemType::OneTime, 10_000, now - Duration::days(1))
    ///         .with_status(ItemStatus::Pending),
    ///     PaymentScheduleItem::new("b", "acc", "ol", ItemType::OneTime, 5_000, now)
    ///         .with_status(ItemStatus::Completed),
    /// ];
    ///
    /// let summary = ScheduleSummary::from_items(&items, now);
    /// assert_eq!(summary.overdue_items, 1);
    /// assert_eq!(summary.outstanding_amount, 10_000);
    /// assert_eq!(summary.completed_amount, 5_000);
    /// ```
    pub fn from_items<'a, I>(items: I, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a PaymentScheduleItem>,
    {
        let mut summary = Self::default();
        for item in items {
            summary.total_items += 1;
            *summary.by_status.entry(item.status()).or_insert(0) += 1;

            if !item.is_terminal() {
                summary.outstanding_amount += item.scheduled_amount;
            }
            if item.status() == ItemStatus::Completed {
                summary.completed_amount += item.scheduled_amount;
            }
            if item.is_overdue(now) {
                summary.overdue_items += 1;
                summary.overdue_amount += item.scheduled_amount;
            }
        }
        summary
    }

    pub fn count(&self, status: ItemStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schedule_item::ItemType;
    use chrono::Duration;

    #[test]
    fn test_empty_summary() {
        let summary = ScheduleSummary::from_items(&[], Utc::now());
        assert_eq!(summary, ScheduleSummary::default());
        assert_eq!(summary.count(ItemStatus::Draft), 0);
    }

    #[test]
    fn test_terminal_items_not_outstanding() {
        let now = Utc::now();
        let items: Vec<_> = [
            ItemStatus::Draft,
            ItemStatus::InProgress,
            ItemStatus::Cancelled,
            ItemStatus::Retired,
        ]
        .into_iter()
        .enumerate()
        .map(|(i, status)| {
            PaymentScheduleItem::new(i.to_string(), "acc", "ol", ItemType::Retainer, 1_000, now - Duration::days(3))
                .with_status(status)
        })
        .collect();

        let summary = ScheduleSummary::from_items(&items, now);
        assert_eq!(summary.total_items, 4);
        assert_eq!(summary.outstanding_amount, 2_000);
        assert_eq!(summary.overdue_items, 0); // None pending
        assert_eq!(summary.count(ItemStatus::Retired), 1);
    }
}
