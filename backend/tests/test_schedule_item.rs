//! Tests for the schedule item model
//!
//! Wire format, money conversion, overdue derivation and dashboard summary.

use chrono::{DateTime, Duration, TimeZone, Utc};
use offer_billing_core::core::money::format_cents;
use offer_billing_core::{
    Clock, FixedClock, Frequency, ItemStatus, ItemType, MilestoneType, PaymentScheduleItem,
    Priority, ScheduleSummary,
};
use serde_json::json;

fn due() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap()
}

fn item(id: &str, status: ItemStatus, amount: i64, due: DateTime<Utc>) -> PaymentScheduleItem {
    PaymentScheduleItem::new(id, "acc-1", "ol-1", ItemType::OneTime, amount, due).with_status(status)
}

#[test]
fn test_deserialize_backend_item() {
    let body = json!({
        "id": "psi-42",
        "accountId": "acc-1",
        "agencyId": "ag-3",
        "offerLetterId": "ol-7",
        "title": "Design sign-off",
        "status": "in-progress",
        "itemType": "milestone",
        "milestoneType": "design-approval",
        "scheduledAmount": 1250.5,
        "scheduledDueDate": "2024-07-01T00:00:00Z",
        "priority": "high",
        "isRecurring": false,
        "createdBy": "u-1",
        "createdAt": "2024-06-01T09:30:00Z"
    });

    let item: PaymentScheduleItem = serde_json::from_value(body).unwrap();
    assert_eq!(item.id, "psi-42");
    assert_eq!(item.status(), ItemStatus::InProgress);
    assert_eq!(item.item_type, ItemType::Milestone);
    assert_eq!(
        item.milestone_type,
        Some(MilestoneType::new(MilestoneType::DESIGN_APPROVAL))
    );
    assert_eq!(item.scheduled_amount, 125_050);
    assert_eq!(item.scheduled_due_date, due());
    assert_eq!(item.priority, Priority::High);
    assert_eq!(item.agency_id.as_deref(), Some("ag-3"));
    assert_eq!(item.created_by.as_deref(), Some("u-1"));
}

#[test]
fn test_amount_as_string_and_defaults() {
    let body = json!({
        "id": "psi-1",
        "accountId": "acc-1",
        "offerLetterId": "ol-1",
        "status": "pending",
        "itemType": "retainer",
        "scheduledAmount": "300.00",
        "scheduledDueDate": "2024-07-01T00:00:00Z"
    });

    let item: PaymentScheduleItem = serde_json::from_value(body).unwrap();
    assert_eq!(item.scheduled_amount, 30_000);
    assert_eq!(item.priority, Priority::Medium);
    assert!(!item.is_recurring);
    assert_eq!(item.retirement_reason(), None);
}

#[test]
fn test_invalid_amount_rejected() {
    let body = json!({
        "id": "psi-1",
        "accountId": "acc-1",
        "offerLetterId": "ol-1",
        "status": "pending",
        "itemType": "retainer",
        "scheduledAmount": "lots",
        "scheduledDueDate": "2024-07-01T00:00:00Z"
    });
    assert!(serde_json::from_value::<PaymentScheduleItem>(body).is_err());
}

#[test]
fn test_unknown_status_rejected() {
    let body = json!({
        "id": "psi-1",
        "accountId": "acc-1",
        "offerLetterId": "ol-1",
        "status": "archived",
        "itemType": "one-time",
        "scheduledAmount": 10,
        "scheduledDueDate": "2024-07-01T00:00:00Z"
    });
    assert!(serde_json::from_value::<PaymentScheduleItem>(body).is_err());
}

#[test]
fn test_recurring_occurrence_fields() {
    let body = json!({
        "id": "psi-2",
        "accountId": "acc-1",
        "offerLetterId": "ol-1",
        "parentItem": "psi-1",
        "status": "pending",
        "itemType": "recurring",
        "scheduledAmount": 99.99,
        "scheduledDueDate": "2024-08-01T00:00:00Z",
        "isRecurring": true,
        "recurringSettings": { "frequency": "monthly", "interval": 1, "maxOccurrences": 12 }
    });

    let item: PaymentScheduleItem = serde_json::from_value(body).unwrap();
    assert!(item.is_occurrence());
    assert_eq!(item.parent_item_id.as_deref(), Some("psi-1"));
    assert_eq!(item.scheduled_amount, 9_999);

    let settings = item.recurring_settings.unwrap();
    assert_eq!(settings.frequency, Frequency::Monthly);
    assert_eq!(settings.max_occurrences, Some(12));
}

#[test]
fn test_serialize_uses_wire_names() {
    let item = item("psi-1", ItemStatus::Retired, 125_050, due());
    let value = serde_json::to_value(&item).unwrap();

    assert_eq!(value["status"], "retired");
    assert_eq!(value["itemType"], "one-time");
    assert_eq!(value["scheduledAmount"], 1250.5);
    assert!(value.get("agencyId").is_none());
}

#[test]
fn test_overdue_only_while_pending() {
    let later = due() + Duration::days(3);
    for status in ItemStatus::ALL {
        let expected = status == ItemStatus::Pending;
        assert_eq!(
            item("psi", status, 100, due()).is_overdue(later),
            expected,
            "{status}"
        );
    }
}

#[test]
fn test_overdue_with_clock() {
    let clock = FixedClock::new(due() - Duration::hours(1));
    let pending = item("psi", ItemStatus::Pending, 100, due());
    assert!(!pending.is_overdue_with(&clock));

    clock.advance(Duration::hours(2));
    assert!(pending.is_overdue_with(&clock));
    assert_eq!(pending.days_until_due(clock.now()), 0);
}

#[test]
fn test_summary_totals() {
    let now = due();
    let items = vec![
        item("a", ItemStatus::Pending, 10_000, now - Duration::days(2)),
        item("b", ItemStatus::Pending, 5_000, now + Duration::days(2)),
        item("c", ItemStatus::Approved, 7_500, now - Duration::days(9)),
        item("d", ItemStatus::Completed, 20_000, now - Duration::days(30)),
        item("e", ItemStatus::Cancelled, 1_000, now - Duration::days(30)),
    ];

    let summary = ScheduleSummary::from_items(&items, now);
    assert_eq!(summary.total_items, 5);
    assert_eq!(summary.count(ItemStatus::Pending), 2);
    assert_eq!(summary.overdue_items, 1);
    assert_eq!(summary.overdue_amount, 10_000);
    assert_eq!(summary.outstanding_amount, 22_500);
    assert_eq!(summary.completed_amount, 20_000);
    assert_eq!(format_cents(summary.outstanding_amount), "225.00");
}

#[test]
fn test_summary_json_shape() {
    let items = vec![item("a", ItemStatus::InProgress, 100, due())];
    let value = serde_json::to_value(ScheduleSummary::from_items(&items, due())).unwrap();
    assert_eq!(value["totalItems"], 1);
    assert_eq!(value["byStatus"]["in-progress"], 1);
}
