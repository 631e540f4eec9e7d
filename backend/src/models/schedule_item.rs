//! Payment schedule item model
//!
//! One scheduled payment on an offer letter. Each item has:
//! - Owning account, optional agency, and offer letter
//! - Scheduled amount (i64 cents) and due date
//! - Item type (milestone, recurring, one-time, retainer) and priority
//! - Lifecycle status (Draft, Pending, Approved, InProgress, Completed,
//!   Cancelled, Retired)
//!
//! The status and the retirement/cancellation fields are only changed by
//! [`crate::lifecycle`]; everything else is plain data the backend owns.
//!
//! CRITICAL: All money values are i64 (cents)

use crate::core::money::decimal_cents;
use crate::core::time::Clock;
use crate::recurrence::RecurringSettings;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a schedule item
///
/// ```text
/// draft ──► pending ──► approved ──► in-progress ──► completed
///   │          │            │              │
///   │          └────────────┴──────────────┴──► cancelled
///   └──────────┴────────────┴──────────────┴──► retired
/// ```
///
/// `completed`, `cancelled` and `retired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemStatus {
    /// Being prepared; not yet submitted
    Draft,

    /// Submitted and awaiting approval
    Pending,

    /// Approved for billing
    Approved,

    /// Work or billing underway
    InProgress,

    /// Paid out / fulfilled
    Completed,

    /// Called off before completion
    Cancelled,

    /// Decommissioned without being cancelled
    Retired,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 7] = [
        ItemStatus::Draft,
        ItemStatus::Pending,
        ItemStatus::Approved,
        ItemStatus::InProgress,
        ItemStatus::Completed,
        ItemStatus::Cancelled,
        ItemStatus::Retired,
    ];

    /// Whether no further transition can leave this status
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ItemStatus::Completed | ItemStatus::Cancelled | ItemStatus::Retired
        )
    }

    /// Whether the item's data may still be edited
    pub fn is_editable(self) -> bool {
        matches!(self, ItemStatus::Draft | ItemStatus::Pending)
    }

    /// Wire spelling (`"in-progress"` etc.)
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Draft => "draft",
            ItemStatus::Pending => "pending",
            ItemStatus::Approved => "approved",
            ItemStatus::InProgress => "in-progress",
            ItemStatus::Completed => "completed",
            ItemStatus::Cancelled => "cancelled",
            ItemStatus::Retired => "retired",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of scheduled payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemType {
    Milestone,
    Recurring,
    OneTime,
    Retainer,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::Milestone => "milestone",
            ItemType::Recurring => "recurring",
            ItemType::OneTime => "one-time",
            ItemType::Retainer => "retainer",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Milestone kind for `ItemType::Milestone` items
///
/// Free-form on the wire; the associated constants are the values the
/// backend ships with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MilestoneType(String);

impl MilestoneType {
    pub const PROJECT_START: &'static str = "project-start";
    pub const DESIGN_APPROVAL: &'static str = "design-approval";
    pub const DEVELOPMENT_COMPLETE: &'static str = "development-complete";
    pub const TESTING_COMPLETE: &'static str = "testing-complete";
    pub const FINAL_DELIVERY: &'static str = "final-delivery";
    pub const LAUNCH: &'static str = "launch";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is one of the backend's predefined milestone kinds
    pub fn is_well_known(&self) -> bool {
        matches!(
            self.0.as_str(),
            Self::PROJECT_START
                | Self::DESIGN_APPROVAL
                | Self::DEVELOPMENT_COMPLETE
                | Self::TESTING_COMPLETE
                | Self::FINAL_DELIVERY
                | Self::LAUNCH
        )
    }
}

impl fmt::Display for MilestoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Urgency of a schedule item (ordered low → urgent)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scheduled payment on an offer letter
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use offer_billing_core::{ItemStatus, ItemType, PaymentScheduleItem, Priority};
///
/// let due = Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap();
/// let item = PaymentScheduleItem::new("psi-1", "acc-1", "offer-9", ItemType::OneTime, 250_000, due)
///     .with_priority(Priority::High);
///
/// assert_eq!(item.status(), ItemStatus::Draft);
/// assert_eq!(item.scheduled_amount, 250_000); // $2,500.00 in cents
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentScheduleItem {
    /// Opaque identifier assigned by the backend
    pub id: String,

    pub account_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency_id: Option<String>,

    pub offer_letter_id: String,

    /// Source item when this is a generated recurring occurrence
    #[serde(default, alias = "parentItem", skip_serializing_if = "Option::is_none")]
    pub parent_item_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub(crate) status: ItemStatus,

    pub item_type: ItemType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_type: Option<MilestoneType>,

    /// Amount in cents; a decimal on the wire
    #[serde(with = "decimal_cents")]
    pub scheduled_amount: i64,

    pub scheduled_due_date: DateTime<Utc>,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub is_recurring: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_settings: Option<RecurringSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) retirement_reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) retired_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) cancellation_reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PaymentScheduleItem {
    /// Create a draft item
    ///
    /// # Panics
    /// Panics if amount <= 0
    pub fn new(
        id: impl Into<String>,
        account_id: impl Into<String>,
        offer_letter_id: impl Into<String>,
        item_type: ItemType,
        scheduled_amount: i64,
        scheduled_due_date: DateTime<Utc>,
    ) -> Self {
        assert!(scheduled_amount > 0, "amount must be positive");

        Self {
            id: id.into(),
            account_id: account_id.into(),
            agency_id: None,
            offer_letter_id: offer_letter_id.into(),
            parent_item_id: None,
            title: None,
            description: None,
            notes: None,
            status: ItemStatus::Draft,
            item_type,
            milestone_type: None,
            scheduled_amount,
            scheduled_due_date,
            priority: Priority::default(),
            is_recurring: false,
            recurring_settings: None,
            retirement_reason: None,
            retired_by: None,
            cancellation_reason: None,
            created_by: None,
            updated_by: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Set the status of an item restored from the backend (builder pattern)
    ///
    /// Local transitions go through [`crate::lifecycle::apply_action`]; this
    /// exists for rebuilding server state.
    pub fn with_status(mut self, status: ItemStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_agency(mut self, agency_id: impl Into<String>) -> Self {
        self.agency_id = Some(agency_id.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_milestone(mut self, milestone_type: MilestoneType) -> Self {
        self.milestone_type = Some(milestone_type);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Mark as recurring with the given settings
    pub fn recurring(mut self, settings: RecurringSettings) -> Self {
        self.is_recurring = true;
        self.recurring_settings = Some(settings);
        self
    }

    /// Link to the recurring item this occurrence was generated from
    pub fn with_parent(mut self, parent_item_id: impl Into<String>) -> Self {
        self.parent_item_id = Some(parent_item_id.into());
        self
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    pub fn retirement_reason(&self) -> Option<&str> {
        self.retirement_reason.as_deref()
    }

    pub fn retired_by(&self) -> Option<&str> {
        self.retired_by.as_deref()
    }

    pub fn cancellation_reason(&self) -> Option<&str> {
        self.cancellation_reason.as_deref()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether this item was generated from a recurring parent
    pub fn is_occurrence(&self) -> bool {
        self.parent_item_id.is_some()
    }

    /// Check if item is overdue at `now`
    ///
    /// Derived, never stored: only a pending item whose due date is
    /// **strictly before** `now` is overdue. Once the item leaves `pending`
    /// it is never overdue again, whatever the date.
    ///
    /// # Example
    /// ```
    /// use chrono::{Duration, Utc};
    /// use offer_billing_core::{ItemStatus, ItemType, PaymentScheduleItem};
    ///
    /// let now = Utc::now();
    /// let item = PaymentScheduleItem::new("psi-1", "acc-1", "ol-1", ItemType::OneTime, 100, now - Duration::days(1))
    ///     .with_status(ItemStatus::Pending);
    /// assert!(item.is_overdue(now));
    ///
    /// let approved = item.clone().with_status(ItemStatus::Approved);
    /// assert!(!approved.is_overdue(now));
    /// ```
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == ItemStatus::Pending && self.scheduled_due_date < now
    }

    /// [`Self::is_overdue`] against a clock
    pub fn is_overdue_with(&self, clock: &impl Clock) -> bool {
        self.is_overdue(clock.now())
    }

    /// Whole days until the due date (negative once past)
    pub fn days_until_due(&self, now: DateTime<Utc>) -> i64 {
        (self.scheduled_due_date - now).num_days()
    }
}
