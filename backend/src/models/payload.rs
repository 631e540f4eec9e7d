//! Request payloads for creating and editing schedule items
//!
//! These mirror the JSON bodies of `POST /payment-schedule-items` and
//! `PUT /payment-schedule-items/:id`. Both are validated client-side with
//! [`crate::validation`] before anything is sent.

use crate::core::money::{decimal_cents, decimal_cents_opt};
use crate::models::schedule_item::{ItemType, MilestoneType, PaymentScheduleItem, Priority};
use crate::recurrence::RecurringSettings;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of a create request
///
/// The backend assigns the id, the initial status (draft or pending) and
/// all audit fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScheduleItem {
    pub account_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency_id: Option<String>,

    pub offer_letter_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub item_type: ItemType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_type: Option<MilestoneType>,

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
    pub notes: Option<String>,
}

impl NewScheduleItem {
    pub fn new(
        account_id: impl Into<String>,
        offer_letter_id: impl Into<String>,
        item_type: ItemType,
        scheduled_amount: i64,
        scheduled_due_date: DateTime<Utc>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            agency_id: None,
            offer_letter_id: offer_letter_id.into(),
            title: None,
            description: None,
            item_type,
            milestone_type: None,
            scheduled_amount,
            scheduled_due_date,
            priority: Priority::default(),
            is_recurring: false,
            recurring_settings: None,
            notes: None,
        }
    }

    pub fn with_agency(mut self, agency_id: impl Into<String>) -> Self {
        self.agency_id = Some(agency_id.into());
        self
    }

    pub fn with_milestone(mut self, milestone_type: MilestoneType) -> Self {
        self.milestone_type = Some(milestone_type);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn recurring(mut self, settings: RecurringSettings) -> Self {
        self.is_recurring = true;
        self.recurring_settings = Some(settings);
        self
    }

    /// Local draft for a form preview, before the backend assigns an id
    ///
    /// The id is a random UUID and never sent to the backend.
    ///
    /// # Panics
    /// Panics if the amount is not positive; run
    /// [`crate::validation::validate_new_item`] first.
    pub fn preview_draft(&self, created_by: &str, now: DateTime<Utc>) -> PaymentScheduleItem {
        let mut item = PaymentScheduleItem::new(
            uuid::Uuid::new_v4().to_string(),
            self.account_id.clone(),
            self.offer_letter_id.clone(),
            self.item_type,
            self.scheduled_amount,
            self.scheduled_due_date,
        );
        item.agency_id = self.agency_id.clone();
        item.title = self.title.clone();
        item.description = self.description.clone();
        item.notes = self.notes.clone();
        item.milestone_type = self.milestone_type.clone();
        item.priority = self.priority;
        item.is_recurring = self.is_recurring;
        item.recurring_settings = self.recurring_settings.clone();
        item.created_by = Some(created_by.to_string());
        item.created_at = Some(now);
        item
    }
}

/// Partial update for an editable (draft/pending) item
///
/// `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(
        default,
        with = "decimal_cents_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub scheduled_amount: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_due_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_type: Option<MilestoneType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_settings: Option<RecurringSettings>,
}

impl ItemUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn amount(mut self, cents: i64) -> Self {
        self.scheduled_amount = Some(cents);
        self
    }

    pub fn due_date(mut self, due: DateTime<Utc>) -> Self {
        self.scheduled_due_date = Some(due);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn milestone(mut self, milestone_type: MilestoneType) -> Self {
        self.milestone_type = Some(milestone_type);
        self
    }

    pub fn recurring_settings(mut self, settings: RecurringSettings) -> Self {
        self.recurring_settings = Some(settings);
        self
    }

    /// Whether applying this update would change nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge into `item`, leaving status and audit fields alone
    pub(crate) fn merge_into(&self, item: &mut PaymentScheduleItem) {
        if let Some(title) = &self.title {
            item.title = Some(title.clone());
        }
        if let Some(description) = &self.description {
            item.description = Some(description.clone());
        }
        if let Some(notes) = &self.notes {
            item.notes = Some(notes.clone());
        }
        if let Some(amount) = self.scheduled_amount {
            item.scheduled_amount = amount;
        }
        if let Some(due) = self.scheduled_due_date {
            item.scheduled_due_date = due;
        }
        if let Some(priority) = self.priority {
            item.priority = priority;
        }
        if let Some(milestone_type) = &self.milestone_type {
            item.milestone_type = Some(milestone_type.clone());
        }
        if let Some(settings) = &self.recurring_settings {
            item.recurring_settings = Some(settings.clone());
        }
    }
}
