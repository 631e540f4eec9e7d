//! Client-side input validation
//!
//! Every check here runs before a request is built. A failure is a
//! [`ValidationError`] that the view shows inline next to the offending
//! field; nothing is sent to the backend.

use crate::models::payload::{ItemUpdate, NewScheduleItem};
use crate::models::schedule_item::{ItemType, MilestoneType, PaymentScheduleItem};
use crate::recurrence::RecurringSettings;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Input rejected before any network call
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("A reason is required to {action} this item")]
    ReasonRequired { action: &'static str },

    #[error("Scheduled amount must be positive, got {amount} cents")]
    NonPositiveAmount { amount: i64 },

    #[error("Milestone items require a milestone type")]
    MilestoneTypeRequired,

    #[error("Milestone type only applies to milestone items, not {item_type}")]
    MilestoneTypeNotAllowed { item_type: ItemType },

    #[error("Recurring items require recurring settings")]
    RecurringSettingsRequired,

    #[error("Recurrence interval must be at least 1")]
    InvalidInterval,

    #[error("Maximum occurrences must be at least 1")]
    InvalidMaxOccurrences,

    #[error("Recurrence end date {end_date} is before the first due date {first_due}")]
    EndDateBeforeStart {
        end_date: DateTime<Utc>,
        first_due: DateTime<Utc>,
    },

    #[error("Commission split must be between 0 and 100, got {value}")]
    CommissionSplitOutOfRange { value: f64 },

    #[error("Select at least one item")]
    EmptySelection,
}

/// Trimmed, non-empty reason or [`ValidationError::ReasonRequired`]
///
/// # Example
/// ```
/// use offer_billing_core::validation::{require_reason, ValidationError};
///
/// assert_eq!(require_reason(Some("  duplicate  "), "retire"), Ok("duplicate".to_string()));
/// assert_eq!(
///     require_reason(Some("   "), "cancel"),
///     Err(ValidationError::ReasonRequired { action: "cancel" })
/// );
/// assert!(require_reason(None, "retire").is_err());
/// ```
pub fn require_reason(reason: Option<&str>, action: &'static str) -> Result<String, ValidationError> {
    match reason.map(str::trim) {
        Some(r) if !r.is_empty() => Ok(r.to_string()),
        _ => Err(ValidationError::ReasonRequired { action }),
    }
}

pub fn validate_amount(cents: i64) -> Result<(), ValidationError> {
    if cents <= 0 {
        return Err(ValidationError::NonPositiveAmount { amount: cents });
    }
    Ok(())
}

/// Milestone type must be present exactly when the item is a milestone
pub fn validate_milestone(
    item_type: ItemType,
    milestone_type: Option<&MilestoneType>,
) -> Result<(), ValidationError> {
    match (item_type, milestone_type) {
        (ItemType::Milestone, None) => Err(ValidationError::MilestoneTypeRequired),
        (ItemType::Milestone, Some(m)) if m.as_str().trim().is_empty() => {
            Err(ValidationError::MilestoneTypeRequired)
        }
        (ItemType::Milestone, Some(_)) => Ok(()),
        (other, Some(_)) => Err(ValidationError::MilestoneTypeNotAllowed { item_type: other }),
        (_, None) => Ok(()),
    }
}

pub fn validate_recurring_settings(
    settings: &RecurringSettings,
    first_due: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if settings.interval < 1 {
        return Err(ValidationError::InvalidInterval);
    }
    if settings.max_occurrences == Some(0) {
        return Err(ValidationError::InvalidMaxOccurrences);
    }
    if let Some(end_date) = settings.end_date {
        if end_date < first_due {
            return Err(ValidationError::EndDateBeforeStart {
                end_date,
                first_due,
            });
        }
    }
    Ok(())
}

/// Agency commission split, as a percentage
pub fn validate_commission_split(value: f64) -> Result<(), ValidationError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(ValidationError::CommissionSplitOutOfRange { value });
    }
    Ok(())
}

/// Validate a create payload
pub fn validate_new_item(item: &NewScheduleItem) -> Result<(), ValidationError> {
    validate_amount(item.scheduled_amount)?;
    validate_milestone(item.item_type, item.milestone_type.as_ref())?;

    if item.is_recurring {
        let settings = item
            .recurring_settings
            .as_ref()
            .ok_or(ValidationError::RecurringSettingsRequired)?;
        validate_recurring_settings(settings, item.scheduled_due_date)?;
    }
    Ok(())
}

/// Validate an update against the item it will be merged into
///
/// Checks the merged result, so e.g. moving the due date past an existing
/// recurrence end date is caught.
pub fn validate_update(item: &PaymentScheduleItem, update: &ItemUpdate) -> Result<(), ValidationError> {
    if let Some(amount) = update.scheduled_amount {
        validate_amount(amount)?;
    }

    let milestone_type = update.milestone_type.as_ref().or(item.milestone_type.as_ref());
    if update.milestone_type.is_some() {
        validate_milestone(item.item_type, milestone_type)?;
    }

    if item.is_recurring {
        let first_due = update.scheduled_due_date.unwrap_or(item.scheduled_due_date);
        let settings = update
            .recurring_settings
            .as_ref()
            .or(item.recurring_settings.as_ref())
            .ok_or(ValidationError::RecurringSettingsRequired)?;
        validate_recurring_settings(settings, first_due)?;
    }
    Ok(())
}

/// Item selection for bulk operations such as transaction generation
pub fn validate_selection<S: AsRef<str>>(ids: &[S]) -> Result<(), ValidationError> {
    if ids.iter().all(|id| id.as_ref().trim().is_empty()) {
        return Err(ValidationError::EmptySelection);
    }
    Ok(())
}
