//! Recurring schedule items
//!
//! A recurring item repeats every `interval × frequency`, optionally bounded
//! by an end date and a maximum occurrence count. The backend materializes
//! occurrences (`generate-recurring`); this module computes the same dates
//! so views can preview them.
//!
//! Occurrence `n` is always computed from the first due date rather than
//! from occurrence `n - 1`, so month-end clamping never drifts
//! (Jan 31 → Feb 29 → Mar 31, not Mar 29).

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base period of a recurring item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Yearly => "yearly",
        })
    }
}

/// Recurrence rule carried by items with `is_recurring = true`
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use offer_billing_core::{Frequency, RecurringSettings};
///
/// let rule = RecurringSettings::new(Frequency::Monthly, 1).with_max_occurrences(3);
/// let start = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
///
/// let dates = rule.occurrences(start, 10);
/// assert_eq!(dates.len(), 3);
/// assert_eq!(dates[1], Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap());
/// assert_eq!(dates[2], Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringSettings {
    pub frequency: Frequency,

    /// Number of base periods between occurrences (>= 1)
    pub interval: u32,

    /// Last instant an occurrence may fall on (inclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,

    /// Cap on the total number of occurrences, first one included
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_occurrences: Option<u32>,
}

impl RecurringSettings {
    pub fn new(frequency: Frequency, interval: u32) -> Self {
        Self {
            frequency,
            interval,
            end_date: None,
            max_occurrences: None,
        }
    }

    pub fn with_end_date(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn with_max_occurrences(mut self, max: u32) -> Self {
        self.max_occurrences = Some(max);
        self
    }

    /// Date of occurrence `n` counted from `start` (occurrence 0)
    ///
    /// Ignores the end date and occurrence cap. Returns `None` on overflow
    /// or when `interval` is zero.
    pub fn nth_occurrence(&self, start: DateTime<Utc>, n: u32) -> Option<DateTime<Utc>> {
        if self.interval == 0 {
            return None;
        }
        let periods = self.interval.checked_mul(n)?;
        match self.frequency {
            Frequency::Daily => start.checked_add_signed(Duration::try_days(i64::from(periods))?),
            Frequency::Weekly => start.checked_add_signed(Duration::try_weeks(i64::from(periods))?),
            Frequency::Monthly => start.checked_add_months(Months::new(periods)),
            Frequency::Quarterly => start.checked_add_months(Months::new(periods.checked_mul(3)?)),
            Frequency::Yearly => start.checked_add_months(Months::new(periods.checked_mul(12)?)),
        }
    }

    /// Due date following `after`, or `None` once past the end date
    pub fn next_due_date(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let next = self.nth_occurrence(after, 1)?;
        self.within_end_date(next).then_some(next)
    }

    /// Up to `limit` due dates starting at `start`
    ///
    /// Honors both the end date and the occurrence cap.
    pub fn occurrences(&self, start: DateTime<Utc>, limit: usize) -> Vec<DateTime<Utc>> {
        let cap = self
            .max_occurrences
            .map_or(limit, |max| limit.min(max as usize));

        let mut dates = Vec::with_capacity(cap.min(64));
        let mut n: u32 = 0;
        while dates.len() < cap {
            let Some(date) = self.nth_occurrence(start, n) else {
                break;
            };
            if !self.within_end_date(date) {
                break;
            }
            dates.push(date);
            n = match n.checked_add(1) {
                Some(next) => next,
                None => break,
            };
        }
        dates
    }

    fn within_end_date(&self, date: DateTime<Utc>) -> bool {
        self.end_date.map_or(true, |end| date <= end)
    }
}
