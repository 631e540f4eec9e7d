//! List queries and response envelopes
//!
//! The backend answers either with a bare payload or with the payload
//! wrapped as `{"data": ...}`; list endpoints add a `total`. Both shapes
//! are accepted everywhere.

use offer_billing_core::{ItemFilter, PaymentScheduleItem, Sort};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// One page of a filtered, sorted list
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub filter: ItemFilter,
    pub sort: Sort,

    /// 1-based page number
    pub page: u32,
    pub limit: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            filter: ItemFilter::default(),
            sort: Sort::default(),
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListQuery {
    pub fn new(filter: ItemFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn sorted(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub fn page(mut self, page: u32, limit: u32) -> Self {
        self.page = page.max(1);
        self.limit = limit.max(1);
        self
    }

    /// Query-string pairs for `GET /payment-schedule-items`
    ///
    /// Multi-valued filters are comma-joined. Empty criteria are left out.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = Vec::new();
        let mut push = |key: &str, value: String| pairs.push((key.to_string(), value));

        let filter = &self.filter;
        if !filter.statuses.is_empty() {
            push("status", join(filter.statuses.iter().map(|s| s.as_str())));
        }
        if !filter.item_types.is_empty() {
            push("itemType", join(filter.item_types.iter().map(|t| t.as_str())));
        }
        if !filter.priorities.is_empty() {
            push("priority", join(filter.priorities.iter().map(|p| p.as_str())));
        }
        if let Some(from) = filter.due_from {
            push("dateFrom", from.to_rfc3339());
        }
        if let Some(to) = filter.due_to {
            push("dateTo", to.to_rfc3339());
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            push("search", search.to_string());
        }
        if filter.overdue_only {
            push("overdue", "true".to_string());
        }
        push("page", self.page.to_string());
        push("limit", self.limit.to_string());
        push("sortBy", self.sort.field.as_str().to_string());
        push("sortOrder", self.sort.order.as_str().to_string());
        pairs
    }
}

fn join<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values.collect::<Vec<_>>().join(",")
}

/// One page of schedule items plus the server-side total
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPage {
    pub items: Vec<PaymentScheduleItem>,
    pub total: u64,
}

/// Unwrap `{"data": ...}` if present
fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") && !map.contains_key("id") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Decode a single payload, bare or wrapped
pub fn decode_one<T: DeserializeOwned>(body: &str) -> Result<T, serde_json::Error> {
    let value: Value = serde_json::from_str(body)?;
    serde_json::from_value(unwrap_data(value))
}

/// Decode a list payload and its total
///
/// Accepts `[...]`, `{"items": [...], "total": n}`, `{"data": [...], "total": n}`
/// and `{"data": {"items": [...], "total": n}}`. A missing total falls back
/// to the number of items.
pub fn decode_list<T: DeserializeOwned>(body: &str) -> Result<(Vec<T>, u64), serde_json::Error> {
    let value: Value = serde_json::from_str(body)?;
    let (list, total) = split_list(value);
    let items: Vec<T> = serde_json::from_value(list)?;
    let total = total.unwrap_or(items.len() as u64);
    Ok((items, total))
}

fn split_list(value: Value) -> (Value, Option<u64>) {
    match value {
        Value::Object(mut map) => {
            let total = map.get("total").and_then(Value::as_u64);
            let list = map
                .remove("items")
                .or_else(|| map.remove("data"))
                .unwrap_or(Value::Null);
            match list {
                Value::Object(_) => {
                    let (inner, inner_total) = split_list(list);
                    (inner, inner_total.or(total))
                }
                list => (list, total),
            }
        }
        other => (other, None),
    }
}
