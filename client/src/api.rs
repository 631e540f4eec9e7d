//! Payment schedule item endpoints
//!
//! Every mutation is pre-checked locally with the same lifecycle and
//! validation rules the views use. A request that fails the pre-check is
//! never sent. The backend's answer is authoritative: on success the
//! returned item replaces the local copy; on failure nothing local changes.

use crate::auth::{AuthenticatedTransport, Session};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::query::{decode_list, decode_one, ItemPage, ListQuery};
use crate::transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};
use offer_billing_core::lifecycle::{check_action, Action, ActionPayload, Outcome};
use offer_billing_core::validation::{validate_new_item, validate_selection};
use offer_billing_core::{ItemUpdate, NewScheduleItem, PaymentScheduleItem, User};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;

pub const ITEMS_PATH: &str = "payment-schedule-items";

fn item_path(id: &str) -> String {
    format!("{ITEMS_PATH}/{id}")
}

fn action_path(id: &str, action: Action) -> String {
    format!("{ITEMS_PATH}/{id}/{}", action.as_str())
}

/// Typed client for `/payment-schedule-items`
#[derive(Debug)]
pub struct PaymentScheduleApi<T> {
    transport: AuthenticatedTransport<T>,
}

impl PaymentScheduleApi<ReqwestTransport> {
    /// Client talking HTTP to the configured backend
    pub fn from_config(config: &ClientConfig, session: Arc<Session>) -> Result<Self, ClientError> {
        Ok(Self::new(ReqwestTransport::new(config)?, session))
    }
}

impl<T: Transport> PaymentScheduleApi<T> {
    pub fn new(transport: T, session: Arc<Session>) -> Self {
        Self {
            transport: AuthenticatedTransport::new(transport, session),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        self.transport.session()
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub async fn list(&self, query: &ListQuery) -> Result<ItemPage, ClientError> {
        let request = ApiRequest::get(ITEMS_PATH).with_query(query.to_pairs());
        let response = self.execute(request).await?;
        let (items, total) = decode_list(&response.body)?;
        Ok(ItemPage { items, total })
    }

    pub async fn get(&self, id: &str) -> Result<PaymentScheduleItem, ClientError> {
        self.fetch(ApiRequest::get(item_path(id))).await
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// `POST /payment-schedule-items`
    pub async fn create(&self, item: &NewScheduleItem) -> Result<PaymentScheduleItem, ClientError> {
        validate_new_item(item)?;
        let request = ApiRequest::post(ITEMS_PATH).with_body(serde_json::to_value(item)?);
        self.fetch(request).await
    }

    /// `PUT /payment-schedule-items/:id` (draft or pending only)
    pub async fn update(
        &self,
        item: &PaymentScheduleItem,
        actor: &User,
        update: &ItemUpdate,
    ) -> Result<PaymentScheduleItem, ClientError> {
        self.perform_updated(item, Action::Edit, actor, ActionPayload::update(update.clone()))
            .await
    }

    pub async fn approve(&self, item: &PaymentScheduleItem, actor: &User) -> Result<PaymentScheduleItem, ClientError> {
        self.perform_updated(item, Action::Approve, actor, ActionPayload::none())
            .await
    }

    pub async fn start(&self, item: &PaymentScheduleItem, actor: &User) -> Result<PaymentScheduleItem, ClientError> {
        self.perform_updated(item, Action::Start, actor, ActionPayload::none())
            .await
    }

    pub async fn complete(&self, item: &PaymentScheduleItem, actor: &User) -> Result<PaymentScheduleItem, ClientError> {
        self.perform_updated(item, Action::Complete, actor, ActionPayload::none())
            .await
    }

    pub async fn cancel(
        &self,
        item: &PaymentScheduleItem,
        actor: &User,
        reason: &str,
    ) -> Result<PaymentScheduleItem, ClientError> {
        self.perform_updated(item, Action::Cancel, actor, ActionPayload::reason(reason))
            .await
    }

    pub async fn retire(
        &self,
        item: &PaymentScheduleItem,
        actor: &User,
        reason: &str,
    ) -> Result<PaymentScheduleItem, ClientError> {
        self.perform_updated(item, Action::Retire, actor, ActionPayload::reason(reason))
            .await
    }

    /// `DELETE /payment-schedule-items/:id` (draft only, admin only)
    pub async fn delete(&self, item: &PaymentScheduleItem, actor: &User) -> Result<(), ClientError> {
        self.perform(item, Action::Delete, actor, ActionPayload::none())
            .await
            .map(|_| ())
    }

    /// Run any lifecycle action against the backend
    ///
    /// The action is checked locally first; only a passing action is sent.
    pub async fn perform(
        &self,
        item: &PaymentScheduleItem,
        action: Action,
        actor: &User,
        payload: ActionPayload,
    ) -> Result<Outcome, ClientError> {
        if let Err(err) = check_action(item, action, actor, &payload) {
            tracing::warn!(item_id = %item.id, %action, error = %err, "action refused before sending");
            return Err(err.into());
        }

        let request = build_action_request(item, action, &payload)?;
        let response = self.execute(request).await?;

        if action == Action::Delete {
            return Ok(Outcome::Removed {
                id: item.id.clone(),
            });
        }
        let updated: PaymentScheduleItem = decode_one(&response.body)?;
        tracing::info!(item_id = %updated.id, %action, status = %updated.status(), "action confirmed");
        Ok(Outcome::Updated(updated))
    }

    /// `POST /payment-schedule-items/generate-transactions`
    pub async fn generate_transactions<S: AsRef<str>>(&self, item_ids: &[S]) -> Result<serde_json::Value, ClientError> {
        validate_selection(item_ids)?;
        let ids: Vec<&str> = item_ids
            .iter()
            .map(|id| id.as_ref().trim())
            .filter(|id| !id.is_empty())
            .collect();
        let request = ApiRequest::post(format!("{ITEMS_PATH}/generate-transactions"))
            .with_body(json!({ "itemIds": ids }));
        self.fetch(request).await
    }

    /// `POST /payment-schedule-items/generate-recurring`
    pub async fn generate_recurring(&self) -> Result<serde_json::Value, ClientError> {
        self.fetch(ApiRequest::post(format!("{ITEMS_PATH}/generate-recurring")))
            .await
    }

    // ========================================================================
    // Plumbing
    // ========================================================================

    async fn perform_updated(
        &self,
        item: &PaymentScheduleItem,
        action: Action,
        actor: &User,
        payload: ActionPayload,
    ) -> Result<PaymentScheduleItem, ClientError> {
        match self.perform(item, action, actor, payload).await? {
            Outcome::Updated(updated) => Ok(updated),
            Outcome::Removed { id } => Err(ClientError::Decode(format!(
                "{action} unexpectedly removed item {id}"
            ))),
        }
    }

    async fn fetch<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, ClientError> {
        let response = self.execute(request).await?;
        Ok(decode_one(&response.body)?)
    }

    /// Send and turn any non-success status into an error
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let method = request.method;
        let path = request.path.clone();
        let response = self.transport.send(request).await?;
        if response.is_success() {
            return Ok(response);
        }
        let err = ClientError::from_response(response.status, &response.body);
        tracing::warn!(
            method = method.as_str(),
            %path,
            status = response.status,
            error = %err,
            "request failed"
        );
        Err(err)
    }
}

fn build_action_request(
    item: &PaymentScheduleItem,
    action: Action,
    payload: &ActionPayload,
) -> Result<ApiRequest, ClientError> {
    let request = match action {
        Action::Edit => {
            let update = payload.update.clone().unwrap_or_default();
            ApiRequest::put(item_path(&item.id)).with_body(serde_json::to_value(update)?)
        }
        Action::Delete => ApiRequest::delete(item_path(&item.id)),
        Action::Cancel | Action::Retire => {
            let reason = payload.reason.as_deref().unwrap_or_default().trim();
            ApiRequest::patch(action_path(&item.id, action)).with_body(json!({ "reason": reason }))
        }
        Action::Approve | Action::Start | Action::Complete => {
            ApiRequest::patch(action_path(&item.id, action))
        }
    };
    Ok(request)
}
