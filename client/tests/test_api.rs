//! Tests for the payment schedule API client
//!
//! Uses the mock transport: local pre-checks, request shapes, response
//! envelopes, status mapping and cancellation.

use chrono::{DateTime, TimeZone, Utc};
use offer_billing_client::{
    ApiResponse, ClientError, ErrorKind, ListQuery, Method, MockTransport, PaymentScheduleApi,
    RequestScope, Session, SessionTokens, TransportError,
};
use offer_billing_core::lifecycle::{Action, ActionPayload, Outcome};
use offer_billing_core::{
    ItemFilter, ItemStatus, ItemType, ItemUpdate, NewScheduleItem, PaymentScheduleItem,
    PortalType, Role, User,
};
use serde_json::json;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn due() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 30, 0, 0, 0).unwrap()
}

fn item(status: ItemStatus) -> PaymentScheduleItem {
    PaymentScheduleItem::new("psi-1", "acc-1", "ol-1", ItemType::OneTime, 50_000, due())
        .with_status(status)
}

fn actor(role: Role) -> User {
    User::new("u-1", role, PortalType::Account).with_account("acc-1")
}

fn setup() -> (Arc<MockTransport>, PaymentScheduleApi<Arc<MockTransport>>) {
    let mock = Arc::new(MockTransport::new());
    let session = Arc::new(Session::with_tokens(SessionTokens::new("access-1", "refresh-1")));
    let api = PaymentScheduleApi::new(Arc::clone(&mock), session);
    (mock, api)
}

fn item_body(item: &PaymentScheduleItem) -> serde_json::Value {
    serde_json::to_value(item).unwrap()
}

#[tokio::test]
async fn test_approve_sends_patch_and_returns_server_copy() {
    let (mock, api) = setup();
    mock.push_json(200, json!({ "data": item_body(&item(ItemStatus::Approved)) }));

    let approved = api
        .approve(&item(ItemStatus::Pending), &actor(Role::Manager))
        .await
        .unwrap();
    assert_eq!(approved.status(), ItemStatus::Approved);

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::Patch);
    assert_eq!(requests[0].path, "payment-schedule-items/psi-1/approve");
    assert_eq!(requests[0].bearer.as_deref(), Some("access-1"));
}

#[tokio::test]
async fn test_cancel_with_empty_reason_sends_nothing() {
    let (mock, api) = setup();

    let err = api
        .cancel(&item(ItemStatus::Pending), &actor(Role::Admin), "   ")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_invalid_state_sends_nothing() {
    let (mock, api) = setup();

    let err = api
        .retire(&item(ItemStatus::Completed), &actor(Role::Admin), "duplicate")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    let err = api
        .approve(&item(ItemStatus::Approved), &actor(Role::Admin))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_manager_delete_refused_locally() {
    let (mock, api) = setup();

    let err = api
        .delete(&item(ItemStatus::Draft), &actor(Role::Manager))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Permission);
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_admin_delete_draft() {
    let (mock, api) = setup();
    mock.push(ApiResponse::new(204, ""));

    api.delete(&item(ItemStatus::Draft), &actor(Role::Admin))
        .await
        .unwrap();

    let requests = mock.requests();
    assert_eq!(requests[0].method, Method::Delete);
    assert_eq!(requests[0].path, "payment-schedule-items/psi-1");
}

#[tokio::test]
async fn test_retire_sends_trimmed_reason() {
    let (mock, api) = setup();
    let mut retired = item(ItemStatus::Retired);
    retired.updated_by = Some("u-1".to_string());
    mock.push_json(200, item_body(&retired));

    let result = api
        .retire(&item(ItemStatus::Approved), &actor(Role::User), "  replaced  ")
        .await
        .unwrap();
    assert_eq!(result.status(), ItemStatus::Retired);
    assert_eq!(mock.requests()[0].body, Some(json!({ "reason": "replaced" })));
}

#[tokio::test]
async fn test_update_puts_changed_fields() {
    let (mock, api) = setup();
    let mut edited = item(ItemStatus::Pending);
    edited.scheduled_amount = 75_000;
    mock.push_json(200, item_body(&edited));

    let result = api
        .update(
            &item(ItemStatus::Pending),
            &actor(Role::User),
            &ItemUpdate::new().amount(75_000),
        )
        .await
        .unwrap();
    assert_eq!(result.scheduled_amount, 75_000);

    let request = &mock.requests()[0];
    assert_eq!(request.method, Method::Put);
    assert_eq!(request.body, Some(json!({ "scheduledAmount": 750.0 })));
}

#[tokio::test]
async fn test_server_rejection_maps_status() {
    let (mock, api) = setup();
    mock.push_json(409, json!({ "message": "Item was approved by someone else" }));

    let err = api
        .approve(&item(ItemStatus::Pending), &actor(Role::Admin))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(
        err.notice().as_deref(),
        Some("Item was approved by someone else")
    );
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_failed_action_logs_one_warning() {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let (mock, api) = setup();
    mock.push_json(500, json!({ "error": "boom" }));
    let err = api
        .approve(&item(ItemStatus::Pending), &actor(Role::Admin))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Server);

    let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert_eq!(output.matches("WARN").count(), 1, "{output}");
    assert!(output.contains("request failed"), "{output}");
}

#[tokio::test]
async fn test_server_error_and_network_failure() {
    let (mock, api) = setup();
    mock.push_json(500, json!({ "error": "boom" }));
    mock.push_error(TransportError::Timeout {
        path: "payment-schedule-items/psi-1".to_string(),
    });

    let err = api.get("psi-1").await.unwrap_err();
    assert!(matches!(err, ClientError::Server { status: 500, .. }));
    assert!(err.is_retryable());

    let err = api.get("psi-1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
}

#[tokio::test]
async fn test_not_found() {
    let (mock, api) = setup();
    mock.push(ApiResponse::new(404, ""));
    let err = api.get("missing").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(mock.requests()[0].path, "payment-schedule-items/missing");
}

#[tokio::test]
async fn test_undecodable_body() {
    let (mock, api) = setup();
    mock.push(ApiResponse::new(200, "{\"unexpected\": true}"));
    let err = api.get("psi-1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[tokio::test]
async fn test_list_with_filters_and_total() {
    let (mock, api) = setup();
    mock.push_json(
        200,
        json!({
            "data": [item_body(&item(ItemStatus::Pending))],
            "total": 41
        }),
    );

    let query = ListQuery::new(ItemFilter::new().status(ItemStatus::Pending)).page(3, 10);
    let page = api.list(&query).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.total, 41);

    let request = &mock.requests()[0];
    assert_eq!(request.method, Method::Get);
    assert_eq!(request.query_param("status"), Some("pending"));
    assert_eq!(request.query_param("page"), Some("3"));
    assert_eq!(request.query_param("limit"), Some("10"));
}

#[tokio::test]
async fn test_create_validates_first() {
    let (mock, api) = setup();

    let milestone_without_type = NewScheduleItem::new("acc-1", "ol-1", ItemType::Milestone, 10_000, due());
    let err = api.create(&milestone_without_type).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(mock.requests().is_empty());

    mock.push_json(201, item_body(&item(ItemStatus::Draft)));
    let body = NewScheduleItem::new("acc-1", "ol-1", ItemType::OneTime, 50_000, due());
    let created = api.create(&body).await.unwrap();
    assert_eq!(created.status(), ItemStatus::Draft);
    assert_eq!(mock.requests()[0].body.as_ref().unwrap()["scheduledAmount"], 500.0);
}

#[tokio::test]
async fn test_generate_transactions_requires_selection() {
    let (mock, api) = setup();

    let none: [&str; 0] = [];
    let err = api.generate_transactions(&none).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(mock.requests().is_empty());

    mock.push_json(200, json!({ "data": { "created": 2 } }));
    let result = api.generate_transactions(&["psi-1", " ", "psi-2"]).await.unwrap();
    assert_eq!(result["created"], 2);
    assert_eq!(
        mock.requests()[0].body,
        Some(json!({ "itemIds": ["psi-1", "psi-2"] }))
    );
}

#[tokio::test]
async fn test_generate_recurring() {
    let (mock, api) = setup();
    mock.push_json(200, json!({ "generated": 5 }));
    let result = api.generate_recurring().await.unwrap();
    assert_eq!(result["generated"], 5);
    assert_eq!(
        mock.requests()[0].path,
        "payment-schedule-items/generate-recurring"
    );
}

#[tokio::test]
async fn test_perform_start() {
    let (mock, api) = setup();
    mock.push_json(200, item_body(&item(ItemStatus::InProgress)));

    let outcome = api
        .perform(
            &item(ItemStatus::Approved),
            Action::Start,
            &actor(Role::User),
            ActionPayload::none(),
        )
        .await
        .unwrap();
    assert!(matches!(outcome, Outcome::Updated(ref i) if i.status() == ItemStatus::InProgress));
    assert_eq!(mock.requests()[0].path, "payment-schedule-items/psi-1/start");
}

#[tokio::test]
async fn test_cancelled_scope_sends_nothing() {
    let (mock, api) = setup();
    let scope = RequestScope::new();
    scope.cancel();

    let result = scope.run(api.get("psi-1")).await;
    assert!(matches!(result, Err(ClientError::Cancelled)));
    assert!(mock.requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_in_flight_request() {
    let mock = Arc::new(MockTransport::new().with_delay(Duration::from_secs(5)));
    mock.push_json(200, item_body(&item(ItemStatus::Pending)));
    let api = PaymentScheduleApi::new(
        Arc::clone(&mock),
        Arc::new(Session::with_tokens(SessionTokens::new("a", "r"))),
    );

    let scope = RequestScope::new();
    let token = scope.token();
    let (result, _) = tokio::join!(scope.run(api.get("psi-1")), async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();
    });

    assert!(matches!(result, Err(ClientError::Cancelled)));
    assert_eq!(mock.requests().len(), 1);
}
