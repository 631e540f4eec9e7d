//! Tests for bearer authentication and refresh-on-401

use offer_billing_client::auth::REFRESH_PATH;
use offer_billing_client::{
    ApiRequest, ApiResponse, AuthenticatedTransport, ClientError, Method, MockTransport, Session,
    SessionTokens, TransportError,
};
use serde_json::json;
use std::sync::Arc;

fn setup(session: Session) -> (Arc<MockTransport>, Arc<Session>, AuthenticatedTransport<Arc<MockTransport>>) {
    let mock = Arc::new(MockTransport::new());
    let session = Arc::new(session);
    let transport = AuthenticatedTransport::new(Arc::clone(&mock), Arc::clone(&session));
    (mock, session, transport)
}

fn signed_in() -> Session {
    Session::with_tokens(SessionTokens::new("old-access", "refresh-1"))
}

#[tokio::test]
async fn test_success_passes_through() {
    let (mock, _session, transport) = setup(signed_in());
    mock.push_json(200, json!({ "id": "psi-1" }));

    let response = transport
        .send(ApiRequest::get("payment-schedule-items/psi-1"))
        .await
        .unwrap();
    assert_eq!(response.status, 200);

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].bearer.as_deref(), Some("old-access"));
}

#[tokio::test]
async fn test_non_auth_errors_are_not_refreshed() {
    let (mock, session, transport) = setup(signed_in());
    mock.push_json(403, json!({ "message": "forbidden" }));

    let response = transport
        .send(ApiRequest::get("payment-schedule-items"))
        .await
        .unwrap();
    assert_eq!(response.status, 403);
    assert_eq!(mock.requests().len(), 1);
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn test_refresh_then_replay() {
    let (mock, session, transport) = setup(signed_in());
    mock.push(ApiResponse::new(401, ""));
    mock.push_json(200, json!({ "data": { "accessToken": "new-access" } }));
    mock.push_json(200, json!({ "id": "psi-1" }));

    let response = transport
        .send(ApiRequest::patch("payment-schedule-items/psi-1/approve"))
        .await
        .unwrap();
    assert_eq!(response.status, 200);

    let requests = mock.requests();
    assert_eq!(requests.len(), 3);

    let refresh = &requests[1];
    assert_eq!(refresh.method, Method::Post);
    assert_eq!(refresh.path, REFRESH_PATH);
    assert_eq!(refresh.body, Some(json!({ "refreshToken": "refresh-1" })));

    let replay = &requests[2];
    assert_eq!(replay.path, "payment-schedule-items/psi-1/approve");
    assert_eq!(replay.bearer.as_deref(), Some("new-access"));

    // Refresh token kept when the server does not rotate it
    assert_eq!(session.access_token().as_deref(), Some("new-access"));
    assert_eq!(session.refresh_token().as_deref(), Some("refresh-1"));
}

#[tokio::test]
async fn test_rotated_refresh_token_is_stored() {
    let (mock, session, transport) = setup(signed_in());
    mock.push(ApiResponse::new(401, ""));
    mock.push_json(200, json!({ "accessToken": "a2", "refreshToken": "r2" }));
    mock.push_json(200, json!([]));

    transport
        .send(ApiRequest::get("payment-schedule-items"))
        .await
        .unwrap();
    assert_eq!(session.access_token().as_deref(), Some("a2"));
    assert_eq!(session.refresh_token().as_deref(), Some("r2"));
}

#[tokio::test]
async fn test_failed_refresh_expires_session() {
    let (mock, session, transport) = setup(signed_in());
    mock.push(ApiResponse::new(401, ""));
    mock.push_json(401, json!({ "message": "refresh token revoked" }));

    let err = transport
        .send(ApiRequest::get("payment-schedule-items"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));
    assert!(!session.is_authenticated());
    // No replay after a failed refresh
    assert_eq!(mock.requests().len(), 2);
}

#[tokio::test]
async fn test_refresh_network_failure_expires_session() {
    let (mock, session, transport) = setup(signed_in());
    mock.push(ApiResponse::new(401, ""));
    mock.push_error(TransportError::Failed {
        path: REFRESH_PATH.to_string(),
        message: "connection reset".to_string(),
    });

    let err = transport
        .send(ApiRequest::get("payment-schedule-items"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_replay_rejected_expires_session() {
    let (mock, session, transport) = setup(signed_in());
    mock.push(ApiResponse::new(401, ""));
    mock.push_json(200, json!({ "accessToken": "new-access" }));
    mock.push(ApiResponse::new(401, ""));

    let err = transport
        .send(ApiRequest::get("payment-schedule-items"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));
    assert!(!session.is_authenticated());
    assert_eq!(mock.requests().len(), 3);
}

#[tokio::test]
async fn test_no_session_sends_without_bearer() {
    let (mock, _session, transport) = setup(Session::new());
    mock.push(ApiResponse::new(401, ""));

    let err = transport
        .send(ApiRequest::get("payment-schedule-items"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].bearer, None);
}

#[tokio::test]
async fn test_transport_error_is_network() {
    let (mock, session, transport) = setup(signed_in());
    mock.push_error(TransportError::Timeout {
        path: "payment-schedule-items".to_string(),
    });

    let err = transport
        .send(ApiRequest::get("payment-schedule-items"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
    assert!(session.is_authenticated());
}
