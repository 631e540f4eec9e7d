//! Bearer authentication with token refresh
//!
//! # Flow
//!
//! ```text
//! 1. send request with the current access token
//! 2. 401?  -> POST auth/refresh {refreshToken}
//!             ok     -> store new tokens, replay the request once
//!             failed -> clear the session, SessionExpired
//! 3. replay 401 again -> clear the session, SessionExpired
//! ```
//!
//! Token issuance itself belongs to the backend; this module only stores
//! what it hands out.

use crate::error::ClientError;
use crate::query::decode_one;
use crate::transport::{ApiRequest, ApiResponse, Transport};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::sync::{Arc, RwLock};

pub const REFRESH_PATH: &str = "auth/refresh";

/// Access and refresh token pair
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

impl SessionTokens {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("access_token", &"[redacted]")
            .field("refresh_token", &"[redacted]")
            .finish()
    }
}

/// Shared credential store for one signed-in user
#[derive(Debug, Default)]
pub struct Session {
    tokens: RwLock<Option<SessionTokens>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: SessionTokens) -> Self {
        Self {
            tokens: RwLock::new(Some(tokens)),
        }
    }

    pub fn set(&self, tokens: SessionTokens) {
        *self.tokens.write().unwrap_or_else(|e| e.into_inner()) = Some(tokens);
    }

    /// Forget all credentials (logout)
    pub fn clear(&self) {
        *self.tokens.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().as_ref().map(|t| t.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read().as_ref().map(|t| t.refresh_token.clone())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<SessionTokens>> {
        self.tokens.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Transport wrapper that attaches the bearer token and refreshes it on 401
#[derive(Debug)]
pub struct AuthenticatedTransport<T> {
    inner: T,
    session: Arc<Session>,
}

impl<T: Transport> AuthenticatedTransport<T> {
    pub fn new(inner: T, session: Arc<Session>) -> Self {
        Self { inner, session }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Send with credentials; any response other than 401 is returned as-is
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let response = self.send_once(request.clone()).await?;
        if !response.is_unauthorized() {
            return Ok(response);
        }

        tracing::debug!(path = %request.path, "access token rejected, refreshing");
        self.refresh().await?;

        let replay = self.send_once(request).await?;
        if replay.is_unauthorized() {
            return Err(self.expire("replay after refresh was rejected"));
        }
        Ok(replay)
    }

    async fn send_once(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let request = match self.session.access_token() {
            Some(token) => request.with_bearer(token),
            None => request,
        };
        Ok(self.inner.send(request).await?)
    }

    async fn refresh(&self) -> Result<(), ClientError> {
        let Some(refresh_token) = self.session.refresh_token() else {
            return Err(self.expire("no refresh token"));
        };

        let request = ApiRequest::post(REFRESH_PATH).with_body(json!({ "refreshToken": refresh_token }));
        let response = match self.inner.send(request).await {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                return Err(self.expire(&format!("refresh returned status {}", response.status)));
            }
            Err(err) => return Err(self.expire(&err.to_string())),
        };

        match decode_one::<RefreshResponse>(&response.body) {
            Ok(tokens) => {
                self.session.set(SessionTokens {
                    access_token: tokens.access_token,
                    refresh_token: tokens.refresh_token.unwrap_or(refresh_token),
                });
                tracing::debug!("access token refreshed");
                Ok(())
            }
            Err(err) => Err(self.expire(&err.to_string())),
        }
    }

    fn expire(&self, why: &str) -> ClientError {
        tracing::warn!(reason = why, "session expired, clearing credentials");
        self.session.clear();
        ClientError::SessionExpired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_debug_is_redacted() {
        let tokens = SessionTokens::new("secret-access", "secret-refresh");
        let debug = format!("{tokens:?}");
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_session_set_and_clear() {
        let session = Session::new();
        assert!(!session.is_authenticated());

        session.set(SessionTokens::new("a", "r"));
        assert_eq!(session.access_token().as_deref(), Some("a"));
        assert_eq!(session.refresh_token().as_deref(), Some("r"));

        session.clear();
        assert_eq!(session.access_token(), None);
    }
}
