//! Authenticated request pipeline.
//!
//! Every outbound call goes through [`AuthPipeline::send`], which attaches the
//! stored access token, and on a 401 performs one silent refresh followed by
//! one replay of the original call. When the session cannot be recovered the
//! tokens are cleared and the caller gets [`ApiError::SessionExpired`].
//!
//! ```text
//! INIT -> SENDING -> SUCCESS
//!                 -> AUTH_FAILED -> REFRESHING -> REPLAY -> SUCCESS | FAILED
//!                                              -> SESSION_EXPIRED
//! ```

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, Response, StatusCode};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::auth::{TokenKind, TokenRefresh, TokenStore};

use super::ApiError;

/// Path of the token refresh endpoint, relative to the API base URL.
pub const REFRESH_PATH: &str = "/token/refresh";

/// How a request relates to the refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Ordinary call; may trigger one refresh and replay.
    Standard,
    /// Second attempt after a refresh. Never retried again.
    Replay,
    /// The refresh call itself. Never triggers another refresh.
    TokenRefresh,
}

impl RequestKind {
    pub fn may_refresh(&self) -> bool {
        matches!(self, RequestKind::Standard)
    }
}

/// A replayable description of an outbound call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub kind: RequestKind,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            kind: RequestKind::Standard,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    fn token_refresh(refresh_token: &str) -> Self {
        Self {
            kind: RequestKind::TokenRefresh,
            ..Self::post(REFRESH_PATH, json!({ "refresh": refresh_token }))
        }
    }

    fn into_replay(self) -> Self {
        Self {
            kind: RequestKind::Replay,
            ..self
        }
    }
}

/// Wraps the HTTP client with bearer injection and one-shot session recovery.
pub struct AuthPipeline {
    client: Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
    // Held for the duration of a refresh so concurrent 401s share one refresh call
    refresh_gate: Mutex<()>,
}

impl AuthPipeline {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        store: Arc<dyn TokenStore>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url, store))
    }

    /// Build a pipeline around an existing client, sharing its connection pool.
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        store: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
            refresh_gate: Mutex::new(()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send one HTTP exchange. Transport errors propagate unchanged.
    async fn dispatch(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<Response, ApiError> {
        let url = self.url(&request.path);
        let mut builder = self.client.request(request.method.clone(), &url);
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        debug!(
            method = %request.method,
            path = %request.path,
            kind = ?request.kind,
            authenticated = bearer.is_some(),
            "Sending request"
        );
        let response = builder.send().await?;
        debug!(path = %request.path, status = %response.status(), "Response received");
        Ok(response)
    }

    /// Send without credentials or 401 interception (login, registration).
    pub async fn send_public(&self, request: &ApiRequest) -> Result<Response, ApiError> {
        self.dispatch(request, None).await
    }

    /// Send an authenticated request.
    ///
    /// Any response other than 401 is returned untouched, business errors
    /// included. A 401 is resolved to either the replayed response or
    /// [`ApiError::SessionExpired`].
    pub async fn send(&self, request: ApiRequest) -> Result<Response, ApiError> {
        let token = self.store.get(TokenKind::Access)?;
        let response = self.dispatch(&request, token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        if !request.kind.may_refresh() {
            warn!(path = %request.path, kind = ?request.kind, "Unauthorized on a non-retryable request");
            return Err(self.expire_session());
        }

        debug!(path = %request.path, "Unauthorized, attempting token refresh");
        let fresh = self.refresh_access(token.as_deref()).await?;

        let replay = request.into_replay();
        let response = self.dispatch(&replay, Some(&fresh)).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(path = %replay.path, "Replay rejected after refresh");
            return Err(self.expire_session());
        }
        Ok(response)
    }

    /// Obtain a usable access token after `failed_with` was rejected.
    ///
    /// Only one refresh runs at a time. A caller that waited on the gate and
    /// finds a different access token stored uses it without refreshing again.
    async fn refresh_access(&self, failed_with: Option<&str>) -> Result<String, ApiError> {
        let _gate = self.refresh_gate.lock().await;

        if let Some(current) = self.store.get(TokenKind::Access)? {
            if failed_with != Some(current.as_str()) {
                debug!("Access token already refreshed by a concurrent request");
                return Ok(current);
            }
        }

        let Some(refresh_token) = self.store.get(TokenKind::Refresh)? else {
            warn!("No refresh token stored");
            return Err(self.expire_session());
        };

        let request = ApiRequest::token_refresh(&refresh_token);
        let response = match self.dispatch(&request, None).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Token refresh request failed");
                return Err(self.expire_session());
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), "Token refresh rejected");
            return Err(self.expire_session());
        }

        let refreshed: TokenRefresh = match response.json().await {
            Ok(refreshed) => refreshed,
            Err(e) => {
                warn!(error = %e, "Failed to parse token refresh response");
                return Err(self.expire_session());
            }
        };

        // Both writes are attempted; the replay runs with the new access
        // token even when persisting it fails.
        if let Err(e) = self.store.set(TokenKind::Access, &refreshed.access) {
            warn!(error = %e, "Failed to store refreshed access token");
        }
        if let Some(ref rotated) = refreshed.refresh {
            if let Err(e) = self.store.set(TokenKind::Refresh, rotated) {
                warn!(error = %e, "Failed to store rotated refresh token, stored session is partial");
            }
        }
        debug!(rotated_refresh = refreshed.refresh.is_some(), "Access token refreshed");

        Ok(refreshed.access)
    }

    /// Clear both tokens and produce the terminal session error.
    fn expire_session(&self) -> ApiError {
        if let Err(e) = self.store.clear_all() {
            warn!(error = %e, "Failed to clear tokens after session expiry");
        }
        warn!("Session expired");
        ApiError::SessionExpired
    }
}
