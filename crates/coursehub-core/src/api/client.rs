//! API client for the CourseHub REST backend.
//!
//! `ApiClient` is a thin typed layer over [`AuthPipeline`]: it builds
//! requests, decodes JSON bodies and turns non-success statuses into
//! [`ApiError`]s. Session recovery happens entirely inside the pipeline.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::auth::{CredentialPair, TokenStore};
use crate::config::Config;
use crate::models::{
    ActionResult, Course, Lesson, Order, OrderConfirm, OrderCreate, OrderReceipt, ProfileUpdate,
    UserProfile,
};

use super::pipeline::{ApiRequest, AuthPipeline};
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const LOGIN_PATH: &str = "/auth/login";
const REGISTER_PATH: &str = "/auth/register";
const CHANGE_PASSWORD_PATH: &str = "/auth/change_password";

/// API client for CourseHub.
/// Clone is cheap - the pipeline is shared behind an Arc.
#[derive(Clone)]
pub struct ApiClient {
    pipeline: Arc<AuthPipeline>,
}

impl ApiClient {
    /// Create a new API client using the given token store.
    pub fn new(base_url: &str, store: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let pipeline =
            AuthPipeline::new(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS), store)?;
        Ok(Self::with_pipeline(Arc::new(pipeline)))
    }

    /// Create a client from configuration (base URL and timeout).
    pub fn from_config(config: &Config, store: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let pipeline = AuthPipeline::new(config.api_base_url(), config.request_timeout(), store)?;
        Ok(Self::with_pipeline(Arc::new(pipeline)))
    }

    pub fn with_pipeline(pipeline: Arc<AuthPipeline>) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &AuthPipeline {
        &self.pipeline
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        self.pipeline.store()
    }

    /// True while an access token is stored.
    pub fn is_authenticated(&self) -> bool {
        self.store().is_authenticated()
    }

    // ===== Session =====

    /// Log in and store the issued credential pair.
    ///
    /// A rejected login (unknown user or wrong password) is
    /// [`ApiError::InvalidCredentials`], never a session expiry.
    pub async fn login(&self, username: &str, password: &str) -> Result<CredentialPair, ApiError> {
        let request = ApiRequest::post(
            LOGIN_PATH,
            json!({ "username": username, "password": password }),
        );
        let response = self.pipeline.send_public(&request).await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            let detail = ApiError::decode_detail(&body)
                .unwrap_or_else(|| "invalid username or password".to_string());
            return Err(ApiError::InvalidCredentials(detail));
        }

        let pair: CredentialPair = Self::decode(Self::check_response(response).await?).await?;
        self.store().store_pair(&pair)?;
        info!(username = username, "Logged in");
        Ok(pair)
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<(), ApiError> {
        let request = ApiRequest::post(
            REGISTER_PATH,
            json!({ "username": username, "email": email, "password": password }),
        );
        let response = self.pipeline.send_public(&request).await?;
        Self::check_response(response).await?;
        info!(username = username, "Account registered");
        Ok(())
    }

    /// Register, then log in with the same credentials.
    pub async fn register_and_login(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<CredentialPair, ApiError> {
        self.register(username, email, password).await?;
        self.login(username, password).await
    }

    /// End the session locally. The backend is not contacted.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.store().clear_all()?;
        info!("Logged out");
        Ok(())
    }

    // ===== Request helpers =====

    /// Check if response is successful, returning a typed error if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(ApiError::from_response(response).await)
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let url = response.url().path().to_string();
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            debug!(path = %url, error = %e, "Undecodable response body");
            ApiError::InvalidResponse(format!("{}: {}", url, e))
        })
    }

    /// Send an authenticated request and decode its JSON body.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let mut request = ApiRequest::new(method, path);
        if let Some(body) = body {
            request = request.with_body(body);
        }
        let response = self.pipeline.send(request).await?;
        Self::decode(Self::check_response(response).await?).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidResponse(format!("Unserializable request body: {}", e)))?;
        self.request(Method::POST, path, Some(body)).await
    }

    // ===== Account =====

    /// Fetch the logged-in user's profile
    pub async fn current_user(&self) -> Result<UserProfile, ApiError> {
        self.get("/user/me").await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<ActionResult, ApiError> {
        self.post("/user/update_profile", update).await
    }

    pub async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<ActionResult, ApiError> {
        let body = json!({ "old_password": old_password, "new_password": new_password });
        self.post(CHANGE_PASSWORD_PATH, &body).await
    }

    /// Fetch the user's orders, paid and unpaid
    pub async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get("/user/orders").await
    }

    /// Fetch the courses the user may watch (all of them for a valid VIP)
    pub async fn list_my_courses(&self) -> Result<Vec<Course>, ApiError> {
        self.get("/user/my_courses").await
    }

    // ===== Catalog =====

    pub async fn list_courses(&self) -> Result<Vec<Course>, ApiError> {
        self.get("/course/courses").await
    }

    pub async fn get_course(&self, course_id: i64) -> Result<Course, ApiError> {
        self.get(&format!("/course/courses/{}", course_id)).await
    }

    /// Lessons of a course. Paid courses answer 403 unless owned or VIP.
    pub async fn list_lessons(&self, course_id: i64) -> Result<Vec<Lesson>, ApiError> {
        self.get(&format!("/course/courses/{}/lessons", course_id))
            .await
    }

    pub async fn get_lesson(&self, lesson_id: i64) -> Result<Lesson, ApiError> {
        self.get(&format!("/course/lessons/{}", lesson_id)).await
    }

    // ===== Purchase =====

    /// Place an unpaid order for a course
    pub async fn create_order(
        &self,
        course_id: i64,
        note: Option<&str>,
    ) -> Result<OrderReceipt, ApiError> {
        let body = OrderCreate {
            course_id,
            note: note.map(str::to_string),
        };
        self.post("/order/create", &body).await
    }

    /// Mark an order paid (staff accounts only)
    pub async fn confirm_order(
        &self,
        order_number: &str,
        payment_method: &str,
    ) -> Result<OrderReceipt, ApiError> {
        let body = OrderConfirm {
            order_number: order_number.to_string(),
            payment_method: payment_method.to_string(),
        };
        self.post("/order/confirm", &body).await
    }
}
