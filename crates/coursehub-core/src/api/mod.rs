//! REST API client module for the CourseHub backend.
//!
//! `AuthPipeline` wraps every outbound call with bearer authentication and
//! one-shot token refresh; `ApiClient` builds the typed endpoints on top.
//!
//! Backend authentication uses JWT access/refresh pairs issued by
//! `POST /auth/login` and renewed through `POST /token/refresh`.

pub mod client;
pub mod error;
pub mod pipeline;

pub use client::ApiClient;
pub use error::ApiError;
pub use pipeline::{ApiRequest, AuthPipeline, RequestKind};
