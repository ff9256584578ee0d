//! CourseHub core library.
//!
//! Client-side session handling for the CourseHub course store:
//!
//! - `auth`: credential pair and the injectable `TokenStore`
//! - `api`: the authenticated request pipeline with silent token refresh,
//!   and a typed client for the account, catalog and order endpoints
//! - `models`: backend payloads and playback gating
//! - `config`: persisted client configuration
//!
//! A caller that receives `ApiError::SessionExpired` must send the user back
//! to login; every other error is an ordinary transport or business failure.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, AuthPipeline};
pub use auth::{CredentialPair, MemoryTokenStore, TokenKind, TokenStore};
pub use config::Config;
