//! Session credentials and where they live.
//!
//! This module provides:
//! - `CredentialPair`: the access/refresh tokens issued by login
//! - `TokenStore`: the persistence seam injected into the request pipeline
//! - `MemoryTokenStore`, `FileTokenStore`: its backends
//!
//! There is no session object. A session exists while an access token is
//! stored and ends when the tokens are cleared.

pub mod file_store;
pub mod session;
pub mod store;

pub use file_store::FileTokenStore;
pub use session::{CredentialPair, TokenRefresh};
pub use store::{MemoryTokenStore, TokenKind, TokenStore};
