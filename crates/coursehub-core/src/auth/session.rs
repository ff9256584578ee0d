use std::fmt;

use serde::{Deserialize, Serialize};

/// Access and refresh tokens issued together by login or registration.
///
/// Both values are opaque; nothing here decodes or inspects them.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    pub access: String,
    pub refresh: String,
}

impl CredentialPair {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }
}

impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

/// Body of a successful `POST /token/refresh`.
///
/// The backend may rotate the refresh token; when it does not, the stored
/// one stays in place.
#[derive(Clone, Deserialize)]
pub struct TokenRefresh {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

impl fmt::Debug for TokenRefresh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRefresh")
            .field("access", &"<redacted>")
            .field("rotated_refresh", &self.refresh.is_some())
            .finish()
    }
}
