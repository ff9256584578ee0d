//! Token Store: durable key-value storage for the access and refresh tokens.
//!
//! Stores hold opaque strings only. They do not validate, decode or expire
//! anything, and an absent token is a normal steady state.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{anyhow, Result};

use super::session::CredentialPair;

/// Which of the two session tokens an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub const ALL: [TokenKind; 2] = [TokenKind::Access, TokenKind::Refresh];

    /// Fixed storage key for this token.
    pub fn key(&self) -> &'static str {
        match self {
            TokenKind::Access => "access_token",
            TokenKind::Refresh => "refresh_token",
        }
    }
}

/// Persistence seam for session tokens.
///
/// Any component may read; only login, logout and the pipeline's refresh
/// step write.
pub trait TokenStore: Send + Sync {
    fn get(&self, kind: TokenKind) -> Result<Option<String>>;

    fn set(&self, kind: TokenKind, token: &str) -> Result<()>;

    fn clear(&self, kind: TokenKind) -> Result<()>;

    /// Store both halves of a freshly issued credential pair.
    fn store_pair(&self, pair: &CredentialPair) -> Result<()> {
        self.set(TokenKind::Access, &pair.access)?;
        self.set(TokenKind::Refresh, &pair.refresh)
    }

    /// Remove both tokens. Attempts both even if the first fails.
    fn clear_all(&self) -> Result<()> {
        let access = self.clear(TokenKind::Access);
        let refresh = self.clear(TokenKind::Refresh);
        access.and(refresh)
    }

    /// Session state is derived: authenticated iff an access token is present.
    fn is_authenticated(&self) -> bool {
        matches!(self.get(TokenKind::Access), Ok(Some(_)))
    }
}

/// In-process token store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<HashMap<TokenKind, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given tokens.
    pub fn with_tokens(access: Option<&str>, refresh: Option<&str>) -> Self {
        let mut tokens = HashMap::new();
        if let Some(access) = access {
            tokens.insert(TokenKind::Access, access.to_string());
        }
        if let Some(refresh) = refresh {
            tokens.insert(TokenKind::Refresh, refresh.to_string());
        }
        Self {
            tokens: RwLock::new(tokens),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, kind: TokenKind) -> Result<Option<String>> {
        let tokens = self
            .tokens
            .read()
            .map_err(|_| anyhow!("Token store lock poisoned"))?;
        Ok(tokens.get(&kind).cloned())
    }

    fn set(&self, kind: TokenKind, token: &str) -> Result<()> {
        let mut tokens = self
            .tokens
            .write()
            .map_err(|_| anyhow!("Token store lock poisoned"))?;
        tokens.insert(kind, token.to_string());
        Ok(())
    }

    fn clear(&self, kind: TokenKind) -> Result<()> {
        let mut tokens = self
            .tokens
            .write()
            .map_err(|_| anyhow!("Token store lock poisoned"))?;
        tokens.remove(&kind);
        Ok(())
    }
}
