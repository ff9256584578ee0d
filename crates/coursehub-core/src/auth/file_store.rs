use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing::debug;

use super::store::{TokenKind, TokenStore};

/// Token file name in the data directory
const TOKEN_FILE: &str = "tokens.json";

type TokenMap = BTreeMap<String, String>;

/// Token store backed by a small JSON file keyed by [`TokenKind::key`].
///
/// A missing file means no tokens. Removing the last token deletes the file.
pub struct FileTokenStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileTokenStore {
    /// Store tokens in `tokens.json` inside `data_dir`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self::at_path(data_dir.as_ref().join(TOKEN_FILE))
    }

    pub fn at_path(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<TokenMap> {
        if !self.path.exists() {
            return Ok(TokenMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read token file {}", self.path.display()))?;
        if contents.trim().is_empty() {
            return Ok(TokenMap::new());
        }
        serde_json::from_str(&contents).context("Failed to parse token file")
    }

    fn write(&self, tokens: &TokenMap) -> Result<()> {
        if tokens.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path).context("Failed to remove token file")?;
                debug!(path = %self.path.display(), "Token file removed");
            }
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(tokens)?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write token file {}", self.path.display()))?;
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut TokenMap)) -> Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow!("Token file lock poisoned"))?;
        let mut tokens = self.read()?;
        apply(&mut tokens);
        self.write(&tokens)
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, kind: TokenKind) -> Result<Option<String>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow!("Token file lock poisoned"))?;
        Ok(self.read()?.remove(kind.key()))
    }

    fn set(&self, kind: TokenKind, token: &str) -> Result<()> {
        self.update(|tokens| {
            tokens.insert(kind.key().to_string(), token.to_string());
        })
    }

    fn clear(&self, kind: TokenKind) -> Result<()> {
        self.update(|tokens| {
            tokens.remove(kind.key());
        })
    }
}
