use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::foundation::error::SocialGenResult;
use crate::services::CredentialProvider;

/// Environment variables checked for an API key, in order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Reads the API key from the process environment.
///
/// There is no interactive selector outside a browser; `open_select_key` logs which variables
/// to set and the next call re-reads the environment.
#[derive(Clone, Debug)]
pub struct EnvCredentials {
    vars: Vec<String>,
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self {
            vars: API_KEY_VARS.iter().map(|v| v.to_string()).collect(),
        }
    }
}

impl EnvCredentials {
    /// Check `var` ahead of the default variables.
    pub fn with_var(var: impl Into<String>) -> Self {
        let mut out = Self::default();
        out.vars.insert(0, var.into());
        out
    }
}

#[async_trait]
impl CredentialProvider for EnvCredentials {
    async fn has_selected_key(&self) -> bool {
        self.api_key().is_some()
    }

    async fn open_select_key(&self) -> SocialGenResult<()> {
        tracing::warn!(
            vars = ?self.vars,
            "no usable API key selected; export one of these variables"
        );
        Ok(())
    }

    fn api_key(&self) -> Option<String> {
        self.vars
            .iter()
            .filter_map(|v| std::env::var(v).ok())
            .map(|k| k.trim().to_string())
            .find(|k| !k.is_empty())
    }
}

/// In-process credential holder, for embedding and tests.
#[derive(Debug, Default)]
pub struct StaticCredentials {
    key: RwLock<Option<String>>,
    prompts: AtomicUsize,
    key_on_prompt: Option<String>,
}

impl StaticCredentials {
    pub fn new(key: Option<String>) -> Self {
        Self {
            key: RwLock::new(key),
            ..Self::default()
        }
    }

    /// Install `key` whenever the selector is opened.
    pub fn selecting_on_prompt(mut self, key: impl Into<String>) -> Self {
        self.key_on_prompt = Some(key.into());
        self
    }

    pub fn set_key(&self, key: Option<String>) {
        if let Ok(mut guard) = self.key.write() {
            *guard = key;
        }
    }

    /// How many times the selector was opened.
    pub fn prompt_count(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn has_selected_key(&self) -> bool {
        self.api_key().is_some()
    }

    async fn open_select_key(&self) -> SocialGenResult<()> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        if let Some(k) = &self.key_on_prompt {
            self.set_key(Some(k.clone()));
        }
        Ok(())
    }

    fn api_key(&self) -> Option<String> {
        self.key
            .read()
            .ok()
            .and_then(|g| g.clone())
            .filter(|k| !k.is_empty())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/services/credentials.rs"]
mod tests;
