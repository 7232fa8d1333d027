//! Bearer token storage
//!
//! A single shared slot holding the current access token. The REST client
//! reads it for every call and clears it when the server answers 401.

use parking_lot::RwLock;
use std::sync::Arc;

/// Shared, cloneable bearer token slot
#[derive(Clone, Default)]
pub struct TokenStore {
    inner: Arc<RwLock<Option<String>>>,
}

impl TokenStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding a token
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set(token);
        store
    }

    /// Replace the stored token
    pub fn set(&self, token: impl Into<String>) {
        *self.inner.write() = Some(token.into());
    }

    /// Get a copy of the stored token
    pub fn get(&self) -> Option<String> {
        self.inner.read().clone()
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> Option<String> {
        self.inner.read().as_ref().map(|t| format!("Bearer {t}"))
    }

    /// Drop the stored token
    pub fn clear(&self) {
        if self.inner.write().take().is_some() {
            tracing::warn!("Stored credentials cleared");
        }
    }

    pub fn is_present(&self) -> bool {
        self.inner.read().is_some()
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("present", &self.is_present())
            .finish()
    }
}
