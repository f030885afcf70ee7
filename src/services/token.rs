// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared, guarded OAuth token state.
//!
//! The state is read by the fetch loop and the auth gate, and replaced by the
//! authorization flow. All access goes through these accessors, which take and
//! release the lock internally, so readers never see a half-written token.

use crate::models::TokenState;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Cloneable handle to the process-wide token state.
#[derive(Clone, Default)]
pub struct TokenStore {
    state: Arc<RwLock<TokenState>>,
}

impl TokenStore {
    /// Create an empty (unauthenticated) store.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }

    /// Current access token, or `None` when unauthenticated.
    pub async fn access_token(&self) -> Option<String> {
        let state = self.state.read().await;
        (!state.access_token.is_empty()).then(|| state.access_token.clone())
    }

    /// Current refresh token, or `None` if none has been issued.
    pub async fn refresh_token(&self) -> Option<String> {
        let state = self.state.read().await;
        (!state.refresh_token.is_empty()).then(|| state.refresh_token.clone())
    }

    /// Copy of the whole state.
    pub async fn snapshot(&self) -> TokenState {
        self.state.read().await.clone()
    }

    /// Replace the whole state.
    pub async fn replace(&self, next: TokenState) {
        *self.state.write().await = next;
    }
}
