//! Session credential holder.
//!
//! The API key is pasted by the user, held for the session only, and cleared
//! when the vendor rejects it. It is handed to collaborators unexamined.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{StudioError, StudioResult};

/// Opaque API key. `Debug` is redacted so the key never reaches the logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> StudioResult<Self> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(StudioError::Precondition("API key is empty".to_string()));
        }
        Ok(Self(key))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialState {
    Empty,
    Present(ApiKey),
}

/// Shared, explicit credential state. Cloning shares the same slot.
#[derive(Debug, Clone)]
pub struct CredentialHolder {
    state: Arc<RwLock<CredentialState>>,
}

impl Default for CredentialHolder {
    fn default() -> Self {
        Self {
            state: Arc::new(RwLock::new(CredentialState::Empty)),
        }
    }
}

impl CredentialHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Holder pre-filled from an optional key (e.g. `GEMINI_API_KEY`); blank keys are ignored.
    pub fn with_initial(key: Option<String>) -> Self {
        let state = match key.map(ApiKey::new) {
            Some(Ok(key)) => CredentialState::Present(key),
            _ => CredentialState::Empty,
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Empty | Present -> Present
    pub async fn set(&self, key: impl Into<String>) -> StudioResult<()> {
        let key = ApiKey::new(key)?;
        *self.state.write().await = CredentialState::Present(key);
        tracing::info!("🔑 API key set for session");
        Ok(())
    }

    /// -> Empty
    pub async fn clear(&self) {
        *self.state.write().await = CredentialState::Empty;
    }

    pub async fn state(&self) -> CredentialState {
        self.state.read().await.clone()
    }

    pub async fn is_present(&self) -> bool {
        matches!(*self.state.read().await, CredentialState::Present(_))
    }

    /// Current key, or `MissingCredential` before anything is dispatched.
    pub async fn require(&self) -> StudioResult<ApiKey> {
        match &*self.state.read().await {
            CredentialState::Present(key) => Ok(key.clone()),
            CredentialState::Empty => Err(StudioError::MissingCredential),
        }
    }

    /// Feed an error back; only an invalid-credential failure clears the key.
    pub async fn observe(&self, err: &StudioError) {
        if err.is_credential_failure() {
            tracing::warn!("API key rejected by the service; clearing session credential");
            self.clear().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_require_clear() {
        let holder = CredentialHolder::new();
        assert!(matches!(holder.require().await, Err(StudioError::MissingCredential)));

        holder.set("  abc  ").await.unwrap();
        assert_eq!(holder.require().await.unwrap().expose(), "abc");

        holder.clear().await;
        assert_eq!(holder.state().await, CredentialState::Empty);
    }

    #[tokio::test]
    async fn blank_key_rejected() {
        let holder = CredentialHolder::new();
        assert!(matches!(holder.set("   ").await, Err(StudioError::Precondition(_))));
        assert!(!holder.is_present().await);
    }

    #[tokio::test]
    async fn only_credential_failure_clears() {
        let holder = CredentialHolder::with_initial(Some("k".to_string()));
        holder.observe(&StudioError::QuotaExceeded("quota".into())).await;
        holder.observe(&StudioError::BatchFailed { attempted: 3 }).await;
        assert!(holder.is_present().await);

        holder
            .observe(&StudioError::InvalidCredential("API key not valid".into()))
            .await;
        assert!(!holder.is_present().await);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let a = CredentialHolder::new();
        let b = a.clone();
        a.set("shared").await.unwrap();
        assert!(b.is_present().await);
    }

    #[test]
    fn debug_is_redacted() {
        let key = ApiKey::new("secret-value").unwrap();
        assert_eq!(format!("{:?}", key), "ApiKey(***)");
    }
}
