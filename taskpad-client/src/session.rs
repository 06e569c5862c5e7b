use std::sync::Arc;

use taskpad_core::protocol::{AuthResponse, LoginRequest, SignupRequest};
use tokio::sync::RwLock;

use crate::errors::ClientError;
use crate::events::EventDispatcher;
use crate::http::ApiClient;
use crate::token_store::{TokenStore, TOKEN_KEY};

/// The two states a session can be in. Presence of a token is the sole
/// authorization signal; there is no refresh or expiry bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

/// Owns the bearer credential's lifecycle: acquisition, persistence across
/// restarts, attachment to outbound requests, and invalidation.
///
/// This is the only component that reads or writes the token store. A token
/// is treated as valid until the server rejects an authenticated call, at
/// which point [`SessionManager::invalidate`] drops it (implicit logout).
pub struct SessionManager {
    api: ApiClient,
    store: TokenStore,
    token: RwLock<Option<String>>,
    events: Arc<EventDispatcher>,
}

impl SessionManager {
    /// Builds the manager, hydrating the in-memory token from persistent
    /// storage so a prior login survives a restart.
    pub async fn new(
        api: ApiClient,
        store: TokenStore,
        events: Arc<EventDispatcher>,
    ) -> Result<Self, ClientError> {
        let token = store.get(TOKEN_KEY).await?;
        if token.is_some() {
            tracing::info!("Restored session token from storage");
        }

        Ok(Self {
            api,
            store,
            token: RwLock::new(token),
            events,
        })
    }

    pub async fn state(&self) -> SessionState {
        if self.token.read().await.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    pub async fn current_token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// The token to attach as a bearer credential, or `Unauthenticated` — in
    /// which case the caller must not send the request at all.
    pub(crate) async fn bearer(&self) -> Result<String, ClientError> {
        self.token
            .read()
            .await
            .clone()
            .ok_or(ClientError::Unauthenticated)
    }

    /// Exchanges credentials for a token and persists it. On failure the
    /// prior session state is left untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ClientError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let resp: AuthResponse = self
            .api
            .post_json("/login", &body, None)
            .await
            .map_err(into_auth_error)?;

        self.install_token(resp.token).await
    }

    /// Creates an account server-side; the returned token is identical in
    /// kind to login's.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<(), ClientError> {
        let body = SignupRequest {
            email: email.to_string(),
            password: password.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        };

        let resp: AuthResponse = self
            .api
            .post_json("/signup", &body, None)
            .await
            .map_err(into_auth_error)?;

        self.install_token(resp.token).await
    }

    /// Best-effort server notification, then unconditional local
    /// invalidation. A failed network call never blocks clearing the
    /// session.
    pub async fn logout(&self) -> Result<(), ClientError> {
        if let Some(token) = self.current_token().await {
            if let Err(e) = self.api.post_empty("/logout", Some(&token)).await {
                tracing::warn!("Server logout notification failed: {}", e);
            }
        }

        tracing::info!("Session ended");
        self.clear().await
    }

    /// Implicit logout: the server rejected an authenticated call, so the
    /// credential is no longer usable. Clears local state without a server
    /// call.
    pub async fn invalidate(&self) -> Result<(), ClientError> {
        tracing::warn!("Authorization rejected, invalidating session");
        self.clear().await
    }

    async fn install_token(&self, token: String) -> Result<(), ClientError> {
        // Persist first so a crash between the two writes cannot leave an
        // in-memory session without a stored copy.
        self.store.put(TOKEN_KEY, &token).await?;
        *self.token.write().await = Some(token);

        tracing::info!("Session established");
        self.events.emit_session_changed(SessionState::Authenticated);
        Ok(())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        *self.token.write().await = None;
        self.events.emit_session_changed(SessionState::Anonymous);
        self.store.remove(TOKEN_KEY).await?;
        Ok(())
    }
}

/// Login/signup rejections surface as `AuthenticationFailed` rather than a
/// raw status code.
fn into_auth_error(err: ClientError) -> ClientError {
    match err {
        ClientError::Rejected { message, .. } => ClientError::AuthenticationFailed(message),
        other => other,
    }
}
