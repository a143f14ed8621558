//! Process-wide holder of the signed-in identity.
//!
//! `SessionManager` keeps the current user and both tokens in memory and
//! mirrors them to a `CredentialVault` under fixed keys. The three fields
//! change together: every mutation holds the write lock until the vault
//! has been updated, so readers never see a token without its user.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::ClientError;
use crate::models::{AuthSession, User};

use super::vault::{CredentialVault, VaultError};

/// Vault key for the bearer access token
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Vault key for the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Vault key for the JSON-encoded current user
pub const CURRENT_USER_KEY: &str = "currentUser";

/// Snapshot of the in-memory session fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<User>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl SessionState {
    /// Presence of an access token is the sole signed-in signal
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

pub struct SessionManager {
    vault: Arc<dyn CredentialVault>,
    state: RwLock<SessionState>,
    authenticated: watch::Sender<bool>,
}

impl SessionManager {
    /// Create a signed-out manager. Call `hydrate` to restore a saved session.
    pub fn new(vault: Arc<dyn CredentialVault>) -> Self {
        let (authenticated, _) = watch::channel(false);
        Self {
            vault,
            state: RwLock::new(SessionState::default()),
            authenticated,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Publish the signed-in flag, waking subscribers only on a transition
    fn publish(&self, is_authenticated: bool) {
        self.authenticated.send_if_modified(|current| {
            if *current == is_authenticated {
                false
            } else {
                *current = is_authenticated;
                true
            }
        });
    }

    /// Restore session fields from the vault.
    ///
    /// Each field is read independently; one that is missing or fails to
    /// decode is left empty without affecting the others.
    pub fn hydrate(&self) {
        let mut state = self.write();

        let access_token = self.read_string(ACCESS_TOKEN_KEY);
        let refresh_token = self.read_string(REFRESH_TOKEN_KEY);
        let user = self.read_bytes(CURRENT_USER_KEY).and_then(|bytes| {
            serde_json::from_slice::<User>(&bytes)
                .map_err(|e| warn!(key = CURRENT_USER_KEY, error = %e, "Discarding undecodable vault entry"))
                .ok()
        });

        *state = SessionState {
            user,
            access_token,
            refresh_token,
        };

        debug!(
            has_user = state.user.is_some(),
            has_access_token = state.access_token.is_some(),
            has_refresh_token = state.refresh_token.is_some(),
            "Session hydrated"
        );
        self.publish(state.is_authenticated());
    }

    fn read_bytes(&self, key: &str) -> Option<Vec<u8>> {
        match self.vault.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = key, error = %e, "Failed to read vault entry");
                None
            }
        }
    }

    fn read_string(&self, key: &str) -> Option<String> {
        self.read_bytes(key).and_then(|bytes| {
            String::from_utf8(bytes)
                .map_err(|e| warn!(key = key, error = %e, "Discarding non-UTF-8 vault entry"))
                .ok()
        })
    }

    /// Replace the session with a freshly authenticated one.
    ///
    /// Memory is updated first and stays authoritative; vault writes are
    /// best effort and a failed key does not stop the others.
    pub fn save_session(&self, user: User, access_token: String, refresh_token: String) {
        let mut state = self.write();

        let user_json = serde_json::to_vec(&user);
        let user_id = user.id.clone();
        *state = SessionState {
            user: Some(user),
            access_token: Some(access_token),
            refresh_token: Some(refresh_token),
        };

        if let Some(token) = state.access_token.as_deref() {
            self.persist(ACCESS_TOKEN_KEY, token.as_bytes());
        }
        if let Some(token) = state.refresh_token.as_deref() {
            self.persist(REFRESH_TOKEN_KEY, token.as_bytes());
        }
        match user_json {
            Ok(bytes) => self.persist(CURRENT_USER_KEY, &bytes),
            Err(e) => warn!(error = %e, "Failed to encode user for the vault"),
        }

        info!(user_id = %user_id, "Session saved");
        self.publish(true);
    }

    /// Save the result of a login or verification
    pub fn save_auth(&self, auth: &AuthSession) {
        self.save_session(
            auth.user.clone(),
            auth.access_token.clone(),
            auth.refresh_token.clone(),
        );
    }

    fn persist(&self, key: &str, value: &[u8]) {
        if let Err(e) = self.vault.set(key, value) {
            warn!(key = key, error = %e, "Failed to persist session field");
        }
    }

    /// Sign out: clear memory and remove all three vault entries.
    ///
    /// Every delete is attempted. Keys that could not be removed are returned
    /// in `VaultError::Incomplete`; they would come back on the next hydrate.
    pub fn logout(&self) -> Result<(), VaultError> {
        let mut state = self.write();
        *state = SessionState::default();

        let mut failed = Vec::new();
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, CURRENT_USER_KEY] {
            if let Err(e) = self.vault.delete(key) {
                warn!(key = key, error = %e, "Failed to delete session field");
                failed.push(key);
            }
        }
        self.publish(false);

        if failed.is_empty() {
            info!("Session cleared");
            Ok(())
        } else {
            Err(VaultError::Incomplete(failed))
        }
    }

    /// Drop the in-memory session only. The vault copy survives for the next hydrate.
    pub fn teardown(&self) {
        let mut state = self.write();
        *state = SessionState::default();
        self.publish(false);
    }

    /// Exchange the refresh token for new tokens.
    ///
    /// The API exposes no refresh endpoint yet, so this always fails.
    pub async fn refresh(&self) -> Result<AuthSession, ClientError> {
        if self.refresh_token().is_none() {
            return Err(ClientError::NotAuthenticated);
        }
        Err(ClientError::Unsupported("Token refresh"))
    }

    // ===== Getters =====

    pub fn snapshot(&self) -> SessionState {
        self.read().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    /// Watch the signed-in flag. The receiver starts at the current value and
    /// changes only when the access token appears or disappears.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.authenticated.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryVault;

    fn user() -> User {
        User {
            id: "u1".to_string(),
            username: "neonbyte".to_string(),
            display_name: "Neon Byte".to_string(),
            bio: None,
            profile_image_url: Some("https://cdn/u1.jpg".to_string()),
        }
    }

    fn manager(vault: &Arc<MemoryVault>) -> SessionManager {
        SessionManager::new(vault.clone())
    }

    #[test]
    fn test_new_manager_is_signed_out() {
        let vault = Arc::new(MemoryVault::new());
        let session = manager(&vault);
        assert_eq!(session.snapshot(), SessionState::default());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_save_then_hydrate_in_fresh_instance() {
        let vault = Arc::new(MemoryVault::new());
        manager(&vault).save_session(user(), "AT1".to_string(), "RT1".to_string());

        let restored = manager(&vault);
        restored.hydrate();
        assert_eq!(restored.current_user(), Some(user()));
        assert_eq!(restored.access_token().as_deref(), Some("AT1"));
        assert_eq!(restored.refresh_token().as_deref(), Some("RT1"));
        assert!(restored.is_authenticated());
    }

    #[test]
    fn test_logout_then_hydrate_yields_nothing() {
        let vault = Arc::new(MemoryVault::new());
        let session = manager(&vault);
        session.save_session(user(), "AT1".to_string(), "RT1".to_string());
        session.logout().expect("logout should succeed");
        assert_eq!(session.snapshot(), SessionState::default());

        let restored = manager(&vault);
        restored.hydrate();
        assert_eq!(restored.snapshot(), SessionState::default());
        assert!(vault.is_empty());
    }

    #[test]
    fn test_logout_when_nothing_saved() {
        let vault = Arc::new(MemoryVault::new());
        let session = manager(&vault);
        session.logout().expect("logout should succeed");
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_hydrate_twice_is_stable() {
        let vault = Arc::new(MemoryVault::new());
        manager(&vault).save_session(user(), "AT1".to_string(), "RT1".to_string());

        let session = manager(&vault);
        session.hydrate();
        let first = session.snapshot();
        session.hydrate();
        assert_eq!(session.snapshot(), first);
    }

    #[test]
    fn test_hydrate_tolerates_corrupt_user() {
        let vault = Arc::new(MemoryVault::new());
        vault.set(ACCESS_TOKEN_KEY, b"AT1").expect("set");
        vault.set(REFRESH_TOKEN_KEY, b"RT1").expect("set");
        vault.set(CURRENT_USER_KEY, b"{not json").expect("set");

        let session = manager(&vault);
        session.hydrate();
        assert!(session.current_user().is_none());
        assert_eq!(session.access_token().as_deref(), Some("AT1"));
        assert_eq!(session.refresh_token().as_deref(), Some("RT1"));
    }

    #[test]
    fn test_hydrate_tolerates_non_utf8_token() {
        let vault = Arc::new(MemoryVault::new());
        vault.set(ACCESS_TOKEN_KEY, &[0xFF, 0xFE]).expect("set");
        vault.set(REFRESH_TOKEN_KEY, b"RT1").expect("set");

        let session = manager(&vault);
        session.hydrate();
        assert!(session.access_token().is_none());
        assert_eq!(session.refresh_token().as_deref(), Some("RT1"));
    }

    #[test]
    fn test_failed_vault_write_keeps_memory_and_other_keys() {
        let vault = Arc::new(MemoryVault::new());
        vault.fail_writes_for(REFRESH_TOKEN_KEY);

        let session = manager(&vault);
        session.save_session(user(), "AT1".to_string(), "RT1".to_string());
        assert_eq!(session.refresh_token().as_deref(), Some("RT1"));
        assert!(vault.get(ACCESS_TOKEN_KEY).expect("get").is_some());
        assert!(vault.get(CURRENT_USER_KEY).expect("get").is_some());
        assert!(vault.get(REFRESH_TOKEN_KEY).expect("get").is_none());
    }

    #[test]
    fn test_logout_reports_entries_left_in_vault() {
        let vault = Arc::new(MemoryVault::new());
        let session = manager(&vault);
        session.save_session(user(), "AT1".to_string(), "RT1".to_string());
        vault.fail_writes_for(ACCESS_TOKEN_KEY);

        match session.logout() {
            Err(VaultError::Incomplete(keys)) => assert_eq!(keys, vec![ACCESS_TOKEN_KEY]),
            other => panic!("expected incomplete logout, got {:?}", other),
        }
        // Memory is cleared and the other deletes still ran
        assert!(!session.is_authenticated());
        assert!(vault.get(REFRESH_TOKEN_KEY).expect("get").is_none());
        assert!(vault.get(CURRENT_USER_KEY).expect("get").is_none());
        assert!(vault.get(ACCESS_TOKEN_KEY).expect("get").is_some());
    }

    #[test]
    fn test_teardown_keeps_vault() {
        let vault = Arc::new(MemoryVault::new());
        let session = manager(&vault);
        session.save_session(user(), "AT1".to_string(), "RT1".to_string());
        session.teardown();
        assert!(!session.is_authenticated());

        session.hydrate();
        assert_eq!(session.access_token().as_deref(), Some("AT1"));
    }

    #[test]
    fn test_resave_overwrites() {
        let vault = Arc::new(MemoryVault::new());
        let session = manager(&vault);
        session.save_session(user(), "AT1".to_string(), "RT1".to_string());
        session.save_session(user(), "AT2".to_string(), "RT2".to_string());

        let restored = manager(&vault);
        restored.hydrate();
        assert_eq!(restored.access_token().as_deref(), Some("AT2"));
        assert_eq!(restored.refresh_token().as_deref(), Some("RT2"));
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions_only() {
        let vault = Arc::new(MemoryVault::new());
        let session = manager(&vault);
        let mut rx = session.subscribe();
        assert!(!*rx.borrow_and_update());

        session.save_session(user(), "AT1".to_string(), "RT1".to_string());
        assert!(rx.has_changed().expect("sender alive"));
        assert!(*rx.borrow_and_update());

        // Re-login keeps the flag set, so no notification
        session.save_session(user(), "AT2".to_string(), "RT2".to_string());
        assert!(!rx.has_changed().expect("sender alive"));

        session.logout().expect("logout should succeed");
        rx.changed().await.expect("sender alive");
        assert!(!*rx.borrow_and_update());
    }

    #[tokio::test]
    async fn test_refresh_is_unsupported() {
        let vault = Arc::new(MemoryVault::new());
        let session = manager(&vault);
        assert!(matches!(session.refresh().await, Err(ClientError::NotAuthenticated)));

        session.save_session(user(), "AT1".to_string(), "RT1".to_string());
        assert!(matches!(session.refresh().await, Err(ClientError::Unsupported(_))));
    }
}
