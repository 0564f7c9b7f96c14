//! Session credential access.
//!
//! The state layer does not log users in or refresh tokens; it only reads the
//! bearer token the auth flow left in durable storage, and wipes the session
//! keys when the server rejects it.

use std::sync::Arc;

use secrecy::SecretString;

use crate::error::StorageError;
use crate::storage::{StorageBackend, keys};

/// Stored token values that mean "no token". The browser build persisted
/// through `localStorage`, which stringifies `null`/`undefined`.
const SENTINEL_TOKENS: &[&str] = &["", "null", "undefined"];

/// Read/wipe access to the persisted auth session.
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn StorageBackend>,
}

impl CredentialStore {
    /// Create a credential store over a storage backend.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// The bearer token to attach to outbound requests, if a usable one is
    /// stored. Empty and sentinel values count as absent.
    #[must_use]
    pub fn access_token(&self) -> Option<SecretString> {
        let token = self.storage.get(keys::ACCESS_TOKEN).ok().flatten()?;
        if SENTINEL_TOKENS.contains(&token.as_str()) {
            return None;
        }
        Some(SecretString::from(token))
    }

    /// Persist a signed-in session (called by the shell's auth flow).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any of the three keys cannot be written.
    pub fn store_session(
        &self,
        access_token: &str,
        refresh_token: &str,
        user: &serde_json::Value,
    ) -> Result<(), StorageError> {
        self.storage.set(keys::ACCESS_TOKEN, access_token)?;
        self.storage.set(keys::REFRESH_TOKEN, refresh_token)?;
        self.storage.set(keys::USER, &serde_json::to_string(user)?)?;
        Ok(())
    }

    /// Wipe the persisted session: access token, refresh token, cached user.
    ///
    /// Best-effort across all three keys; the first failure is returned after
    /// every key has been attempted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any key could not be removed.
    pub fn clear_session(&self) -> Result<(), StorageError> {
        let results = [
            self.storage.remove(keys::ACCESS_TOKEN),
            self.storage.remove(keys::REFRESH_TOKEN),
            self.storage.remove(keys::USER),
        ];
        results.into_iter().collect()
    }
}
