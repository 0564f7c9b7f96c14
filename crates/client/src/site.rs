//! Site store: the active site record and its enabled plugin set.
//!
//! The single source of truth for "which site is active" and "what features
//! are unlocked". State is committed synchronously after each network await
//! resolves; racing operations interleave only at those await points, and the
//! last commit wins.

use std::collections::BTreeSet;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use cafecraft_core::SiteId;

use crate::api::ApiClient;
use crate::error::ApiError;

/// A tenant's configured website record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    /// Stable identifier.
    pub id: SiteId,
    /// URL-facing identifier.
    pub slug: String,
    /// Free-form configuration: description, contact info, colors,
    /// display flags.
    #[serde(default)]
    pub settings: serde_json::Map<String, serde_json::Value>,
    /// Plugin keys enabled for this site, as last confirmed by the server.
    #[serde(default)]
    pub active_plugins: Vec<String>,
}

/// Point-in-time copy of the site store state, for observers.
#[derive(Debug, Clone, Default)]
pub struct SiteSnapshot {
    /// Currently loaded site, if any. A failed fetch keeps the previous
    /// value; stale-but-present beats a flash to empty.
    pub site: Option<Site>,
    /// Sites owned by the signed-in user (multi-site dashboards).
    pub sites: Vec<Site>,
    /// Enabled plugin keys, synced from the last successful fetch and
    /// adjusted by confirmed toggles.
    pub active_plugins: BTreeSet<String>,
    /// A fetch is in flight.
    pub is_loading: bool,
    /// Message from the last failed fetch, cleared when a new one starts.
    pub error: Option<String>,
}

/// Process-wide container for site state.
pub struct SiteStore {
    api: ApiClient,
    state: RwLock<SiteSnapshot>,
}

impl SiteStore {
    /// Create a site store with empty initial state.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: RwLock::new(SiteSnapshot::default()),
        }
    }

    /// Fetch a site record and replace `site`/`active_plugins` wholesale.
    ///
    /// With a `slug`, fetches that site's management record; without one,
    /// fetches the record owned by the authenticated user. Failures are
    /// recorded in the store's `error` state rather than returned; the
    /// previously loaded site, if any, stays in place.
    #[instrument(skip(self))]
    pub async fn fetch_site(&self, slug: Option<&str>) {
        self.begin_load();

        let endpoint = slug.map_or_else(
            || "/sites/site/me/".to_string(),
            |slug| format!("/sites/site/{slug}/"),
        );

        match self.api.get_json::<Site>(&endpoint).await {
            Ok(site) => {
                let mut state = self.state.write();
                state.active_plugins = site.active_plugins.iter().cloned().collect();
                state.site = Some(site);
                state.is_loading = false;
            }
            Err(err) => self.record_failure(&err),
        }
    }

    /// Fetch the full list of sites owned by the current user and replace
    /// `sites` wholesale. Same loading/error discipline as [`fetch_site`].
    ///
    /// [`fetch_site`]: SiteStore::fetch_site
    #[instrument(skip(self))]
    pub async fn fetch_all_sites(&self) {
        self.begin_load();

        match self.api.get_json::<Vec<Site>>("/sites/user-sites/").await {
            Ok(sites) => {
                let mut state = self.state.write();
                state.sites = sites;
                state.is_loading = false;
            }
            Err(err) => self.record_failure(&err),
        }
    }

    /// Whether a plugin key is currently enabled. Pure membership check.
    #[must_use]
    pub fn is_plugin_active(&self, plugin_key: &str) -> bool {
        self.state.read().active_plugins.contains(plugin_key)
    }

    /// Enable or disable a plugin.
    ///
    /// Confirm-then-commit: the desired state goes to the server first, and
    /// only a successful response mutates the local set. On failure the set
    /// is untouched and the error is returned - the caller decides how to
    /// surface it (e.g. revert a checkbox). Toggling a key already in the
    /// desired state is idempotent.
    ///
    /// # Errors
    ///
    /// Returns the adapter error verbatim when the server rejects the toggle.
    #[instrument(skip(self))]
    pub async fn toggle_plugin(&self, plugin_key: &str, is_active: bool) -> Result<(), ApiError> {
        self.api
            .post(
                "/sites/site/toggle-plugin/",
                &serde_json::json!({
                    "plugin_key": plugin_key,
                    "is_active": is_active,
                }),
            )
            .await?;

        let mut state = self.state.write();
        if is_active {
            state.active_plugins.insert(plugin_key.to_string());
        } else {
            state.active_plugins.remove(plugin_key);
        }
        Ok(())
    }

    /// A point-in-time copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> SiteSnapshot {
        self.state.read().clone()
    }

    /// Reset to the initial empty state. Test-harness operation; production
    /// code creates the store once at process start and never resets it.
    pub fn reset(&self) {
        *self.state.write() = SiteSnapshot::default();
    }

    fn begin_load(&self) {
        let mut state = self.state.write();
        state.is_loading = true;
        state.error = None;
    }

    fn record_failure(&self, err: &ApiError) {
        tracing::warn!(error = %err, "site fetch failed");
        let mut state = self.state.write();
        state.error = Some(err.to_string());
        state.is_loading = false;
    }

    /// Install state directly, bypassing the network.
    #[cfg(test)]
    pub(crate) fn seed(&self, snapshot: SiteSnapshot) {
        *self.state.write() = snapshot;
    }
}
