//! Plugin access guard for gated dashboard sections.
//!
//! A passive observer over the site store: it never mutates site state, it
//! only decides whether a gated screen may render and, on denial, notifies
//! the user once and sends them back to the dashboard. Side effects fire
//! only when the observed (site, plugin key, loading) combination changes,
//! so re-rendering shells can call [`PluginGate::check`] freely.

use std::sync::Arc;

use parking_lot::Mutex;

use cafecraft_core::SiteId;

use crate::site::SiteStore;
use crate::ui::{DASHBOARD_PATH, Navigator, Notifier};

/// Outcome of a gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStatus {
    /// The site store has no answer yet; render neither the gated content
    /// nor an access-denied message.
    Loading,
    /// The plugin is enabled; render the gated content.
    Granted,
    /// The plugin is disabled; the user has been notified and redirected.
    Denied,
}

/// The dependency tuple a gate evaluation is keyed on.
type Observed = (Option<SiteId>, String, bool);

/// Guard consulted before rendering plugin-gated screens.
pub struct PluginGate {
    store: Arc<SiteStore>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    last_observed: Mutex<Option<Observed>>,
}

impl PluginGate {
    /// Create a gate over a site store and the shell's UI seams.
    #[must_use]
    pub fn new(
        store: Arc<SiteStore>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            navigator,
            notifier,
            last_observed: Mutex::new(None),
        }
    }

    /// Evaluate access to a plugin-gated section.
    ///
    /// While the site store is loading or no site is loaded yet, reports
    /// [`GateStatus::Loading`] and takes no action. Once a site is loaded and
    /// the key is absent from the active set, fires one notification and one
    /// redirect to the dashboard - and not again until the observed
    /// (site, key, loading) combination changes.
    pub fn check(&self, plugin_key: &str) -> GateStatus {
        let snapshot = self.store.snapshot();
        let loading = snapshot.is_loading || snapshot.site.is_none();
        let observed: Observed = (
            snapshot.site.as_ref().map(|site| site.id),
            plugin_key.to_string(),
            loading,
        );

        let changed = {
            let mut last = self.last_observed.lock();
            if last.as_ref() == Some(&observed) {
                false
            } else {
                *last = Some(observed);
                true
            }
        };

        if loading {
            return GateStatus::Loading;
        }

        if snapshot.active_plugins.contains(plugin_key) {
            return GateStatus::Granted;
        }

        if changed {
            self.notifier.notify(
                "Restricted access",
                &format!("Enable the {plugin_key} plugin to use this section."),
            );
            self.navigator.redirect(DASHBOARD_PATH);
        }

        GateStatus::Denied
    }
}
