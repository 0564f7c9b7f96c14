//! Seams between the state layer and the embedding UI shell.
//!
//! The state layer never draws anything; when it needs the user to see or go
//! somewhere (session expiry, plugin denial) it calls through these traits.
//! Shells install their router/toast implementations; headless consumers
//! (sitemap generation, tests) use the provided no-op/logging ones.

/// Where the client is sent when its session is rejected.
pub const LOGIN_PATH: &str = "/login";

/// Default landing page for the owner dashboard; plugin denials land here.
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Navigation seam: the shell's router.
pub trait Navigator: Send + Sync {
    /// Navigate the client to `path`.
    fn redirect(&self, path: &str);
}

/// User-visible notification seam: the shell's toast surface.
pub trait Notifier: Send + Sync {
    /// Show a notification with a short title and a descriptive message.
    fn notify(&self, title: &str, message: &str);
}

/// Navigator for headless consumers; records nothing, goes nowhere.
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn redirect(&self, path: &str) {
        tracing::debug!(path, "navigation ignored (headless client)");
    }
}

/// Notifier that forwards notifications to the tracing log.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, title: &str, message: &str) {
        tracing::warn!(title, message, "user notification");
    }
}
