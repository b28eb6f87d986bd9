//! User-visible notifications.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Sink for messages the user should see.
pub trait Notifier {
    fn notify(&self, message: &str, severity: Severity);
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, message: &str, severity: Severity) {
        (**self).notify(message, severity);
    }
}

/// Forwards notifications to `tracing` under the `taskdav::notify` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info => tracing::info!(target: "taskdav::notify", "{message}"),
            Severity::Warning => tracing::warn!(target: "taskdav::notify", "{message}"),
            Severity::Error => tracing::error!(target: "taskdav::notify", "{message}"),
        }
    }
}
