//! Observational boundary: breadcrumbs and error capture.
//!
//! Every state transition in a generation attempt passes through here, as do
//! all locally-recovered failures (persistence, corrupt cache). Implementations
//! must not affect control flow.

use serde_json::Value;

pub trait Monitor: Send + Sync {
    /// Record a diagnostic breadcrumb with contextual data.
    fn breadcrumb(&self, category: &str, message: &str, data: Value);

    /// Record an error that was recovered locally or is about to surface.
    fn capture_error(&self, context: &str, error: &dyn std::error::Error);
}

/// Default monitor backed by the `log` crate.
pub struct LogMonitor;

impl Monitor for LogMonitor {
    fn breadcrumb(&self, category: &str, message: &str, data: Value) {
        log::debug!("[{}] {} {}", category, message, data);
    }

    fn capture_error(&self, context: &str, error: &dyn std::error::Error) {
        log::error!("[{}] {}", context, error);
    }
}
