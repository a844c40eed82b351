//! Resource accessors: one method per backend resource on [`ApiSession`].
//!
//! List accessors are soft: a failed call is logged and replaced by an empty
//! default so a view still renders. Detail accessors return the error so the
//! handler can answer with a Forbidden or Not Found placeholder. Mutating
//! accessors revalidate the affected cached views before returning.
//!
//! [`ApiSession`]: crate::client::ApiSession

mod concepts;
mod datasets;
mod files;
mod mapping_rules;
mod omop;
mod projects;
mod scan_reports;
mod users;

use tracing::warn;

use crate::client::{ApiError, ApiSession};

/// Append a query string to a base path, leaving the base alone when empty.
pub(crate) fn with_query(base: &str, filter: &str) -> String {
    let filter = filter.trim_start_matches('?');
    if filter.is_empty() {
        base.to_string()
    } else {
        format!("{base}?{filter}")
    }
}

impl ApiSession {
    /// Log a failed soft accessor call and fall back to `default`. The
    /// session is marked degraded so the view built from it is not cached.
    pub(crate) fn or_default<T>(
        &self,
        path: &str,
        result: Result<T, ApiError>,
        default: impl FnOnce() -> T,
    ) -> T {
        match result {
            Ok(value) => value,
            Err(e) => {
                warn!(path = %path, error = %e, "Backend call failed, using default");
                self.mark_degraded();
                default()
            }
        }
    }
}
