//! API utilities for frontend-backend communication
//!
//! Provides helper functions for constructing API URLs.

use crate::shared::config::PageConfig;

/// Get the base URL for API requests
///
/// Uses `api.origin` from the page config; an empty origin means the
/// origin the page was served from.
///
/// # Returns
/// - API base URL like "https://reports.example.com"
/// - Empty string if neither is available
pub fn api_base(config: &PageConfig) -> String {
    resolve_origin(&config.api.origin, || {
        web_sys::window().and_then(|w| w.location().origin().ok())
    })
}

fn resolve_origin(configured: &str, page_origin: impl FnOnce() -> Option<String>) -> String {
    let configured = configured.trim();
    if configured.is_empty() {
        page_origin().unwrap_or_default()
    } else {
        configured.to_string()
    }
}

/// Build a full API URL from an endpoint path
///
/// # Example
/// ```ignore
/// let url = api_url(&config, "/masterdata");
/// ```
pub fn api_url(config: &PageConfig, path: &str) -> String {
    join_url(&api_base(config), &config.api.base_path, path)
}

fn join_url(origin: &str, base_path: &str, path: &str) -> String {
    let mut url = origin.trim_end_matches('/').to_string();
    for part in [base_path, path] {
        let part = part.trim_matches('/');
        if !part.is_empty() {
            url.push('/');
            url.push_str(part);
        }
    }
    url
}
