//! Constants for the API transport (endpoint, timeouts).

use std::time::Duration;

/// Script path of the MediaWiki Action API, relative to the wiki root.
pub const API_ENDPOINT: &str = "api.php";

/// Default whole-request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// Default whole-request timeout (connect, send, and full body read).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(DEFAULT_TIMEOUT_MS);

/// Content type of edit form bodies.
pub(crate) const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
