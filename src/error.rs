//! Error types for wiki API operations.
//!
//! Every failure in a run maps to one [`WikiError`] variant, and every variant
//! reports its [`ErrorKind`] so callers can tell transport, parse, shape,
//! login and edit failures apart without matching on message text.

use std::fmt;

use thiserror::Error;

/// Coarse classification of a [`WikiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connection failure, socket error or timeout.
    Transport,
    /// Response body was not valid JSON.
    Parse,
    /// JSON was well-formed but lacked a field the call requires.
    InvalidResponse,
    /// Login returned an explicit non-success result.
    LoginFailed,
    /// The server rejected an edit.
    EditFailed,
    /// Endpoint or client could not be set up.
    Configuration,
}

impl ErrorKind {
    /// Returns the stable label used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Parse => "parse",
            Self::InvalidResponse => "invalid_response",
            Self::LoginFailed => "login_failed",
            Self::EditFailed => "edit_failed",
            Self::Configuration => "configuration",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while talking to the wiki API.
#[derive(Debug, Error)]
pub enum WikiError {
    /// Network-level failure (DNS, connection refused, TLS, timeout).
    #[error("{} calling action={action}: {source}", transport_label(.timed_out))]
    Transport {
        /// API action being called.
        action: &'static str,
        /// Whether the request hit the client timeout.
        timed_out: bool,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// The response body could not be parsed as JSON.
    #[error("response to action={action} is not valid JSON: {source}")]
    Parse {
        /// API action being called.
        action: &'static str,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The response JSON is missing a field required by the call.
    #[error("invalid API response to action={action}: missing `{field}`")]
    InvalidResponse {
        /// API action being called.
        action: &'static str,
        /// Dotted path of the missing field.
        field: &'static str,
    },

    /// Login returned a result other than `Success` or `NeedToken`.
    #[error("login failed: server returned result `{result}`")]
    LoginFailed {
        /// The `login.result` value returned by the server.
        result: String,
    },

    /// The server reported an error for an edit.
    #[error("edit of '{title}' failed: {message}")]
    EditFailed {
        /// Page title being edited.
        title: String,
        /// Server-supplied message, or a generic one.
        message: String,
    },

    /// The API endpoint could not be derived from the configured host.
    #[error("invalid API endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// The host or base URL that was supplied.
        endpoint: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The HTTP client could not be built.
    #[error("HTTP client construction failed: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl WikiError {
    /// Creates a transport error, recording whether it was a timeout.
    ///
    /// The query string is stripped from the URL reqwest reports: login
    /// requests carry `lgpassword` there.
    #[must_use]
    pub fn transport(action: &'static str, mut source: reqwest::Error) -> Self {
        if let Some(url) = source.url_mut() {
            url.set_query(None);
        }
        Self::Transport {
            action,
            timed_out: source.is_timeout(),
            source,
        }
    }

    /// Creates a JSON parse error.
    #[must_use]
    pub fn parse(action: &'static str, source: serde_json::Error) -> Self {
        Self::Parse { action, source }
    }

    /// Creates an invalid-response error for a missing field.
    #[must_use]
    pub fn invalid_response(action: &'static str, field: &'static str) -> Self {
        Self::InvalidResponse { action, field }
    }

    /// Creates a login-failed error.
    #[must_use]
    pub fn login_failed(result: impl Into<String>) -> Self {
        Self::LoginFailed {
            result: result.into(),
        }
    }

    /// Creates an edit-failed error.
    #[must_use]
    pub fn edit_failed(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EditFailed {
            title: title.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid-endpoint error.
    #[must_use]
    pub fn invalid_endpoint(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    /// Returns the classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::InvalidResponse { .. } => ErrorKind::InvalidResponse,
            Self::LoginFailed { .. } => ErrorKind::LoginFailed,
            Self::EditFailed { .. } => ErrorKind::EditFailed,
            Self::InvalidEndpoint { .. } | Self::ClientBuild(_) => ErrorKind::Configuration,
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)] // thiserror passes fields by reference
fn transport_label(timed_out: &bool) -> &'static str {
    if *timed_out {
        "request timed out"
    } else {
        "network error"
    }
}

// No `From<reqwest::Error>` / `From<serde_json::Error>`: every variant needs the
// API action for context, so callers go through the constructors above.
