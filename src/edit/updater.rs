//! Single-page edits.

use serde_json::Value;
use tracing::{debug, info, instrument};

use super::{PageInfo, UpdateMap};
use crate::auth::AuthSession;
use crate::codec::non_empty_string;
use crate::error::WikiError;
use crate::transport::{ApiClient, ApiRequest};

const ACTION_EDIT: &str = "edit";
const RESULT_SUCCESS: &str = "Success";
const GENERIC_EDIT_FAILURE: &str = "Edit failed";

/// Edit summary used when none is configured.
pub const DEFAULT_EDIT_SUMMARY: &str = "Update latest chapter";

/// Per-edit settings shared by every page of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOptions {
    /// Send `assert=bot` instead of `assert=user`.
    pub registered_bot: bool,
    /// Edit summary shown in page history.
    pub summary: String,
}

impl Default for EditOptions {
    fn default() -> Self {
        Self::new(false)
    }
}

impl EditOptions {
    /// Options with the default summary.
    #[must_use]
    pub fn new(registered_bot: bool) -> Self {
        Self {
            registered_bot,
            summary: DEFAULT_EDIT_SUMMARY.to_string(),
        }
    }

    /// Replaces the edit summary.
    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    fn assertion(&self) -> &'static str {
        if self.registered_bot { "bot" } else { "user" }
    }
}

/// Why a page was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The title is not a key of the update map.
    NotRequested,
    /// The update map holds no content (or empty content) for the title.
    EmptyContent,
}

/// Result of [`update_page`] for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The server accepted the edit. `changed` is false for a no-op edit.
    Updated {
        /// Edited page.
        title: String,
        /// Whether a new revision was created.
        changed: bool,
    },
    /// No request was sent.
    Skipped {
        /// Page that was skipped.
        title: String,
        /// Why.
        reason: SkipReason,
    },
}

impl UpdateOutcome {
    /// Title the outcome is about.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Updated { title, .. } | Self::Skipped { title, .. } => title,
        }
    }
}

/// Replaces the text of one page with its content from `updates`.
///
/// Pages without content in `updates` are skipped without a request.
/// Otherwise one `action=edit` POST is sent with the page's edit token and
/// the session cookies.
///
/// # Errors
///
/// - [`WikiError::InvalidResponse`] when `page` has no edit token, or the
///   reply has neither `error` nor `edit`
/// - [`WikiError::EditFailed`] when the reply carries `error`, or an `edit`
///   result other than `Success`
/// - [`WikiError::Transport`] / [`WikiError::Parse`] from the request itself
#[instrument(skip_all, fields(title = %page.title))]
pub async fn update_page(
    client: &ApiClient,
    session: &mut AuthSession,
    updates: &UpdateMap,
    page: &PageInfo,
    options: &EditOptions,
) -> Result<UpdateOutcome, WikiError> {
    let title = page.title.as_str();
    let Some(text) = updates.content_for(title) else {
        let reason = if updates.contains(title) {
            SkipReason::EmptyContent
        } else {
            SkipReason::NotRequested
        };
        debug!(?reason, "skipping page");
        return Ok(UpdateOutcome::Skipped {
            title: title.to_string(),
            reason,
        });
    };

    let token = page
        .edit_token
        .as_deref()
        .filter(|token| !token.is_empty())
        .ok_or_else(|| WikiError::invalid_response(ACTION_EDIT, "query.pages.edittoken"))?;

    let request = ApiRequest::post(ACTION_EDIT)
        .form_param("title", title)
        .form_param("text", text)
        .form_param("summary", options.summary.as_str())
        .form_param("token", token)
        .form_param("assert", options.assertion())
        .form_param("format", "json")
        .with_cookies();

    let content = client.request_json(&request, session.cookies_mut()).await?;
    let changed = read_edit_reply(title, &content)?;

    info!(changed, "Page updated");
    Ok(UpdateOutcome::Updated {
        title: title.to_string(),
        changed,
    })
}

/// Interprets an edit reply; `Ok(changed)` on success.
fn read_edit_reply(title: &str, content: &Value) -> Result<bool, WikiError> {
    if let Some(error) = content.get("error") {
        let message = non_empty_string(error.get("info"))
            .unwrap_or_else(|| GENERIC_EDIT_FAILURE.to_string());
        return Err(WikiError::edit_failed(title, message));
    }

    let edit = content
        .get("edit")
        .filter(|edit| edit.is_object())
        .ok_or_else(|| WikiError::invalid_response(ACTION_EDIT, "edit"))?;

    if let Some(result) = edit.get("result").and_then(Value::as_str)
        && result != RESULT_SUCCESS
    {
        return Err(WikiError::edit_failed(
            title,
            format!("server returned result `{result}`"),
        ));
    }

    Ok(edit.get("nochange").is_none())
}
