//! Batched edit-token query.

use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::auth::AuthSession;
use crate::codec::{non_empty_string, primitive_string};
use crate::error::WikiError;
use crate::transport::{ApiClient, ApiRequest};

const ACTION_QUERY: &str = "query";

/// One page entry from a `prop=info&intoken=edit` reply.
///
/// `title` and the token are lifted out; every other field the server sent
/// (`ns`, `touched`, `lastrevid`, `missing`, ...) stays in `extra`.
#[derive(Debug, Clone, PartialEq)]
pub struct PageInfo {
    /// Page title as the server reports it.
    pub title: String,
    /// `edittoken`, when present and non-empty.
    pub edit_token: Option<String>,
    /// `pageid`; absent for pages that do not exist yet.
    pub page_id: Option<String>,
    /// Remaining fields.
    pub extra: Map<String, Value>,
}

impl PageInfo {
    /// Builds a page entry from one member of `query.pages`.
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::InvalidResponse`] when the entry is not an object
    /// or has no `title`.
    pub fn from_value(value: &Value) -> Result<Self, WikiError> {
        let mut extra = value
            .as_object()
            .cloned()
            .ok_or_else(|| WikiError::invalid_response(ACTION_QUERY, "query.pages"))?;

        let title = extra
            .remove("title")
            .as_ref()
            .and_then(primitive_string)
            .ok_or_else(|| WikiError::invalid_response(ACTION_QUERY, "query.pages.title"))?;
        let edit_token = non_empty_string(extra.remove("edittoken").as_ref());
        let page_id = non_empty_string(extra.remove("pageid").as_ref());

        Ok(Self {
            title,
            edit_token,
            page_id,
            extra,
        })
    }

    /// Whether the server flagged the page as not existing yet.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.extra.contains_key("missing")
    }
}

/// Fetches page info and an edit token for every title in one request.
///
/// Pages come back in `query.pageids` order when the server supplies it
/// (it does, since the request sets `indexpageids`). An empty title list
/// sends nothing and returns an empty list.
///
/// # Errors
///
/// - [`WikiError::InvalidResponse`] when `query.pages` is missing or malformed
/// - [`WikiError::Transport`] / [`WikiError::Parse`] from the request itself
#[instrument(skip_all, fields(titles = tracing::field::Empty))]
pub async fn fetch_edit_tokens<I, S>(
    client: &ApiClient,
    session: &mut AuthSession,
    titles: I,
) -> Result<Vec<PageInfo>, WikiError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let titles: Vec<String> = titles
        .into_iter()
        .map(|title| title.as_ref().to_string())
        .collect();
    tracing::Span::current().record("titles", titles.len());

    if titles.is_empty() {
        debug!("no titles requested; skipping edit token query");
        return Ok(Vec::new());
    }

    let request = ApiRequest::get(ACTION_QUERY)
        .param("prop", "info")
        .param("intoken", "edit")
        .param("titles", titles.join("|"))
        .param("indexpageids", "")
        .param("format", "json")
        .with_cookies();

    let content = client.request_json(&request, session.cookies_mut()).await?;
    let query = content
        .get("query")
        .filter(|query| query.is_object())
        .ok_or_else(|| WikiError::invalid_response(ACTION_QUERY, "query"))?;
    let pages = query
        .get("pages")
        .and_then(Value::as_object)
        .ok_or_else(|| WikiError::invalid_response(ACTION_QUERY, "query.pages"))?;

    let by_page_id: Vec<&Value> = query
        .get("pageids")
        .and_then(Value::as_array)
        .map(|ids| {
            ids.iter()
                .filter_map(primitive_string)
                .filter_map(|id| pages.get(&id))
                .collect()
        })
        .unwrap_or_default();
    let ordered: Vec<&Value> = if by_page_id.len() == pages.len() {
        by_page_id
    } else {
        pages.values().collect()
    };

    let infos = ordered
        .into_iter()
        .map(PageInfo::from_value)
        .collect::<Result<Vec<_>, _>>()?;

    report_title_mismatches(query, &titles, &infos);
    info!(pages = infos.len(), "Fetched edit tokens");
    Ok(infos)
}

/// Warns about requested titles the reply does not list verbatim.
fn report_title_mismatches(query: &Value, titles: &[String], infos: &[PageInfo]) {
    if let Some(normalized) = query.get("normalized").and_then(Value::as_array) {
        for entry in normalized {
            let from = entry.get("from").and_then(Value::as_str).unwrap_or_default();
            let to = entry.get("to").and_then(Value::as_str).unwrap_or_default();
            warn!(from, to, "server normalized title; update map key will not match");
        }
    }

    for title in titles {
        if !infos.iter().any(|page| page.title == *title) {
            warn!(title = title.as_str(), "requested title missing from edit token reply");
        }
    }
}
