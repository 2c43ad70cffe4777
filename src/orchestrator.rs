//! One update run: login, token fetch, then edits in order.

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::auth::{Credentials, login};
use crate::edit::{EditOptions, UpdateMap, UpdateOutcome, fetch_edit_tokens, update_page};
use crate::error::{ErrorKind, WikiError};
use crate::transport::{ApiClient, ClientOptions};

/// Titles touched by a run, grouped by outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Edits that created a new revision.
    pub updated: Vec<String>,
    /// Edits the server accepted as no-ops.
    pub unchanged: Vec<String>,
    /// Pages left alone.
    pub skipped: Vec<String>,
}

impl RunReport {
    fn record(&mut self, outcome: UpdateOutcome) {
        match outcome {
            UpdateOutcome::Updated {
                title,
                changed: true,
            } => self.updated.push(title),
            UpdateOutcome::Updated {
                title,
                changed: false,
            } => self.unchanged.push(title),
            UpdateOutcome::Skipped { title, .. } => self.skipped.push(title),
        }
    }

    /// Number of edits the server accepted.
    #[must_use]
    pub fn edited(&self) -> usize {
        self.updated.len() + self.unchanged.len()
    }
}

/// A run that stopped early, with what it had done before stopping.
#[derive(Debug, Error)]
#[error("{source} ({} page(s) edited before the failure)", .report.edited())]
pub struct RunError {
    /// The failure that ended the run.
    pub source: WikiError,
    /// Pages handled before the failure.
    pub report: RunReport,
}

impl RunError {
    /// Classification of the underlying error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}

/// Runs an update against `https://{host}/api.php` with default client
/// settings.
///
/// # Errors
///
/// Returns [`RunError`] on the first failure; see [`run_with_client`].
pub async fn run(
    host: &str,
    updates: &UpdateMap,
    credentials: &Credentials,
) -> Result<RunReport, RunError> {
    let client = ApiClient::for_host(host, ClientOptions::default()).map_err(|source| RunError {
        source,
        report: RunReport::default(),
    })?;
    let options = EditOptions::new(credentials.registered_bot());
    run_with_client(&client, updates, credentials, &options).await
}

/// Logs in, fetches edit tokens for every title of `updates` in one request,
/// then edits the returned pages one at a time.
///
/// Stops at the first error. Nothing is retried or rolled back; pages edited
/// before the failure are listed in [`RunError::report`].
///
/// # Errors
///
/// Returns [`RunError`] wrapping the first [`WikiError`] raised by login,
/// the token fetch or an edit.
#[instrument(skip_all, fields(endpoint = %client.endpoint(), pages = updates.len()))]
pub async fn run_with_client(
    client: &ApiClient,
    updates: &UpdateMap,
    credentials: &Credentials,
    options: &EditOptions,
) -> Result<RunReport, RunError> {
    let mut report = RunReport::default();
    match execute(client, updates, credentials, options, &mut report).await {
        Ok(()) => {
            info!(
                updated = report.updated.len(),
                unchanged = report.unchanged.len(),
                skipped = report.skipped.len(),
                "Update run complete"
            );
            Ok(report)
        }
        Err(source) => {
            warn!(
                kind = %source.kind(),
                edited = report.edited(),
                "Update run aborted"
            );
            Err(RunError { source, report })
        }
    }
}

async fn execute(
    client: &ApiClient,
    updates: &UpdateMap,
    credentials: &Credentials,
    options: &EditOptions,
    report: &mut RunReport,
) -> Result<(), WikiError> {
    let mut session = login(client, credentials).await?;
    // An empty map still logs in (credentials get checked) but sends no token query.
    let pages = fetch_edit_tokens(client, &mut session, updates.titles()).await?;

    for page in &pages {
        let outcome = update_page(client, &mut session, updates, page, options).await?;
        report.record(outcome);
    }
    Ok(())
}
