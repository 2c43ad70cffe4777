//! Wiki Updater Core Library
//!
//! Logs in to a MediaWiki (Wikia/Fandom) wiki as a bot account and replaces
//! the text of a set of pages, driven by a title -> content map.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`codec`] - Cookie jar, `Set-Cookie` parsing, query strings, JSON scalars
//! - [`transport`] - One HTTP request in, parsed JSON out
//! - [`auth`] - Two-phase login state machine
//! - [`edit`] - Batched edit-token query and single-page edits
//! - [`orchestrator`] - Login, fetch, edit pipeline for one run
//! - [`error`] - Error types shared by all of the above
//!
//! # Example
//!
//! ```no_run
//! use wiki_updater_core::{Credentials, UpdateMap, run};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let updates: UpdateMap = serde_json::from_str(r#"{"Latest Chapter": "Chapter 1093"}"#)?;
//! let credentials = Credentials::new("ChapterBot", "hunter2", true);
//! let report = run("onepiece.fandom.com", &updates, &credentials).await?;
//! println!("updated: {:?}", report.updated);
//! # Ok(())
//! # }
//! ```

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod codec;
pub mod edit;
pub mod error;
pub mod orchestrator;
pub mod transport;
pub mod user_agent;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use auth::{AuthSession, Credentials, LoginState, login};
pub use codec::{CookieJar, CookieWhitelist};
pub use edit::{
    DEFAULT_EDIT_SUMMARY, EditOptions, PageInfo, SkipReason, UpdateMap, UpdateOutcome,
    fetch_edit_tokens, update_page,
};
pub use error::{ErrorKind, WikiError};
pub use orchestrator::{RunError, RunReport, run, run_with_client};
pub use transport::{ApiClient, ApiRequest, ClientOptions, DEFAULT_TIMEOUT, DEFAULT_TIMEOUT_MS};
pub use user_agent::default_user_agent;
