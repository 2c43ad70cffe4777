//! Edit-token retrieval and page edits.
//!
//! - [`UpdateMap`] - titles to publish and their new content
//! - [`fetch_edit_tokens`] - one batched `prop=info&intoken=edit` query
//! - [`update_page`] - one `action=edit` per requested page

mod tokens;
mod update_map;
mod updater;

pub use tokens::{PageInfo, fetch_edit_tokens};
pub use update_map::UpdateMap;
pub use updater::{DEFAULT_EDIT_SUMMARY, EditOptions, SkipReason, UpdateOutcome, update_page};
