//! Shared User-Agent string for wiki API traffic.
//!
//! Wikis ask bots to identify themselves; every request of a run carries the
//! same agent string so the bot is easy to recognize in server logs.

/// Short bot identification included in the User-Agent.
const BOT_IDENTIFICATION: &str = "latest-chapter-bot";

/// Default User-Agent for API requests (identifies the tool and its version).
#[must_use]
pub fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("wiki-updater/{version} ({BOT_IDENTIFICATION})")
}
