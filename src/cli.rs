//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Log in to a MediaWiki wiki and publish page updates.
///
/// Reads a JSON object mapping page titles to their new content, logs in as
/// the bot account, and replaces the text of every listed page that has
/// non-empty content.
#[derive(Parser, Debug)]
#[command(name = "wiki-updater")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Wiki host name, e.g. example.fandom.com (API at https://HOST/api.php)
    #[arg(long)]
    pub host: Option<String>,

    /// Wiki base URL for self-hosted wikis (API at URL/api.php); overrides --host
    #[arg(long, value_name = "URL", conflicts_with = "host")]
    pub base_url: Option<String>,

    /// Bot account name
    #[arg(short, long)]
    pub username: Option<String>,

    /// Bot account password
    #[arg(long, env = "WIKI_UPDATER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Account holds the bot right (edits assert=bot instead of assert=user)
    #[arg(long)]
    pub bot: bool,

    /// JSON file mapping page titles to new content (null or "" skips a page)
    #[arg(short, long, value_name = "FILE")]
    pub pages: PathBuf,

    /// Edit summary shown in page history
    #[arg(short, long)]
    pub summary: Option<String>,

    /// Per-request timeout in milliseconds (1-60000)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=60000))]
    pub timeout_ms: Option<u64>,

    /// MediaWiki cookie prefix whose session cookies are kept as well (e.g. enwiki)
    #[arg(long)]
    pub cookie_prefix: Option<String>,

    /// Config file (default: $XDG_CONFIG_HOME/wiki-updater/config.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}
