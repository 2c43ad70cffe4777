//! CLI entry point for wiki-updater.

use std::fmt;
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{debug, error, info};
use wiki_updater_core::{
    ApiClient, ClientOptions, CookieWhitelist, Credentials, DEFAULT_TIMEOUT_MS, EditOptions,
    UpdateMap, default_user_agent, run_with_client,
};

mod app_config;
mod cli;

use app_config::{FileConfig, load_config};
use cli::Args;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let loaded = load_config(args.config.as_deref())?;
    match (&loaded.path, &loaded.config) {
        (Some(path), Some(_)) => debug!(path = %path.display(), "Loaded config file"),
        (Some(path), None) => debug!(path = %path.display(), "No config file found"),
        (None, _) => debug!("No config directory known"),
    }
    let file = loaded.config.unwrap_or_default();

    let settings = Settings::resolve(&args, &file)?;
    let updates = read_update_map(&args.pages)?;
    info!(
        wiki = %settings.wiki,
        username = %settings.credentials.username(),
        pages = updates.len(),
        "wiki-updater starting"
    );

    let client = match &settings.wiki {
        Wiki::Host(host) => ApiClient::for_host(host, settings.client_options)?,
        Wiki::BaseUrl(url) => ApiClient::with_base_url(url, settings.client_options)?,
    };
    match run_with_client(&client, &updates, &settings.credentials, &settings.edit_options).await {
        Ok(report) => {
            info!(
                updated = ?report.updated,
                unchanged = ?report.unchanged,
                skipped = ?report.skipped,
                "Done"
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            error!(
                kind = %err.kind(),
                updated = ?err.report.updated,
                unchanged = ?err.report.unchanged,
                "{err}"
            );
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Where the wiki's `api.php` lives.
enum Wiki {
    Host(String),
    BaseUrl(String),
}

impl fmt::Display for Wiki {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host(host) => f.write_str(host),
            Self::BaseUrl(url) => f.write_str(url),
        }
    }
}

/// Effective run settings: CLI values over config file values over defaults.
struct Settings {
    wiki: Wiki,
    credentials: Credentials,
    edit_options: EditOptions,
    client_options: ClientOptions,
}

impl Settings {
    fn resolve(args: &Args, file: &FileConfig) -> Result<Self> {
        let wiki = match (&args.base_url, &args.host, &file.host) {
            (Some(url), _, _) => Wiki::BaseUrl(url.clone()),
            (None, Some(host), _) | (None, None, Some(host)) => Wiki::Host(host.clone()),
            (None, None, None) => {
                bail!("No wiki host given: pass --host or set `host` in the config file")
            }
        };
        let Some(username) = args.username.clone().or_else(|| file.username.clone()) else {
            bail!("No username given: pass --username or set `username` in the config file");
        };
        let Some(password) = args.password.clone() else {
            bail!("No password given: pass --password or set WIKI_UPDATER_PASSWORD");
        };
        let registered_bot = args.bot || file.registered_bot.unwrap_or(false);

        let mut edit_options = EditOptions::new(registered_bot);
        if let Some(summary) = args.summary.as_ref().or(file.edit_summary.as_ref()) {
            edit_options = edit_options.with_summary(summary.as_str());
        }

        let timeout_ms = args
            .timeout_ms
            .or(file.timeout_ms)
            .unwrap_or(DEFAULT_TIMEOUT_MS);
        let mut cookie_whitelist = CookieWhitelist::default();
        if let Some(prefix) = args.cookie_prefix.as_ref().or(file.cookie_prefix.as_ref()) {
            cookie_whitelist = cookie_whitelist.with_prefix(prefix);
        }
        let client_options = ClientOptions {
            timeout: Duration::from_millis(timeout_ms),
            user_agent: file.user_agent.clone().unwrap_or_else(default_user_agent),
            cookie_whitelist,
        };

        Ok(Self {
            wiki,
            credentials: Credentials::new(username, password, registered_bot),
            edit_options,
            client_options,
        })
    }
}

fn read_update_map(path: &Path) -> Result<UpdateMap> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read pages file '{}'", path.display()))?;
    serde_json::from_str(&raw).with_context(|| {
        format!(
            "Failed to parse pages file '{}': expected a JSON object of title -> string or null",
            path.display()
        )
    })
}
