//! HTTP-JSON transport for the MediaWiki Action API.
//!
//! One [`ApiClient`] call sends one request, feeds the response's
//! `Set-Cookie` lines through the session cookie whitelist into the caller's
//! [`CookieJar`](crate::codec::CookieJar), and parses the body as JSON.
//!
//! # Example
//!
//! ```no_run
//! use wiki_updater_core::codec::CookieJar;
//! use wiki_updater_core::transport::{ApiClient, ApiRequest, ClientOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::for_host("example.fandom.com", ClientOptions::default())?;
//! let mut jar = CookieJar::new();
//! let request = ApiRequest::get("query")
//!     .param("meta", "siteinfo")
//!     .param("format", "json");
//! let content = client.request_json(&request, &mut jar).await?;
//! println!("{content}");
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;

pub use client::{ApiClient, ApiRequest, ClientOptions};
pub use constants::{API_ENDPOINT, DEFAULT_TIMEOUT, DEFAULT_TIMEOUT_MS};
