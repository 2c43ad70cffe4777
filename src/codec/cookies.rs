//! Session cookie jar and `Cookie` / `Set-Cookie` header handling.
//!
//! The jar is a small insertion-ordered name/value map. Only the cookies that
//! identify a wiki session are kept; everything else a server sets is dropped
//! by the [`CookieWhitelist`].

use std::fmt;

use tracing::{debug, trace};

/// Session cookie names used by Wikia/Fandom wikis.
///
/// `wikicities_session` is the session id returned as `login.sessionid` and
/// `wikicitiesToken` the confirmed `login.lgtoken`.
pub const WIKIA_SESSION_COOKIES: [&str; 6] = [
    "wikia_session_id",
    "wikicities_session",
    "wikicitiesUserID",
    "wikicitiesUserName",
    "wikicitiesToken",
    "access_token",
];

/// Cookies carried across the requests of one run.
///
/// Names are unique. Setting an existing name replaces its value in place, so
/// iteration order is the order names were first seen.
///
/// Values are redacted in Debug output to prevent accidental logging of
/// session credentials.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    entries: Vec<(String, String)>,
}

impl CookieJar {
    /// Creates an empty jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a cookie, replacing any previous value for the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    /// Returns the value stored for `name`.
    ///
    /// Cookie values are sensitive; avoid logging the return value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Number of cookies in the jar.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the jar holds no cookies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Iterates cookie names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for CookieJar {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut jar = Self::new();
        for (name, value) in iter {
            jar.set(name, value);
        }
        jar
    }
}

impl fmt::Debug for CookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(n, _)| (n, "[REDACTED]")))
            .finish()
    }
}

/// The set of cookie names worth keeping from `Set-Cookie` headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieWhitelist {
    names: Vec<String>,
}

impl Default for CookieWhitelist {
    fn default() -> Self {
        Self::from_names(WIKIA_SESSION_COOKIES)
    }
}

impl CookieWhitelist {
    /// Creates a whitelist from explicit cookie names.
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut whitelist = Self { names: Vec::new() };
        for name in names {
            whitelist.push(name.into());
        }
        whitelist
    }

    /// Adds the standard MediaWiki session cookies for a `cookieprefix`
    /// (e.g. `enwiki` gives `enwiki_session`, `enwikiUserID`, ...).
    #[must_use]
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        for suffix in ["_session", "UserID", "UserName", "Token"] {
            self.push(format!("{prefix}{suffix}"));
        }
        self
    }

    /// Whether a raw `Set-Cookie` line sets one of the allowed names.
    #[must_use]
    pub fn allows(&self, header_line: &str) -> bool {
        let line = header_line.trim_start();
        self.names.iter().any(|name| {
            line.strip_prefix(name.as_str())
                .is_some_and(|rest| rest.starts_with('='))
        })
    }

    /// Allowed names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    fn push(&mut self, name: String) {
        if !self.names.contains(&name) {
            self.names.push(name);
        }
    }
}

/// Renders the jar as a `Cookie` request header value (`a=1; b=2`).
#[must_use]
pub fn build_cookie_header(jar: &CookieJar) -> String {
    jar.iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Reads `Set-Cookie` header lines into `jar`.
///
/// For each line accepted by `whitelist` (or every line when `whitelist` is
/// `None`), the part before the first `;` is split on the first `=` into name
/// and value and stored, replacing any previous value.
///
/// Returns the number of cookies stored. Zero means "no cookies": when there
/// are no header lines at all the jar is left untouched.
pub fn read_set_cookie_headers<'a, I>(
    header_lines: I,
    jar: &mut CookieJar,
    whitelist: Option<&CookieWhitelist>,
) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    let mut stored = 0;
    for line in header_lines {
        if let Some(whitelist) = whitelist
            && !whitelist.allows(line)
        {
            trace!(
                name = cookie_name(line),
                "ignoring cookie outside session whitelist"
            );
            continue;
        }

        let pair = line.split(';').next().unwrap_or_default().trim();
        if pair.is_empty() {
            continue;
        }
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        debug!(name, "stored session cookie");
        jar.set(name, value);
        stored += 1;
    }
    stored
}

/// Cookie name of a raw `Set-Cookie` line, for logging.
fn cookie_name(line: &str) -> &str {
    let pair = line.split(';').next().unwrap_or_default().trim();
    pair.split_once('=').map_or(pair, |(name, _)| name)
}
