//! Two-phase login state machine.
//!
//! The legacy MediaWiki login API may answer the first `action=login` with
//! `NeedToken`, in which case the same request must be repeated with the
//! returned token and the cookies set by the first reply. Either way the
//! machine ends in [`LoginState::Authenticated`] or an error:
//!
//! ```text
//! Unauthenticated --POST login--> TokenObtained --Success--> Authenticated
//!                                       |
//!                                   NeedToken
//!                                       v
//!                                  NeedConfirm --POST login+lgtoken--> Authenticated
//! ```
//!
//! Any transition may fail with [`WikiError`], which ends the run.

use std::fmt;

use serde_json::Value;
use tracing::{debug, info, instrument};

use super::Credentials;
use crate::codec::{CookieJar, non_empty_string};
use crate::error::WikiError;
use crate::transport::{ApiClient, ApiRequest};

const ACTION_LOGIN: &str = "login";
const RESULT_SUCCESS: &str = "Success";
const RESULT_NEED_TOKEN: &str = "NeedToken";

/// An authenticated session: the cookie jar plus the tokens login returned.
///
/// Created only by [`login`]. Token values are redacted in Debug output.
#[derive(Clone, Default)]
pub struct AuthSession {
    cookies: CookieJar,
    token: Option<String>,
    confirmed_token: Option<String>,
    session_id: Option<String>,
}

impl AuthSession {
    /// Session cookies accumulated so far.
    #[must_use]
    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    /// Jar handed to the transport for authenticated calls.
    pub(crate) fn cookies_mut(&mut self) -> &mut CookieJar {
        &mut self.cookies
    }

    /// Login token from the first login reply.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// `lgtoken` from the confirm reply (two-phase logins only).
    #[must_use]
    pub fn confirmed_token(&self) -> Option<&str> {
        self.confirmed_token.as_deref()
    }

    /// `sessionid` from the confirm reply (two-phase logins only).
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("AuthSession")
            .field("cookies", &self.cookies)
            .field("token", &redact(&self.token))
            .field("confirmed_token", &redact(&self.confirmed_token))
            .field("session_id", &redact(&self.session_id))
            .finish()
    }
}

/// States of the login handshake.
pub enum LoginState {
    /// No request sent yet.
    Unauthenticated,
    /// First reply received and validated; `result` not yet acted on.
    TokenObtained {
        /// `login.result` as returned by the server.
        result: String,
        /// `login.token` (or `login.lgtoken`).
        token: String,
        /// Cookies set by the first reply.
        cookies: CookieJar,
    },
    /// Server asked for the token to be confirmed.
    NeedConfirm {
        /// Token to send back as `lgtoken`.
        token: String,
        /// Cookies to send with the confirm request.
        cookies: CookieJar,
    },
    /// Login complete.
    Authenticated(AuthSession),
}

impl LoginState {
    /// Short state name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::TokenObtained { .. } => "token_obtained",
            Self::NeedConfirm { .. } => "need_confirm",
            Self::Authenticated(_) => "authenticated",
        }
    }

    /// Whether this is the terminal success state.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Performs one transition.
    ///
    /// `Unauthenticated` and `NeedConfirm` send one request each;
    /// `TokenObtained` is decided locally; `Authenticated` stays put.
    ///
    /// # Errors
    ///
    /// - [`WikiError::InvalidResponse`] when a login reply lacks a required field
    /// - [`WikiError::LoginFailed`] when the result is neither `Success` nor `NeedToken`
    /// - [`WikiError::Transport`] / [`WikiError::Parse`] from the request itself
    pub async fn advance(
        self,
        client: &ApiClient,
        credentials: &Credentials,
    ) -> Result<Self, WikiError> {
        match self {
            Self::Unauthenticated => request_login_token(client, credentials).await,
            Self::TokenObtained {
                result,
                token,
                cookies,
            } => settle_login_result(&result, token, cookies),
            Self::NeedConfirm { token, cookies } => {
                confirm_login_token(client, credentials, token, cookies)
                    .await
                    .map(Self::Authenticated)
            }
            Self::Authenticated(session) => Ok(Self::Authenticated(session)),
        }
    }
}

impl fmt::Debug for LoginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Logs in and returns the authenticated session.
///
/// # Errors
///
/// Returns the first error raised by any transition; see
/// [`LoginState::advance`].
#[instrument(skip_all, fields(username = %credentials.username()))]
pub async fn login(client: &ApiClient, credentials: &Credentials) -> Result<AuthSession, WikiError> {
    let mut state = LoginState::Unauthenticated;
    loop {
        state = match state {
            LoginState::Authenticated(session) => {
                info!(
                    two_phase = session.confirmed_token.is_some(),
                    cookies = session.cookies.len(),
                    "Logged in"
                );
                return Ok(session);
            }
            current => {
                let from = current.name();
                let next = current.advance(client, credentials).await?;
                debug!(from, to = next.name(), "login state transition");
                next
            }
        };
    }
}

/// First round trip: `action=login` without a token.
async fn request_login_token(
    client: &ApiClient,
    credentials: &Credentials,
) -> Result<LoginState, WikiError> {
    let request = ApiRequest::post(ACTION_LOGIN)
        .param("lgname", credentials.username())
        .param("lgpassword", credentials.password())
        .param("format", "json");

    let mut cookies = CookieJar::new();
    let content = client.request_json(&request, &mut cookies).await?;
    let login = login_object(&content)?;

    // {result, token, cookieprefix}
    let result = non_empty_string(login.get("result"))
        .ok_or_else(|| WikiError::invalid_response(ACTION_LOGIN, "login.result"))?;
    let token = non_empty_string(login.get("token"))
        .or_else(|| non_empty_string(login.get("lgtoken")))
        .ok_or_else(|| WikiError::invalid_response(ACTION_LOGIN, "login.token"))?;

    if let Some(prefix) = login.get("cookieprefix").and_then(Value::as_str) {
        debug!(cookie_prefix = prefix, "server reported cookie prefix");
    }

    Ok(LoginState::TokenObtained {
        result,
        token,
        cookies,
    })
}

fn settle_login_result(
    result: &str,
    token: String,
    cookies: CookieJar,
) -> Result<LoginState, WikiError> {
    match result {
        RESULT_SUCCESS => Ok(LoginState::Authenticated(AuthSession {
            cookies,
            token: Some(token),
            confirmed_token: None,
            session_id: None,
        })),
        RESULT_NEED_TOKEN => Ok(LoginState::NeedConfirm { token, cookies }),
        other => Err(WikiError::login_failed(other)),
    }
}

/// Second round trip: repeat the login with `lgtoken` and the first reply's cookies.
async fn confirm_login_token(
    client: &ApiClient,
    credentials: &Credentials,
    token: String,
    mut cookies: CookieJar,
) -> Result<AuthSession, WikiError> {
    let request = ApiRequest::post(ACTION_LOGIN)
        .param("lgname", credentials.username())
        .param("lgpassword", credentials.password())
        .param("lgtoken", token.as_str())
        .param("format", "json")
        .with_cookies();

    let content = client.request_json(&request, &mut cookies).await?;
    let login = login_object(&content)?;

    // {result, lguserid, lgusername, lgtoken, cookieprefix, sessionid}
    let confirmed_token = non_empty_string(login.get("lgtoken"))
        .ok_or_else(|| WikiError::invalid_response(ACTION_LOGIN, "login.lgtoken"))?;
    let session_id = non_empty_string(login.get("sessionid"));

    Ok(AuthSession {
        cookies,
        token: Some(token),
        confirmed_token: Some(confirmed_token),
        session_id,
    })
}

fn login_object(content: &Value) -> Result<&Value, WikiError> {
    content
        .get("login")
        .filter(|login| login.is_object())
        .ok_or_else(|| WikiError::invalid_response(ACTION_LOGIN, "login"))
}
