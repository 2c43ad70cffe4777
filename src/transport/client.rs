//! API client: request construction, cookie ingestion, JSON decoding.

use std::fmt;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE, COOKIE, SET_COOKIE};
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use super::constants::{API_ENDPOINT, DEFAULT_TIMEOUT, FORM_CONTENT_TYPE};
use crate::codec::{
    CookieJar, CookieWhitelist, build_cookie_header, build_query, read_set_cookie_headers,
};
use crate::error::WikiError;
use crate::user_agent;

/// Settings applied to every request an [`ApiClient`] sends.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Whole-request timeout (connect through full body read).
    pub timeout: Duration,
    /// User-Agent header value.
    pub user_agent: String,
    /// Cookie names kept from `Set-Cookie` headers.
    pub cookie_whitelist: CookieWhitelist,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: user_agent::default_user_agent(),
            cookie_whitelist: CookieWhitelist::default(),
        }
    }
}

/// One API call: method, action, query parameters and an optional form body.
///
/// Parameter values are hidden in Debug output since they include passwords
/// and tokens.
#[derive(Clone)]
pub struct ApiRequest {
    method: Method,
    action: &'static str,
    query: Vec<(&'static str, String)>,
    form: Option<Vec<(&'static str, String)>>,
    with_cookies: bool,
}

impl ApiRequest {
    /// Starts a GET request for `action`.
    #[must_use]
    pub fn get(action: &'static str) -> Self {
        Self::new(Method::GET, action)
    }

    /// Starts a POST request for `action`.
    #[must_use]
    pub fn post(action: &'static str) -> Self {
        Self::new(Method::POST, action)
    }

    fn new(method: Method, action: &'static str) -> Self {
        Self {
            method,
            action,
            query: vec![("action", action.to_string())],
            form: None,
            with_cookies: false,
        }
    }

    /// Appends a query string parameter.
    #[must_use]
    pub fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    /// Appends a form body parameter; the request is sent url-encoded.
    #[must_use]
    pub fn form_param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.form.get_or_insert_with(Vec::new).push((key, value.into()));
        self
    }

    /// Sends the session jar as a `Cookie` header.
    #[must_use]
    pub fn with_cookies(mut self) -> Self {
        self.with_cookies = true;
        self
    }

    /// API action this request calls.
    #[must_use]
    pub fn action(&self) -> &'static str {
        self.action
    }

    /// HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Encoded query string.
    #[must_use]
    pub fn query_string(&self) -> String {
        build_query(self.query.iter().map(|(k, v)| (*k, v.as_str())))
    }

    /// Encoded form body, if any.
    #[must_use]
    pub fn form_body(&self) -> Option<String> {
        self.form
            .as_ref()
            .map(|form| build_query(form.iter().map(|(k, v)| (*k, v.as_str()))))
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys = |params: &[(&'static str, String)]| -> Vec<&'static str> {
            params.iter().map(|(k, _)| *k).collect()
        };
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("action", &self.action)
            .field("query", &keys(&self.query))
            .field("form", &self.form.as_deref().map(keys))
            .field("with_cookies", &self.with_cookies)
            .finish()
    }
}

/// HTTP client bound to one wiki's `api.php` endpoint.
///
/// Cookies are not stored in the client: each call reads from and writes to
/// the jar the caller passes in, so one run's session never leaks into
/// another.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    endpoint: Url,
    cookie_whitelist: CookieWhitelist,
}

impl ApiClient {
    /// Creates a client for `https://{host}/api.php`.
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::InvalidEndpoint`] when `host` is empty or not a
    /// valid host, and [`WikiError::ClientBuild`] when the HTTP client cannot
    /// be built.
    #[tracing::instrument(level = "debug", skip(options))]
    pub fn for_host(host: &str, options: ClientOptions) -> Result<Self, WikiError> {
        let host = host.trim();
        if host.is_empty() || host.contains(['/', '?', '#']) || host.contains(char::is_whitespace) {
            return Err(WikiError::invalid_endpoint(
                host,
                "expected a bare host name such as `example.fandom.com`",
            ));
        }
        Self::with_base_url(&format!("https://{host}/"), options)
    }

    /// Creates a client for `{base_url}/api.php` (self-hosted wikis, tests).
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::InvalidEndpoint`] when `base_url` is not an
    /// absolute http(s) URL, and [`WikiError::ClientBuild`] when the HTTP
    /// client cannot be built.
    #[tracing::instrument(level = "debug", skip(options))]
    pub fn with_base_url(base_url: &str, options: ClientOptions) -> Result<Self, WikiError> {
        let endpoint = api_endpoint(base_url)?;
        let client = Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent)
            .gzip(true)
            .build()
            .map_err(WikiError::ClientBuild)?;

        debug!(endpoint = %endpoint, "API client ready");
        Ok(Self {
            client,
            endpoint,
            cookie_whitelist: options.cookie_whitelist,
        })
    }

    /// The resolved `api.php` URL.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sends one request and parses the response body as JSON.
    ///
    /// Whitelisted `Set-Cookie` entries from the response are stored in `jar`
    /// before the body is read. The HTTP status is logged but not checked:
    /// the API reports failures in the JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::Transport`] when the request fails or times out,
    /// and [`WikiError::Parse`] when the body is not valid JSON.
    #[instrument(skip(self, request, jar), fields(action = request.action(), method = %request.method()))]
    pub async fn request_json(
        &self,
        request: &ApiRequest,
        jar: &mut CookieJar,
    ) -> Result<Value, WikiError> {
        let action = request.action;
        let mut url = self.endpoint.clone();
        url.set_query(Some(&request.query_string()));

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .header(ACCEPT, "application/json");

        if request.with_cookies && !jar.is_empty() {
            builder = builder.header(COOKIE, build_cookie_header(jar));
        }

        if let Some(body) = request.form_body() {
            builder = builder
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .header(CONTENT_LENGTH, body.len())
                .body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| WikiError::transport(action, e))?;
        let status = response.status();

        let stored = read_set_cookie_headers(
            response
                .headers()
                .get_all(SET_COOKIE)
                .iter()
                .filter_map(|value| value.to_str().ok()),
            jar,
            Some(&self.cookie_whitelist),
        );

        let body = response
            .bytes()
            .await
            .map_err(|e| WikiError::transport(action, e))?;

        debug!(
            status = status.as_u16(),
            cookies_stored = stored,
            bytes = body.len(),
            "API response received"
        );

        serde_json::from_slice(&body).map_err(|e| WikiError::parse(action, e))
    }
}

/// Resolves `api.php` against a wiki base URL.
fn api_endpoint(base_url: &str) -> Result<Url, WikiError> {
    let mut base = Url::parse(base_url.trim())
        .map_err(|e| WikiError::invalid_endpoint(base_url, e.to_string()))?;
    if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
        return Err(WikiError::invalid_endpoint(
            base_url,
            "expected an absolute http(s) URL",
        ));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.set_query(None);
    base.set_fragment(None);
    base.join(API_ENDPOINT)
        .map_err(|e| WikiError::invalid_endpoint(base_url, e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::test_support::socket_guard::{
        should_skip_socket_bound_test, start_mock_server_or_skip,
    };
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, ResponseTemplate};

    fn client_for(uri: &str) -> ApiClient {
        ApiClient::with_base_url(uri, ClientOptions::default()).unwrap()
    }

    #[test]
    fn test_for_host_builds_https_endpoint() {
        let client = ApiClient::for_host("example.fandom.com", ClientOptions::default()).unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "https://example.fandom.com/api.php"
        );
    }

    #[test]
    fn test_for_host_rejects_urls_and_empty() {
        for host in ["", "  ", "https://example.com", "example.com/w", "a b"] {
            let err = ApiClient::for_host(host, ClientOptions::default()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Configuration, "host {host:?}");
        }
    }

    #[test]
    fn test_with_base_url_appends_api_php_under_path() {
        let client =
            ApiClient::with_base_url("https://wiki.example.org/w", ClientOptions::default())
                .unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "https://wiki.example.org/w/api.php"
        );
    }

    #[test]
    fn test_with_base_url_rejects_non_http_scheme() {
        let err = ApiClient::with_base_url("ftp://example.org", ClientOptions::default())
            .unwrap_err();
        assert!(matches!(err, WikiError::InvalidEndpoint { .. }));
    }

    #[test]
    fn test_api_request_debug_hides_values() {
        let request = ApiRequest::post("login")
            .param("lgname", "Bot")
            .param("lgpassword", "hunter2");
        let debug_str = format!("{request:?}");
        assert!(debug_str.contains("lgpassword"));
        assert!(!debug_str.contains("hunter2"), "Debug must not leak values");
    }

    #[test]
    fn test_api_request_query_starts_with_action() {
        let request = ApiRequest::get("query").param("titles", "A|B");
        assert_eq!(request.query_string(), "action=query&titles=A%7CB");
        assert!(request.form_body().is_none());
    }

    #[tokio::test]
    async fn test_request_json_parses_body_and_keeps_whitelisted_cookies() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("GET"))
            .and(path("/api.php"))
            .and(query_param("action", "query"))
            .respond_with(
                ResponseTemplate::new(200)
                    .append_header("set-cookie", "wikicities_session=s1; path=/; HttpOnly")
                    .append_header("set-cookie", "Geo=%7B%7D; path=/")
                    .set_body_json(serde_json::json!({"query": {"ok": true}})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server.uri());
        let mut jar = CookieJar::new();
        let content = client
            .request_json(&ApiRequest::get("query"), &mut jar)
            .await
            .unwrap();

        assert_eq!(content["query"]["ok"], serde_json::json!(true));
        assert_eq!(jar.len(), 1, "only whitelisted cookies are kept");
        assert_eq!(jar.get("wikicities_session"), Some("s1"));
    }

    #[tokio::test]
    async fn test_request_json_sends_cookie_header_when_requested() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("GET"))
            .and(path("/api.php"))
            .and(header("cookie", "wikicities_session=s1; wikicitiesToken=t"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server.uri());
        let mut jar: CookieJar = [("wikicities_session", "s1"), ("wikicitiesToken", "t")]
            .into_iter()
            .collect();
        client
            .request_json(&ApiRequest::get("query").with_cookies(), &mut jar)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_request_json_posts_form_body() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("POST"))
            .and(path("/api.php"))
            .and(query_param("action", "edit"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(header("content-length", "26"))
            .and(body_string("title=A%20B&text=x%26y%3Dz"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server.uri());
        let request = ApiRequest::post("edit")
            .form_param("title", "A B")
            .form_param("text", "x&y=z");
        client
            .request_json(&request, &mut CookieJar::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_request_json_no_set_cookie_leaves_jar_unchanged() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server.uri());
        let mut jar: CookieJar = [("wikicitiesToken", "t")].into_iter().collect();
        let before = jar.clone();
        client
            .request_json(&ApiRequest::get("query"), &mut jar)
            .await
            .unwrap();
        assert_eq!(jar, before);
    }

    #[tokio::test]
    async fn test_request_json_non_json_body_is_parse_error() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("<html>maintenance</html>"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server.uri());
        let err = client
            .request_json(&ApiRequest::get("query"), &mut CookieJar::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse, "got: {err}");
    }

    #[tokio::test]
    async fn test_request_json_timeout_is_transport_error() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let options = ClientOptions {
            timeout: Duration::from_millis(100),
            ..ClientOptions::default()
        };
        let client = ApiClient::with_base_url(&mock_server.uri(), options).unwrap();
        let err = client
            .request_json(&ApiRequest::get("query"), &mut CookieJar::new())
            .await
            .unwrap_err();

        match err {
            WikiError::Transport {
                action, timed_out, ..
            } => {
                assert_eq!(action, "query");
                assert!(timed_out, "expected a timeout");
            }
            other => panic!("Expected Transport error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_request_json_connection_refused_is_transport_error() {
        if should_skip_socket_bound_test() {
            return;
        }
        // Bind then drop a listener to get a port nothing listens on.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = client_for(&format!("http://127.0.0.1:{port}"));
        let err = client
            .request_json(&ApiRequest::get("query"), &mut CookieJar::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport, "got: {err}");
    }
}
