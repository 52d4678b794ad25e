//! HTTP transport: request building, fixed headers, outcome classification.
//!
//! Every request goes out with the same browser `User-Agent` and a `Cookie`
//! header derived from the session. Redirect following is deliberately
//! disabled: several operations (friend add/remove, thread-id discovery)
//! signal success or carry data via the redirect itself, so a 301/302 is
//! surfaced as [`Outcome::Redirect`] instead of being silently chased.
//!
//! The transport holds no connection state across calls. Each request builds
//! and owns its own `reqwest::Client`, released on every exit path, so calls
//! are reentrant and nothing mutable is shared across an await point.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use reqwest::redirect;

use crate::error::TransportError;
use crate::params::Params;
use crate::session::Session;

/// Production host for the upstream site.
pub const DEFAULT_BASE_URL: &str = "https://interpals.net";

/// Fixed browser User-Agent; part of the wire contract with the site.
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                              (KHTML, like Gecko) Chrome/70.0.3538.77 Safari/537.36";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Body fragment present on every page rendered for a logged-in session.
const LOGGED_IN_MARKER: &str = "/app/auth/logout";

/// Classified result of one request.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// A non-redirect response; carries the body text regardless of status.
    Body(String),
    /// A 301/302 response with its `Location` header, not followed.
    Redirect { status: u16, location: String },
}

impl Outcome {
    /// The redirect target, if this outcome is a redirect.
    pub fn redirect_location(&self) -> Option<&str> {
        match self {
            Outcome::Redirect { location, .. } => Some(location),
            Outcome::Body(_) => None,
        }
    }
}

/// Returns true when a body carries the logged-in marker.
///
/// Classification is independent of the HTTP status code: the site answers
/// expired sessions with a 200 login page.
pub fn is_authenticated(body: &str) -> bool {
    body.contains(LOGGED_IN_MARKER)
}

/// The request-issuing seam between the facade and the network.
///
/// The facade and the pagination drivers only ever talk to this trait, so
/// tests can substitute a scripted transport and exercise the full operation
/// logic without a server.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues a GET request; `params` are encoded into the query string.
    async fn get(&self, path: &str, params: Option<&Params>) -> Result<Outcome, TransportError>;

    /// Issues a POST request with a form-urlencoded body.
    async fn post(&self, path: &str, params: &Params) -> Result<Outcome, TransportError>;
}

/// Reqwest-backed transport bound to one session.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    cookie_header: String,
    timeout: Duration,
}

impl HttpTransport {
    /// Builds a transport for the production host.
    pub fn new(session: &Session) -> Self {
        Self::with_base_url(session, DEFAULT_BASE_URL)
    }

    /// Builds a transport against a custom base URL (used by tests).
    pub fn with_base_url(session: &Session, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            cookie_header: session.cookies().as_header(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn full_url(&self, path: &str, params: Option<&Params>) -> String {
        let mut url = String::with_capacity(self.base_url.len() + path.len() + 1);
        url.push_str(&self.base_url);
        if !path.starts_with('/') {
            url.push('/');
        }
        url.push_str(path);
        if let Some(params) = params.filter(|p| !p.is_empty()) {
            url.push('?');
            url.push_str(&params.encode());
        }
        url
    }

    fn client(&self) -> Result<reqwest::Client, TransportError> {
        reqwest::Client::builder()
            .redirect(redirect::Policy::none())
            .timeout(self.timeout)
            .build()
            .map_err(TransportError::Request)
    }

    async fn classify(&self, response: reqwest::Response) -> Result<Outcome, TransportError> {
        let status = response.status().as_u16();
        if status == 301 || status == 302 {
            let location = response
                .headers()
                .get(header::LOCATION)
                .and_then(|value| value.to_str().ok())
                .ok_or(TransportError::MissingLocation)?
                .to_string();
            log::debug!("redirect ({status}) -> {location}");
            return Ok(Outcome::Redirect { status, location });
        }
        let body = response.text().await.map_err(TransportError::Body)?;
        log::debug!("response ({status}), {} bytes", body.len());
        Ok(Outcome::Body(body))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, params: Option<&Params>) -> Result<Outcome, TransportError> {
        let url = self.full_url(path, params);
        log::debug!("GET {url}");
        let response = self
            .client()?
            .get(&url)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::COOKIE, &self.cookie_header)
            .send()
            .await
            .map_err(TransportError::from_request)?;
        self.classify(response).await
    }

    async fn post(&self, path: &str, params: &Params) -> Result<Outcome, TransportError> {
        let url = self.full_url(path, None);
        log::debug!("POST {url}");
        let response = self
            .client()?
            .post(&url)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::COOKIE, &self.cookie_header)
            .header(
                header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(params.encode())
            .send()
            .await
            .map_err(TransportError::from_request)?;
        self.classify(response).await
    }
}
