//! Session replay.
//!
//! The server ties consecutive requests to one puzzle attempt through cookies.
//! A [`ReplayableSession`] injects that state into every outgoing request and
//! absorbs whatever the server hands back.

use http::header::{COOKIE, SET_COOKIE};
use reqwest::cookie::{CookieStore, Jar};
use url::Url;

use super::executor::{ChallengeHttpResponse, TransportError};
use super::types::ChallengeRequest;

/// Server-issued continuity state that is replayed on every request of a run.
pub trait ReplayableSession: Send {
    /// Add the session state to an outgoing request.
    fn attach(&self, request: &mut ChallengeRequest) -> Result<(), TransportError>;

    /// Absorb state returned by the server.
    fn capture(&mut self, response: &ChallengeHttpResponse);
}

/// Per-run cookie store.
///
/// Backed by reqwest's [`Jar`], so domain, path, `Max-Age` and `Expires`
/// attributes are honoured: a cookie the server deletes is not replayed.
#[derive(Debug, Default)]
pub struct CookieJar {
    store: Jar,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `Cookie` header value that would accompany a request to `url`.
    pub fn header_for(&self, url: &Url) -> Option<String> {
        self.store
            .cookies(url)
            .and_then(|value| value.to_str().ok().map(str::to_owned))
    }
}

impl ReplayableSession for CookieJar {
    fn attach(&self, request: &mut ChallengeRequest) -> Result<(), TransportError> {
        if let Some(value) = self.store.cookies(&request.url) {
            request.headers.insert(COOKIE, value);
        }
        Ok(())
    }

    fn capture(&mut self, response: &ChallengeHttpResponse) {
        let mut headers = response.headers.get_all(SET_COOKIE).iter();
        self.store.set_cookies(&mut headers, &response.url);
    }
}
