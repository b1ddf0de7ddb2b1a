//! Request execution utilities.
//!
//! Sends a planned [`ChallengeRequest`] through the HTTP transport while
//! replaying the run's session: cookies are attached before the request leaves
//! and captured again from the response.

use async_trait::async_trait;
use bytes::Bytes;
use http::header::HeaderMap;
use thiserror::Error;
use url::Url;

use super::session::ReplayableSession;
use super::types::ChallengeRequest;

/// Contract that abstracts the underlying HTTP transport.
///
/// Implementations must not keep cookies of their own; session state lives in
/// the [`ReplayableSession`] handed to [`execute_request`].
#[async_trait]
pub trait ChallengeHttpClient: Send + Sync {
    async fn send(&self, request: &ChallengeRequest)
    -> Result<ChallengeHttpResponse, TransportError>;
}

/// Minimal response representation returned by the transport abstraction.
#[derive(Debug, Clone)]
pub struct ChallengeHttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub url: Url,
}

/// Connection or request failures raised by either transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http transport error: {0}")]
    Http(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("connection closed by peer")]
    Closed,
}

/// Send one request with the session attached, then capture the response
/// cookies back into the session.
pub async fn execute_request<S>(
    client: &dyn ChallengeHttpClient,
    session: &mut S,
    mut request: ChallengeRequest,
) -> Result<ChallengeHttpResponse, TransportError>
where
    S: ReplayableSession + ?Sized,
{
    session.attach(&mut request)?;
    log::debug!("-> {} {}", request.method, request.url);

    let response = client.send(&request).await?;
    log::debug!(
        "<- {} {} ({} bytes)",
        response.status,
        response.url,
        response.body.len()
    );

    session.capture(&response);
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenges::core::session::CookieJar;
    use http::HeaderValue;
    use http::header::{COOKIE, SET_COOKIE};
    use std::sync::Mutex;

    struct StubClient {
        responses: Mutex<Vec<ChallengeHttpResponse>>,
        seen: Mutex<Vec<ChallengeRequest>>,
    }

    impl StubClient {
        fn new(responses: Vec<ChallengeHttpResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().rev().collect()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChallengeHttpClient for StubClient {
        async fn send(
            &self,
            request: &ChallengeRequest,
        ) -> Result<ChallengeHttpResponse, TransportError> {
            self.seen.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop()
                .ok_or(TransportError::Closed)
        }
    }

    fn make_response(cookies: &[&'static str]) -> ChallengeHttpResponse {
        let mut headers = HeaderMap::new();
        for cookie in cookies {
            headers.append(SET_COOKIE, HeaderValue::from_static(cookie));
        }
        ChallengeHttpResponse {
            status: 200,
            headers,
            body: Bytes::from_static(b"ok"),
            url: Url::parse("http://example.com/").unwrap(),
        }
    }

    #[tokio::test]
    async fn captured_cookies_are_replayed_on_next_request() {
        let client = StubClient::new(vec![
            make_response(&["PHPSESSID=abc; path=/", "spip=1"]),
            make_response(&[]),
        ]);
        let mut jar = CookieJar::new();
        let url = Url::parse("http://example.com/").unwrap();

        execute_request(&client, &mut jar, ChallengeRequest::get(url.clone()))
            .await
            .unwrap();
        execute_request(&client, &mut jar, ChallengeRequest::get(url))
            .await
            .unwrap();

        let seen = client.seen.lock().unwrap();
        assert!(seen[0].headers.get(COOKIE).is_none());
        let mut replayed: Vec<&str> = seen[1]
            .headers
            .get(COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .split("; ")
            .collect();
        replayed.sort_unstable();
        assert_eq!(replayed, ["PHPSESSID=abc", "spip=1"]);
    }

    #[tokio::test]
    async fn transport_failure_is_propagated() {
        let client = StubClient::new(vec![]);
        let mut jar = CookieJar::new();
        let url = Url::parse("http://example.com/").unwrap();

        let err = execute_request(&client, &mut jar, ChallengeRequest::get(url))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Closed));
    }
}
