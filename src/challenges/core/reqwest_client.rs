//! Reqwest-based implementation of the `ChallengeHttpClient` trait.
//!
//! Thin adapter around `reqwest::Client`. The client is shared by every run,
//! so it keeps no cookies itself; each run replays its own reqwest cookie
//! jar through [`CookieJar`].
//!
//! [`CookieJar`]: super::session::CookieJar

use async_trait::async_trait;
use reqwest::Client;

use super::{ChallengeHttpClient, ChallengeHttpResponse, ChallengeRequest, TransportError};

/// Reqwest-backed HTTP client used to fetch challenges and submit answers.
#[derive(Debug, Clone)]
pub struct ReqwestChallengeHttpClient {
    client: Client,
}

impl ReqwestChallengeHttpClient {
    /// Creates a new client with its own cookie store turned off.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_user_agent(None)
    }

    /// Creates a client that sends the given `User-Agent` on every request.
    pub fn with_user_agent(user_agent: Option<&str>) -> Result<Self, TransportError> {
        let mut builder = Client::builder().cookie_store(false);
        if let Some(agent) = user_agent {
            builder = builder.user_agent(agent.to_string());
        }
        let client = builder
            .build()
            .map_err(|err| TransportError::Http(err.to_string()))?;

        Ok(Self { client })
    }

    /// Wrap an existing reqwest client. The client should not carry a cookie
    /// store; otherwise cookies will be sent twice.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChallengeHttpClient for ReqwestChallengeHttpClient {
    async fn send(
        &self,
        request: &ChallengeRequest,
    ) -> Result<ChallengeHttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());

        if request.has_form() {
            builder = builder.form(&request.form_fields);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| TransportError::Http(err.to_string()))?;

        to_challenge_response(response).await
    }
}

async fn to_challenge_response(
    response: reqwest::Response,
) -> Result<ChallengeHttpResponse, TransportError> {
    let status = response.status().as_u16();
    let headers = response.headers().clone();
    let url = response.url().clone();
    let body = response
        .bytes()
        .await
        .map_err(|err| TransportError::Http(err.to_string()))?;

    Ok(ChallengeHttpResponse {
        status,
        headers,
        body,
        url,
    })
}
