//! Core data structures shared by the transports, parsers, and submitters.

use http::{HeaderMap, Method};
use url::Url;

/// Outbound HTTP request planned by a puzzle before the session is attached.
#[derive(Debug, Clone)]
pub struct ChallengeRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub form_fields: Vec<(String, String)>,
}

impl ChallengeRequest {
    /// Plain GET without body.
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: HeaderMap::new(),
            form_fields: Vec::new(),
        }
    }

    /// Form-encoded POST carrying the provided fields in order.
    pub fn post_form(url: Url, form_fields: Vec<(String, String)>) -> Self {
        Self {
            method: Method::POST,
            url,
            headers: HeaderMap::new(),
            form_fields,
        }
    }

    /// Append a query-string pair to the request URL.
    pub fn with_query(mut self, name: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(name, value);
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn has_form(&self) -> bool {
        !self.form_fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pairs_are_appended_to_existing_path() {
        let url = Url::parse("http://example.com/ch1/ep1_v.php").unwrap();
        let request = ChallengeRequest::get(url).with_query("result", "-42");
        assert_eq!(
            request.url.as_str(),
            "http://example.com/ch1/ep1_v.php?result=-42"
        );
        assert!(!request.has_form());
    }
}
