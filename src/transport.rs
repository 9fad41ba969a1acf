//! HTTP surface the flow controller talks to. The trait keeps the controller
//! independent of any concrete client; `HttpTransport` is the reqwest-backed
//! implementation hosts use in production.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{FlowError, FlowResult};
use crate::wire::Placement;

/// A raw response: status plus body text. The controller owns interpretation,
/// including error-body parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The three calls one offer flow needs.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// `GET /v1/places/{integration_id}/flows/new` with placement and the
    /// pass-through params as query parameters.
    async fn create_flow(
        &self,
        integration_id: &str,
        placement: Placement,
        params: &BTreeMap<String, String>,
    ) -> FlowResult<Reply>;

    /// `GET` against a next-offer URL from a response's links.
    async fn next_offer(
        &self,
        url: &str,
        placement: Placement,
        params: &BTreeMap<String, String>,
    ) -> FlowResult<Reply>;

    /// Best-effort view beacon; the caller only logs the outcome.
    async fn offer_event(&self, url: &str) -> FlowResult<Reply>;
}

/// reqwest-backed transport. Relative link URLs resolve against `base_url`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// `timeout` of `None` keeps the client's own default.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> FlowResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| FlowError::Transport(err.to_string()))?;

        Ok(HttpTransport {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}/{}", self.base_url, url.trim_start_matches('/'))
        }
    }

    async fn get(&self, url: String, query: &[(String, String)]) -> FlowResult<Reply> {
        tracing::debug!(%url, "offer flow request");
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|err| FlowError::Transport(err.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| FlowError::Transport(err.to_string()))?;

        Ok(Reply { status, body })
    }
}

fn query_with_params(
    placement: Placement,
    params: &BTreeMap<String, String>,
) -> Vec<(String, String)> {
    let mut query = vec![("placement".to_string(), placement.as_str().to_string())];
    query.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
    query
}

#[async_trait]
impl Transport for HttpTransport {
    async fn create_flow(
        &self,
        integration_id: &str,
        placement: Placement,
        params: &BTreeMap<String, String>,
    ) -> FlowResult<Reply> {
        let url = format!("{}/v1/places/{integration_id}/flows/new", self.base_url);
        self.get(url, &query_with_params(placement, params)).await
    }

    async fn next_offer(
        &self,
        url: &str,
        placement: Placement,
        params: &BTreeMap<String, String>,
    ) -> FlowResult<Reply> {
        self.get(self.resolve(url), &query_with_params(placement, params))
            .await
    }

    async fn offer_event(&self, url: &str) -> FlowResult<Reply> {
        self.get(
            self.resolve(url),
            &[("ev".to_string(), "offer_viewed".to_string())],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_and_absolute_urls() {
        let transport = HttpTransport::new("https://api.example.com/", None).unwrap();
        assert_eq!(
            transport.resolve("/o/1"),
            "https://api.example.com/o/1".to_string()
        );
        assert_eq!(
            transport.resolve("https://other.example.com/o/2"),
            "https://other.example.com/o/2".to_string()
        );
    }

    #[test]
    fn test_query_includes_placement_and_params() {
        let mut params = BTreeMap::new();
        params.insert("first_name".to_string(), "John".to_string());
        let query = query_with_params(Placement::OrderConfirmation, &params);
        assert_eq!(
            query,
            vec![
                ("placement".to_string(), "order_confirmation".to_string()),
                ("first_name".to_string(), "John".to_string()),
            ]
        );
    }
}
