//! Octopart part-match client
//!
//! Uses the official API when a key is configured, otherwise the Kitspace
//! proxy which needs no key. Transport failures are retried with exponential
//! backoff; authorization failures are returned immediately.

use super::{deserialize_lenient_vec, AggregatorClient, PartQuery, QueryResult};
use crate::error::{PricingError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

/// Official Octopart API
pub const OCTOPART_API_BASE: &str = "http://octopart.com/api/v3";
/// Keyless proxy in front of Octopart
pub const KITSPACE_PROXY_BASE: &str = "https://temp-octopart-proxy.kitspace.org";

const USER_AGENT: &str = concat!("part_pricing/", env!("CARGO_PKG_VERSION"));

/// Connection settings for [`OctopartClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Octopart API key; `None` selects the proxy
    pub api_key: Option<String>,
    pub api_base: String,
    pub proxy_base: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Extra attempts after the first failed one
    pub max_retries: u32,
    /// Delay before the first retry, doubled on each further retry
    pub retry_backoff: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: OCTOPART_API_BASE.to_string(),
            proxy_base: KITSPACE_PROXY_BASE.to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_backoff: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MatchResponse {
    #[serde(default, deserialize_with = "deserialize_lenient_vec")]
    results: Vec<QueryResult>,
}

/// Octopart `parts/match` client
pub struct OctopartClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl OctopartClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        if config.api_key.is_some() {
            log::info!("Creating Octopart client for {}", config.api_base);
        } else {
            log::info!(
                "No Octopart API key given, using proxy at {}",
                config.proxy_base
            );
        }

        Ok(Self { client, config })
    }

    /// URL of the match endpoint in use
    pub fn endpoint(&self) -> String {
        let base = match self.config.api_key {
            Some(_) => &self.config.api_base,
            None => &self.config.proxy_base,
        };
        format!("{}/parts/match", base.trim_end_matches('/'))
    }

    /// Send one request without retrying
    async fn send_once(&self, queries_json: &str) -> Result<Vec<QueryResult>> {
        let url = self.endpoint();

        let mut params: Vec<(&str, &str)> = vec![("queries", queries_json)];
        if let Some(key) = &self.config.api_key {
            params.push(("apikey", key.as_str()));
        }
        params.push(("include[]", "specs"));
        params.push(("include[]", "datasheets"));

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        log::debug!("Octopart response status: {}", status);

        match status {
            s if s.is_success() => {
                let body = response.text().await.map_err(|e| self.transport_error(e))?;
                let parsed: MatchResponse = serde_json::from_str(&body)?;
                Ok(parsed.results)
            }
            StatusCode::NOT_FOUND => Err(PricingError::NotFound(url)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(PricingError::Unauthorized(status))
            }
            _ => Err(PricingError::HttpStatus(status)),
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> PricingError {
        if err.is_timeout() {
            PricingError::Timeout(self.config.timeout)
        } else {
            PricingError::Network(err)
        }
    }
}

#[async_trait]
impl AggregatorClient for OctopartClient {
    async fn query(&self, queries: &[PartQuery]) -> Result<Vec<QueryResult>> {
        let queries_json = serde_json::to_string(queries)?;
        let mut backoff = self.config.retry_backoff;
        let mut attempt = 0;

        loop {
            match self.send_once(&queries_json).await {
                Ok(results) => {
                    log::debug!(
                        "Octopart matched {} of {} queries",
                        results.len(),
                        queries.len()
                    );
                    return Ok(results);
                }
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    log::warn!(
                        "Octopart query failed ({}), retry {}/{} in {:?}",
                        e,
                        attempt,
                        self.config.max_retries,
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
#[path = "octopart_tests.rs"]
mod tests;
