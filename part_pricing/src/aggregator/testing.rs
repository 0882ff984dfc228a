//! In-memory aggregator for unit tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{AggregatorClient, PartQuery, QueryKey, QueryResult};
use crate::error::{PricingError, Result};

/// Parse results from JSON test fixtures
pub(crate) fn results(json: serde_json::Value) -> Vec<QueryResult> {
    serde_json::from_value(json).unwrap()
}

/// Answers each query from a table of canned items keyed by mpn or sku.
///
/// Every call is recorded so tests can assert what was sent.
#[derive(Default)]
pub(crate) struct StubClient {
    items: HashMap<String, serde_json::Value>,
    forbidden: bool,
    calls: Mutex<Vec<Vec<PartQuery>>>,
}

impl StubClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Answer queries for `key` with these items
    pub(crate) fn with_items(mut self, key: &str, items: serde_json::Value) -> Self {
        self.items.insert(key.to_string(), items);
        self
    }

    /// Reject every call as unauthorized
    pub(crate) fn forbidden(mut self) -> Self {
        self.forbidden = true;
        self
    }

    pub(crate) fn calls(&self) -> Vec<Vec<PartQuery>> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl AggregatorClient for StubClient {
    async fn query(&self, queries: &[PartQuery]) -> Result<Vec<QueryResult>> {
        self.calls.lock().unwrap().push(queries.to_vec());
        if self.forbidden {
            return Err(PricingError::Unauthorized(reqwest::StatusCode::FORBIDDEN));
        }

        let matched = queries
            .iter()
            .filter_map(|q| {
                let key = match &q.key {
                    QueryKey::Mpn(mpn) => mpn,
                    QueryKey::Sku(sku) => sku,
                };
                self.items.get(key).map(|items| {
                    serde_json::json!({"reference": q.reference, "items": items})
                })
            })
            .collect::<Vec<_>>();

        Ok(results(serde_json::Value::Array(matched)))
    }
}
