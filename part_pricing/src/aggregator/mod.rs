//! Parts aggregator API: query/response types and the client seam
//!
//! The aggregator matches a list of part queries (by manufacturer part number
//! or by distributor SKU) and answers with the matched items and every
//! distributor offer it knows for them.

mod octopart;

#[cfg(test)]
pub(crate) mod testing;

pub use octopart::{ClientConfig, OctopartClient, KITSPACE_PROXY_BASE, OCTOPART_API_BASE};

use crate::error::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Identifier a part is matched by
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKey {
    Mpn(String),
    Sku(String),
}

/// One entry of a match request.
///
/// Serializes as `{"reference": 3, "mpn": "..."}` or `{"reference": 3, "sku": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartQuery {
    pub reference: usize,
    #[serde(flatten)]
    pub key: QueryKey,
}

impl PartQuery {
    pub fn mpn(reference: usize, mpn: &str) -> Self {
        Self {
            reference,
            key: QueryKey::Mpn(mpn.to_string()),
        }
    }

    pub fn sku(reference: usize, sku: &str) -> Self {
        Self {
            reference,
            key: QueryKey::Sku(sku.to_string()),
        }
    }
}

/// Matches for one query, correlated by `reference`
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResult {
    #[serde(deserialize_with = "deserialize_reference")]
    pub reference: usize,
    #[serde(default, deserialize_with = "deserialize_lenient_vec")]
    pub items: Vec<PartItem>,
}

/// A matched part
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartItem {
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub mpn: Option<String>,
    /// Technical specs keyed by name; only `lifecycle_status` is used
    #[serde(default)]
    pub specs: Value,
    #[serde(default, deserialize_with = "deserialize_lenient_vec")]
    pub datasheets: Vec<Datasheet>,
    #[serde(default, deserialize_with = "deserialize_lenient_vec")]
    pub offers: Vec<Offer>,
}

impl PartItem {
    /// Lifecycle status reported in the specs, e.g. `Obsolete`
    pub fn lifecycle_status(&self) -> Option<&str> {
        match self.specs.get("lifecycle_status")? {
            Value::String(status) => Some(status.as_str()),
            Value::Object(spec) => match spec.get("value")? {
                Value::Array(values) => values.first().and_then(Value::as_str),
                Value::String(status) => Some(status.as_str()),
                _ => None,
            },
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Datasheet {
    #[serde(default)]
    pub url: Option<String>,
}

/// One seller's terms for a matched part
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Offer {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub seller: Seller,
    /// Currency code to `[quantity, price]` pairs, kept raw so a malformed
    /// price map only spoils this offer
    #[serde(default)]
    pub prices: Value,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub sku: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub product_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_i64")]
    pub in_stock_quantity: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Seller {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub name: String,
}

/// Sends match queries to a parts aggregator
#[async_trait]
pub trait AggregatorClient: Send + Sync {
    /// Match a batch of queries.
    ///
    /// Results may come back in any order; callers correlate by `reference`.
    async fn query(&self, queries: &[PartQuery]) -> Result<Vec<QueryResult>>;
}

/// References are echoed back either as numbers or as strings
fn deserialize_reference<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Reference {
        Number(usize),
        Text(String),
    }

    match Reference::deserialize(deserializer)? {
        Reference::Number(n) => Ok(n),
        Reference::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid reference: {s}"))),
    }
}

/// Stock counts are sometimes strings or null; anything unusable is `None`
fn deserialize_lenient_i64<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Text fields; numbers are kept as their decimal text, anything else is `None`
fn deserialize_lenient_string<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn deserialize_null_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Lists whose entries fail to parse lose only those entries; a list that is
/// not an array at all is empty
pub(crate) fn deserialize_lenient_vec<'de, D, T>(
    deserializer: D,
) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(entries) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };

    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value(entry) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                log::warn!(
                    "Skipping malformed {}: {}",
                    std::any::type_name::<T>().rsplit("::").next().unwrap_or("entry"),
                    e
                );
                None
            }
        })
        .collect())
}
