//! Distributor registry
//!
//! Built once at startup and passed by reference to batching and
//! reconciliation. Nothing here is mutated after construction.

use crate::error::{RegistryError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// How a distributor's data is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributorKind {
    /// Online distributor, may be reported by the aggregator
    #[default]
    Web,
    /// Local stock, never queried remotely
    Local,
}

/// One distributor known to the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributorEntry {
    /// Internal id, also the prefix of SKU fields (`digikey` -> `digikey#`)
    pub id: String,
    #[serde(default)]
    pub kind: DistributorKind,
    /// Seller display name reported by the aggregator
    #[serde(default)]
    pub seller_name: Option<String>,
}

impl DistributorEntry {
    pub fn web(id: &str, seller_name: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: DistributorKind::Web,
            seller_name: Some(seller_name.to_string()),
        }
    }

    /// Whether the aggregator can report offers for this distributor
    pub fn is_aggregator_known(&self) -> bool {
        self.kind == DistributorKind::Web && self.seller_name.is_some()
    }
}

/// Immutable set of distributors with seller-name translation
#[derive(Debug, Clone)]
pub struct DistributorRegistry {
    entries: Vec<DistributorEntry>,
    by_seller: HashMap<String, usize>,
}

impl DistributorRegistry {
    /// Build a registry, rejecting empty or duplicate ids and seller names
    pub fn new(entries: Vec<DistributorEntry>) -> Result<Self> {
        let mut by_seller: HashMap<String, usize> = HashMap::new();

        for (i, entry) in entries.iter().enumerate() {
            if entry.id.trim().is_empty() {
                return Err(RegistryError::EmptyId);
            }
            if entries[..i].iter().any(|e| e.id == entry.id) {
                return Err(RegistryError::DuplicateId(entry.id.clone()));
            }
            if let Some(seller) = &entry.seller_name {
                if let Some(&first) = by_seller.get(seller) {
                    return Err(RegistryError::DuplicateSeller {
                        seller: seller.clone(),
                        first: entries[first].id.clone(),
                        second: entry.id.clone(),
                    });
                }
                by_seller.insert(seller.clone(), i);
            }
        }

        Ok(Self { entries, by_seller })
    }

    /// Parse a JSON array of entries
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: Vec<DistributorEntry> = serde_json::from_str(json)?;
        Self::new(entries)
    }

    /// Load a JSON array of entries from disk
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading distributor registry from: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let registry = Self::from_json_str(&content)?;
        log::info!("Loaded {} distributors", registry.len());
        Ok(registry)
    }

    pub fn get(&self, id: &str) -> Option<&DistributorEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Iterate over entries in registry order
    pub fn iter(&self) -> impl Iterator<Item = &DistributorEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Translate an aggregator seller name into a distributor id
    pub fn translate(&self, seller_name: &str) -> Option<&str> {
        self.by_seller
            .get(seller_name)
            .map(|&i| self.entries[i].id.as_str())
    }

    /// Ids of all web distributors, in registry order
    pub fn web_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.kind == DistributorKind::Web)
            .map(|e| e.id.as_str())
            .collect()
    }

    /// The accepted distributors the aggregator can report, in accepted order
    pub fn aggregator_known<'a, S: AsRef<str>>(&self, accepted: &'a [S]) -> Vec<&'a str> {
        accepted
            .iter()
            .map(|id| id.as_ref())
            .filter(|id| self.get(id).is_some_and(|e| e.is_aggregator_known()))
            .collect()
    }
}

impl Default for DistributorRegistry {
    /// The distributors reported by Octopart
    fn default() -> Self {
        let entries = vec![
            DistributorEntry::web("arrow", "Arrow Electronics, Inc."),
            DistributorEntry::web("digikey", "Digi-Key"),
            DistributorEntry::web("farnell", "Farnell"),
            DistributorEntry::web("mouser", "Mouser"),
            DistributorEntry::web("newark", "Newark"),
            DistributorEntry::web("rs", "RS Components"),
            DistributorEntry::web("tme", "TME"),
        ];
        let by_seller = entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.seller_name.clone().map(|s| (s, i)))
            .collect();
        Self { entries, by_seller }
    }
}
