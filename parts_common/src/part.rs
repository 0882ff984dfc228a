//! Per-component pricing records

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field holding the manufacturer part number
pub const MANF_FIELD: &str = "manf#";
/// Field holding the generic sub-quantity of a part
pub const MANF_QTY_FIELD: &str = "manf#_qty";
/// Field holding the schematic references of a part
pub const REFS_FIELD: &str = "refs";
/// The only lifecycle status that is recorded
pub const LIFECYCLE_OBSOLETE: &str = "obsolete";

/// Field key holding a distributor's SKU, e.g. `digikey#`
pub fn sku_field(dist: &str) -> String {
    format!("{dist}#")
}

/// Field key holding a distributor-specific sub-quantity, e.g. `digikey#_qty`
pub fn sku_qty_field(dist: &str) -> String {
    format!("{dist}#_qty")
}

/// Break quantity to unit price
pub type PriceTiers = BTreeMap<u32, f64>;

/// Step between the two lowest price breaks of an offer.
///
/// Used to tell cut-tape offers (small steps) from reel offers (large steps).
/// `Unbounded` sorts after every finite step, so an offer with fewer than two
/// breaks never wins against one that has a real step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QtyIncrement {
    Finite(u32),
    Unbounded,
}

impl QtyIncrement {
    /// Compute the increment of a single offer's own price list
    pub fn from_tiers(tiers: &PriceTiers) -> Self {
        let mut breaks = tiers.keys();
        match (breaks.next(), breaks.next()) {
            (Some(lowest), Some(next)) => QtyIncrement::Finite(next - lowest),
            _ => QtyIncrement::Unbounded,
        }
    }

    pub fn is_finite(&self) -> bool {
        matches!(self, QtyIncrement::Finite(_))
    }
}

/// Offer data collected for one distributor of one part
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistributorOffer {
    /// Price breaks merged across every offer of this distributor
    pub price_tiers: PriceTiers,
    /// SKU of the chosen offer
    pub part_num: Option<String>,
    /// Product page of the chosen offer
    pub url: Option<String>,
    /// Stock of the chosen offer
    pub qty_avail: Option<i64>,
    /// Increment of the chosen offer; `None` until an offer has been adopted
    pub qty_increment: Option<QtyIncrement>,
    /// Currency of the last offer that carried a price map
    pub currency: Option<String>,
    /// Extra distributor information, currently always empty
    #[serde(default)]
    pub info: BTreeMap<String, String>,
}

impl DistributorOffer {
    /// Whether an offer has already been adopted for this distributor
    pub fn is_chosen(&self) -> bool {
        self.qty_increment.is_some()
    }
}

/// Accumulator of distributor offers for one input component.
///
/// Records are indexed by their position in the input, which is also the
/// `reference` sent to the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartRecord {
    /// Raw input attributes (`manf#`, `digikey#`, `refs`, ...)
    pub fields: BTreeMap<String, String>,
    /// Set to `obsolete` when the aggregator reports it
    pub lifecycle: Option<String>,
    /// First datasheet link seen for the part
    pub datasheet: Option<String>,
    /// Offer data keyed by distributor id
    #[serde(default)]
    pub distributors: BTreeMap<String, DistributorOffer>,
}

impl PartRecord {
    pub fn new(fields: BTreeMap<String, String>) -> Self {
        Self {
            fields,
            ..Default::default()
        }
    }

    /// Look up a field, treating blank values as absent
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Manufacturer part number, if known
    pub fn manf_num(&self) -> Option<&str> {
        self.field(MANF_FIELD)
    }

    /// SKU of the given distributor, if present
    pub fn sku(&self, dist: &str) -> Option<&str> {
        self.field(&sku_field(dist))
    }

    /// Schematic references for log messages
    pub fn refs(&self) -> &str {
        self.field(REFS_FIELD).unwrap_or("")
    }

    pub fn is_obsolete(&self) -> bool {
        self.lifecycle.as_deref() == Some(LIFECYCLE_OBSOLETE)
    }

    /// Offer data for a distributor, if any offer from it was seen
    pub fn distributor(&self, dist: &str) -> Option<&DistributorOffer> {
        self.distributors.get(dist)
    }

    /// Offer data for a distributor, created empty on first access
    pub fn distributor_mut(&mut self, dist: &str) -> &mut DistributorOffer {
        self.distributors.entry(dist.to_string()).or_default()
    }
}
