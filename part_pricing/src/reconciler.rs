//! Folding aggregator offers into part records
//!
//! Offers from the same distributor are merged into one price-break table.
//! When a distributor lists a part several times (cut tape, reel, ...), the
//! SKU, product page and stock of the offer with the smallest step between
//! its two lowest price breaks are kept.

use crate::aggregator::{Offer, PartItem, QueryResult};
use parts_common::{
    DistributorOffer, DistributorRegistry, PartRecord, PriceTiers, QtyIncrement,
    LIFECYCLE_OBSOLETE,
};
use serde_json::Value;
use thiserror::Error;

/// Price breaks of one offer in its first listed currency
#[derive(Debug, Clone, PartialEq)]
pub struct PriceList {
    pub currency: String,
    pub tiers: PriceTiers,
}

/// Why an offer's price map could not be used
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("offer has no price map")]
    Missing,
    #[error("price list for {currency} is malformed")]
    Malformed { currency: String },
}

impl PriceError {
    /// Currency named by the price map, even when its entries are unusable
    pub fn currency(&self) -> Option<&str> {
        match self {
            PriceError::Missing => None,
            PriceError::Malformed { currency } => Some(currency),
        }
    }
}

/// Extract the first currency's `[quantity, price]` pairs from a price map.
///
/// An empty pair list is valid and yields no tiers. Any unusable pair spoils
/// the whole list.
pub fn extract_price_list(prices: &Value) -> Result<PriceList, PriceError> {
    let (currency, entries) = prices
        .as_object()
        .and_then(|map| map.iter().next())
        .ok_or(PriceError::Missing)?;

    let malformed = || PriceError::Malformed {
        currency: currency.clone(),
    };

    let tiers = entries
        .as_array()
        .ok_or_else(malformed)?
        .iter()
        .map(|entry| parse_price_break(entry).ok_or_else(malformed))
        .collect::<Result<PriceTiers, PriceError>>()?;

    Ok(PriceList {
        currency: currency.clone(),
        tiers,
    })
}

fn parse_price_break(entry: &Value) -> Option<(u32, f64)> {
    let pair = entry.as_array()?;
    let [qty, price] = pair.as_slice() else {
        return None;
    };

    let qty = match qty {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    let price = match price {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };

    let qty = u32::try_from(qty).ok().filter(|q| *q > 0)?;
    (price.is_finite() && price >= 0.0).then_some((qty, price))
}

/// Fold a batch of aggregator results into the records they reference.
///
/// Offers from sellers the registry cannot translate, or from distributors
/// outside `accepted`, are ignored.
pub fn reconcile<S: AsRef<str>>(
    results: &[QueryResult],
    parts: &mut [PartRecord],
    accepted: &[S],
    registry: &DistributorRegistry,
) {
    for result in results {
        let Some(part) = parts.get_mut(result.reference) else {
            log::warn!(
                "Ignoring result for unknown reference {} ({} parts)",
                result.reference,
                parts.len()
            );
            continue;
        };

        for item in &result.items {
            apply_item(item, part, accepted, registry);
        }
    }
}

fn apply_item<S: AsRef<str>>(
    item: &PartItem,
    part: &mut PartRecord,
    accepted: &[S],
    registry: &DistributorRegistry,
) {
    if let Some(status) = item.lifecycle_status() {
        if part.lifecycle.is_none() && status.to_lowercase() == LIFECYCLE_OBSOLETE {
            part.lifecycle = Some(LIFECYCLE_OBSOLETE.to_string());
        }
    }

    if part.datasheet.is_none() {
        if let Some(url) = item.datasheets.iter().find_map(|d| d.url.clone()) {
            part.datasheet = Some(url);
        }
    }

    for offer in &item.offers {
        let Some(dist) = registry.translate(&offer.seller.name) else {
            continue;
        };
        if !accepted.iter().any(|a| a.as_ref() == dist) {
            continue;
        }
        apply_offer(offer, part.distributor_mut(dist));
    }
}

/// Merge one offer into a distributor's entry.
///
/// Price breaks are always merged. The offer's SKU, URL and stock are adopted
/// when nothing was chosen yet or when its increment is strictly smaller than
/// the chosen one. The currency follows the last offer with a price map,
/// whichever offer was adopted.
pub fn apply_offer(offer: &Offer, entry: &mut DistributorOffer) {
    let (currency, tiers) = match extract_price_list(&offer.prices) {
        Ok(list) => (Some(list.currency), list.tiers),
        Err(e) => {
            log::debug!(
                "Unusable prices from {} for {:?}: {}",
                offer.seller.name,
                offer.sku,
                e
            );
            (e.currency().map(str::to_string), PriceTiers::new())
        }
    };

    if let Some(currency) = currency {
        entry.currency = Some(currency);
    }

    let increment = QtyIncrement::from_tiers(&tiers);
    entry.price_tiers.extend(tiers);

    let adopt = match entry.qty_increment {
        None => true,
        Some(chosen) => increment < chosen,
    };
    if adopt {
        entry.part_num = offer.sku.clone();
        entry.url = offer.product_url.clone();
        entry.qty_avail = offer.in_stock_quantity;
        entry.qty_increment = Some(increment);
    }

    entry.info.clear();
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
