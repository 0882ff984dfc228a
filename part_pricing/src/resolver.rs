//! Resolving distributor SKUs to manufacturer part numbers

use crate::aggregator::{AggregatorClient, PartQuery};
use crate::error::{PricingError, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use parts_common::{PartRecord, MANF_FIELD};
use std::collections::BTreeMap;

/// Most frequent candidate; ties go to the one seen first
pub fn majority_vote<I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = String>,
{
    let mut counts: Vec<(String, usize)> = Vec::new();
    for candidate in candidates {
        match counts.iter_mut().find(|(seen, _)| *seen == candidate) {
            Some((_, count)) => *count += 1,
            None => counts.push((candidate, 1)),
        }
    }

    counts
        .into_iter()
        .fold(None, |best: Option<(String, usize)>, (mpn, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((mpn, count)),
        })
        .map(|(mpn, _)| mpn)
}

/// Find the manufacturer part number behind a distributor SKU
pub async fn resolve_sku<C>(client: &C, sku: &str) -> Result<Option<String>>
where
    C: AggregatorClient + ?Sized,
{
    let results = client.query(&[PartQuery::sku(1, sku)]).await?;
    let Some(result) = results.into_iter().next() else {
        log::debug!("No match for SKU {}", sku);
        return Ok(None);
    };

    let mpns = result
        .items
        .into_iter()
        .filter_map(|item| item.mpn)
        .filter(|mpn| !mpn.trim().is_empty());

    let mpn = majority_vote(mpns);
    log::debug!("SKU {} resolved to {:?}", sku, mpn);
    Ok(mpn)
}

/// Non-empty SKUs of a part among `candidates`, first occurrence kept
fn unique_skus(part: &PartRecord, candidates: &[&str]) -> Vec<String> {
    let mut skus: Vec<String> = Vec::new();
    for sku in candidates.iter().filter_map(|dist| part.sku(dist)) {
        if !skus.iter().any(|s| s == sku) {
            skus.push(sku.to_string());
        }
    }
    skus
}

/// Assign a manufacturer part number to every part that only has SKUs.
///
/// Each distinct SKU of such a part is looked up, at most `workers` lookups
/// in flight, and the majority answer is written to `manf#`. Parts whose
/// SKUs all fail to resolve are left as they are. Returns the number of parts
/// that got a manufacturer part number.
pub async fn resolve_all<C>(
    client: &C,
    parts: &mut [PartRecord],
    candidates: &[&str],
    workers: usize,
) -> Result<usize>
where
    C: AggregatorClient + ?Sized,
{
    let lookups: Vec<(usize, String)> = parts
        .iter()
        .enumerate()
        .filter(|(_, part)| part.manf_num().is_none())
        .flat_map(|(i, part)| {
            unique_skus(part, candidates)
                .into_iter()
                .map(move |sku| (i, sku))
        })
        .collect();

    if lookups.is_empty() {
        return Ok(0);
    }

    log::info!("Resolving {} distributor SKUs to manufacturer part numbers...", lookups.len());

    // `buffered` keeps submission order, so votes are tallied in SKU order
    let answers: Vec<(usize, Option<String>)> = stream::iter(lookups)
        .map(|(i, sku)| async move {
            let mpn = resolve_sku(client, &sku).await?;
            Ok::<_, PricingError>((i, mpn))
        })
        .buffered(workers.max(1))
        .try_collect()
        .await?;

    let mut votes: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    for (i, mpn) in answers {
        if let Some(mpn) = mpn {
            votes.entry(i).or_default().push(mpn);
        }
    }

    let mut assigned = 0;
    for (i, mpns) in votes {
        if let Some(mpn) = majority_vote(mpns) {
            log::debug!("Assigned manf# {} to '{}'", mpn, parts[i].refs());
            parts[i].fields.insert(MANF_FIELD.to_string(), mpn);
            assigned += 1;
        }
    }

    log::info!("Resolved manufacturer part numbers for {} parts", assigned);
    Ok(assigned)
}
