//! Batch loop: resolve SKUs, query in batches, reconcile offers

use crate::aggregator::AggregatorClient;
use crate::batcher::{select_queries, QueryBatcher, MAX_PARTS_PER_QUERY};
use crate::error::{PricingError, Result};
use crate::progress::ProgressReporter;
use crate::reconciler::reconcile;
use crate::resolver::resolve_all;
use futures::stream::{self, StreamExt};
use parts_common::{DistributorRegistry, PartRecord};

/// Tuning for a query run
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Queries per aggregator request
    pub batch_size: usize,
    /// Aggregator requests in flight at once
    pub workers: usize,
    /// Look up manufacturer part numbers for parts that only have SKUs
    pub resolve_skus: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            batch_size: MAX_PARTS_PER_QUERY,
            workers: 1,
            resolve_skus: true,
        }
    }
}

/// Counters of a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Parts that got a manufacturer part number from their SKUs
    pub resolved: usize,
    /// Parts sent to the aggregator
    pub queried: usize,
    /// Parts with neither manufacturer part number nor usable SKU
    pub skipped: usize,
    /// Aggregator requests made
    pub requests: usize,
}

/// Fill the parts with price, stock and packaging data from the aggregator.
///
/// Parts are only ever written from this task, in the order responses
/// arrive; each part belongs to exactly one batch. The first error stops the
/// run: batches not yet sent are dropped and parts already reconciled keep
/// their data.
pub async fn query_part_info<C, P, S>(
    client: &C,
    parts: &mut [PartRecord],
    registry: &DistributorRegistry,
    accepted: &[S],
    options: &QueryOptions,
    progress: &mut P,
) -> Result<RunSummary>
where
    C: AggregatorClient + ?Sized,
    P: ProgressReporter + ?Sized,
    S: AsRef<str>,
{
    log::info!("Getting part data from Octopart for {} parts...", parts.len());

    let known = registry.aggregator_known(accepted);
    log::debug!("Aggregator-known distributors: {:?}", known);

    let mut summary = RunSummary::default();

    if options.resolve_skus {
        summary.resolved = resolve_all(client, parts, &known, options.workers).await?;
    }

    let selections = select_queries(parts, &known);
    summary.queried = selections.iter().flatten().count();
    summary.skipped = selections.len() - summary.queried;

    progress.start(parts.len());

    let mut responses = stream::iter(QueryBatcher::new(selections, options.batch_size))
        .map(|batch| async move {
            if batch.queries.is_empty() {
                return Ok((batch, Vec::new()));
            }
            log::debug!("Querying batch of {} parts", batch.queries.len());
            let results = client.query(&batch.queries).await?;
            Ok::<_, PricingError>((batch, results))
        })
        .buffer_unordered(options.workers.max(1));

    while let Some(response) = responses.next().await {
        let (batch, results) = response?;
        if !batch.queries.is_empty() {
            summary.requests += 1;
        }
        reconcile(&results, parts, accepted, registry);
        progress.advance(batch.advanced);
    }

    progress.finish();

    log::info!(
        "Octopart query done: {} parts queried in {} requests, {} skipped",
        summary.queried,
        summary.requests,
        summary.skipped
    );

    Ok(summary)
}
