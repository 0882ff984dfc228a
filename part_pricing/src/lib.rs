//! Part Pricing - distributor offers for electronic components
//!
//! Queries a parts aggregator (Octopart) for every component of a list and
//! reconciles the offers of several distributors into one record per part:
//! merged price breaks, the best-matching SKU per distributor, stock,
//! lifecycle and datasheet.

pub mod aggregator;
pub mod batcher;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod progress;
pub mod reconciler;
pub mod resolver;

pub use aggregator::{AggregatorClient, ClientConfig, OctopartClient, PartQuery, QueryResult};
pub use batcher::{QueryBatch, QueryBatcher, MAX_PARTS_PER_QUERY};
pub use error::{Error, PricingError, Result};
pub use io::{read_components, write_report, PricingReport};
pub use pipeline::{query_part_info, QueryOptions, RunSummary};
pub use progress::{LogProgress, NoProgress, ProgressReporter};
pub use reconciler::{extract_price_list, reconcile, PriceError, PriceList};
pub use resolver::{resolve_all, resolve_sku};
