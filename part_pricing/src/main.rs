//! Part Pricing - collect distributor offers for a component list
//!
//! Reads components from CSV, queries Octopart in batches and writes the
//! reconciled per-part records as JSON.

use clap::Parser;
use part_pricing::{
    query_part_info, read_components, write_report, ClientConfig, LogProgress, OctopartClient,
    PricingReport, QueryOptions, Result, MAX_PARTS_PER_QUERY,
};
use parts_common::DistributorRegistry;
use std::path::PathBuf;
use std::time::Duration;

/// Collect distributor pricing for electronic components from Octopart
#[derive(Parser, Debug)]
#[command(name = "part_pricing")]
#[command(version, about, long_about = None)]
struct Args {
    /// CSV component list; columns become part fields (manf#, digikey#, ...)
    #[arg(short, long)]
    input: PathBuf,

    /// JSON report path (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Octopart API key; without one the Kitspace proxy is used
    #[arg(long, env = "OCTOPART_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Distributors to populate, comma separated (default: all web distributors)
    #[arg(short, long, value_delimiter = ',')]
    distributors: Vec<String>,

    /// JSON file replacing the built-in distributor registry
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Aggregator requests in flight at once
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// Parts per aggregator request
    #[arg(long, default_value_t = MAX_PARTS_PER_QUERY)]
    batch_size: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Retries after a failed request
    #[arg(long, default_value_t = 3)]
    max_retries: u32,

    /// Do not look up manufacturer part numbers for SKU-only parts
    #[arg(long, default_value_t = false)]
    no_sku_lookup: bool,

    /// Override the Octopart API base URL
    #[arg(long)]
    api_base: Option<String>,

    /// Override the keyless proxy base URL
    #[arg(long)]
    proxy_base: Option<String>,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    tokio::select! {
        result = run(args) => {
            if let Err(e) = result {
                log::error!("{}", e);
                std::process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            log::warn!("Interrupted, remaining batches were not queried");
            std::process::exit(130);
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let registry = match &args.registry {
        Some(path) => DistributorRegistry::from_json_file(path)?,
        None => DistributorRegistry::default(),
    };

    let accepted: Vec<String> = if args.distributors.is_empty() {
        registry.web_ids().into_iter().map(str::to_string).collect()
    } else {
        args.distributors
            .iter()
            .map(|d| d.trim().to_lowercase())
            .filter(|d| {
                let known = registry.contains(d);
                if !known {
                    log::warn!("Unknown distributor '{}' ignored", d);
                }
                known
            })
            .collect()
    };
    log::info!("Distributors: {}", accepted.join(", "));

    let mut parts = read_components(&args.input)?;

    let defaults = ClientConfig::default();
    let client = OctopartClient::new(ClientConfig {
        api_key: args.api_key.filter(|k| !k.trim().is_empty()),
        api_base: args.api_base.unwrap_or(defaults.api_base),
        proxy_base: args.proxy_base.unwrap_or(defaults.proxy_base),
        timeout: Duration::from_secs(args.timeout_secs),
        max_retries: args.max_retries,
        retry_backoff: defaults.retry_backoff,
    })?;

    let options = QueryOptions {
        batch_size: args.batch_size,
        workers: args.jobs,
        resolve_skus: !args.no_sku_lookup,
    };

    let mut progress = LogProgress::new();
    let summary = query_part_info(
        &client,
        &mut parts,
        &registry,
        accepted.as_slice(),
        &options,
        &mut progress,
    )
    .await?;

    let obsolete = parts.iter().filter(|p| p.is_obsolete()).count();
    log::info!(
        "{} parts priced, {} resolved from SKUs, {} obsolete",
        summary.queried,
        summary.resolved,
        obsolete
    );

    let report = PricingReport::new(&accepted, &parts);
    match &args.output {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            write_report(std::io::BufWriter::new(file), &report)?;
            log::info!("Wrote report to {}", path.display());
        }
        None => write_report(std::io::stdout().lock(), &report)?,
    }

    Ok(())
}
