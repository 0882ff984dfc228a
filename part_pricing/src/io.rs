//! Component list input and pricing report output

use crate::error::Result;
use chrono::{DateTime, Utc};
use parts_common::PartRecord;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;

/// Read a component list; every column becomes a part field.
///
/// Rows map 1:1 to records so the row index is the part reference. Blank
/// cells are left out of the fields.
pub fn read_components(path: impl AsRef<Path>) -> Result<Vec<PartRecord>> {
    let path = path.as_ref();
    log::info!("Reading components from: {}", path.display());
    let file = std::fs::File::open(path)?;
    read_components_from(file)
}

/// Read a component list from any CSV source
pub fn read_components_from<R: Read>(reader: R) -> Result<Vec<PartRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut parts = Vec::new();

    for record in rdr.records() {
        let record = record?;
        let fields: BTreeMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .filter(|(name, value)| !name.is_empty() && !value.is_empty())
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        parts.push(PartRecord::new(fields));
    }

    log::info!("Read {} components", parts.len());
    Ok(parts)
}

/// Reconciled records of one run
#[derive(Debug, Serialize)]
pub struct PricingReport<'a> {
    pub generated_at: DateTime<Utc>,
    /// Distributors that were populated
    pub distributors: &'a [String],
    pub parts: &'a [PartRecord],
}

impl<'a> PricingReport<'a> {
    pub fn new(distributors: &'a [String], parts: &'a [PartRecord]) -> Self {
        Self {
            generated_at: Utc::now(),
            distributors,
            parts,
        }
    }
}

/// Write the report as pretty JSON
pub fn write_report<W: Write>(mut writer: W, report: &PricingReport<'_>) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
