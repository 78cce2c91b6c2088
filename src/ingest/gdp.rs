// src/ingest/gdp.rs - IMF GDP series, 2012-2021

use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use log::{debug, info};

use crate::ingest::NON_COUNTRY_AGGREGATES;
use crate::models::core::{CountryKeyed, Dataset};

/// Year columns carried through to storage, in order.
pub const GDP_YEARS: [&str; 10] = [
    "2012", "2013", "2014", "2015", "2016", "2017", "2018", "2019", "2020", "2021",
];

// The source export puts the dataset title in the country-column header.
const COUNTRY_HEADER: &str = "GDP, current prices (Billions of U.S. dollars)";

/// One country's GDP series in billions of U.S. dollars, aligned with
/// [`GDP_YEARS`]. "no data" cells become 0, as in the source cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct GdpRow {
    pub country: String,
    pub values: [f64; 10],
}

impl CountryKeyed for GdpRow {
    fn country(&self) -> &str {
        &self.country
    }

    fn set_country(&mut self, name: String) {
        self.country = name;
    }
}

fn parse_gdp_cell(cell: &str) -> f64 {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("no data") {
        return 0.0;
    }
    trimmed.replace(',', "").parse().unwrap_or(0.0)
}

// Region aggregates and trailing attribution lines mixed into the export.
// The attribution line starts with a copyright sign, which the lossy
// Latin-1 conversion turns into a replacement character.
fn is_non_country_entry(name: &str) -> bool {
    name.contains("(Region)")
        || name.starts_with('©')
        || name.starts_with('\u{FFFD}')
        || NON_COUNTRY_AGGREGATES.contains(&name)
}

/// Reads the GDP export. The file is Latin-1 encoded, so cells go through a
/// lossy UTF-8 conversion instead of the serde path the other loaders use.
fn read_gdp<R: Read>(reader: R, label: &str) -> Result<Dataset<GdpRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .byte_headers()
        .context("GDP file has no header row")?
        .iter()
        .map(|cell| String::from_utf8_lossy(cell).trim().to_string())
        .collect();

    let country_col = headers
        .iter()
        .position(|h| h == COUNTRY_HEADER)
        .unwrap_or(0);
    let year_cols: Vec<usize> = GDP_YEARS
        .iter()
        .map(|year| {
            headers
                .iter()
                .position(|h| h == year)
                .ok_or_else(|| anyhow!("GDP file is missing year column '{}'", year))
        })
        .collect::<Result<_>>()?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for record in csv_reader.byte_records() {
        let record = record.with_context(|| format!("Malformed GDP row for '{}'", label))?;
        let country = record
            .get(country_col)
            .map(|cell| String::from_utf8_lossy(cell).trim().to_string())
            .unwrap_or_default();

        if country.is_empty() || is_non_country_entry(&country) {
            skipped += 1;
            continue;
        }

        let mut values = [0.0f64; 10];
        for (slot, col) in values.iter_mut().zip(&year_cols) {
            *slot = record
                .get(*col)
                .map(|cell| parse_gdp_cell(&String::from_utf8_lossy(cell)))
                .unwrap_or(0.0);
        }
        rows.push(GdpRow { country, values });
    }

    debug!("Skipped {} non-country GDP entries", skipped);
    Ok(Dataset::new(label, rows))
}

pub fn load_gdp(path: &Path, label: &str) -> Result<Dataset<GdpRow>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open GDP table {}", path.display()))?;
    let dataset = read_gdp(file, label)?;
    info!("Loaded {} GDP rows into '{}'", dataset.len(), label);
    Ok(dataset)
}
