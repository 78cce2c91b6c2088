// src/ingest/medals.rs - Olympic medal tables (Tokyo 2020, Rio 2016, London 2012)

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::Deserialize;

use crate::models::core::{CountryKeyed, Dataset};

/// One country's medal tally. `total` is recomputed from the component
/// columns when the source file lacks it, as the Rio export does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedalRow {
    pub country: String,
    pub gold: i32,
    pub silver: i32,
    pub bronze: i32,
    pub total: i32,
}

impl CountryKeyed for MedalRow {
    fn country(&self) -> &str {
        &self.country
    }

    fn set_country(&mut self, name: String) {
        self.country = name;
    }
}

// Raw CSV shape. Header spellings differ between the three exports
// ("Gold Medal" in Tokyo, "Gold" in Rio/London); ranking columns are
// ignored entirely.
#[derive(Debug, Deserialize)]
struct MedalCsvRow {
    #[serde(rename = "Country")]
    country: String,
    #[serde(rename = "Gold", alias = "Gold Medal")]
    gold: i32,
    #[serde(rename = "Silver", alias = "Silver Medal")]
    silver: i32,
    #[serde(rename = "Bronze", alias = "Bronze Medal")]
    bronze: i32,
    #[serde(default, rename = "Total")]
    total: Option<i32>,
}

fn read_medals<R: Read>(reader: R, label: &str) -> Result<Dataset<MedalRow>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();

    for record in csv_reader.deserialize() {
        let raw: MedalCsvRow =
            record.with_context(|| format!("Malformed medal row for '{}'", label))?;
        let total = raw.total.unwrap_or(raw.gold + raw.silver + raw.bronze);
        rows.push(MedalRow {
            country: raw.country,
            gold: raw.gold,
            silver: raw.silver,
            bronze: raw.bronze,
            total,
        });
    }

    Ok(Dataset::new(label, rows))
}

/// Loads one medal table. `label` becomes the dataset label and, after
/// resolution, the storage table name.
pub fn load_medals(path: &Path, label: &str) -> Result<Dataset<MedalRow>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open medal table {}", path.display()))?;
    let dataset = read_medals(file, label)?;
    info!("Loaded {} medal rows into '{}'", dataset.len(), label);
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokyo_shape_with_rank_column_ignored() {
        let csv = "\
Country,Gold Medal,Silver Medal,Bronze Medal,Total,Rank By Total
United States of America,39,41,33,113,1
Japan,27,14,17,58,5
";
        let dataset = read_medals(csv.as_bytes(), "tokyo_olympic_2020").unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.rows()[0].total, 113);
        assert_eq!(dataset.rows()[1].country, "Japan");
    }

    #[test]
    fn test_missing_total_is_recomputed() {
        let csv = "\
Country,Gold,Silver,Bronze
Norway,4,2,2
";
        let dataset = read_medals(csv.as_bytes(), "rio_olympic_2016").unwrap();
        assert_eq!(dataset.rows()[0].total, 8);
    }
}
