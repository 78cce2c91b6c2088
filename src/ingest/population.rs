// src/ingest/population.rs - The trusted population table, source of the
// reference registry

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::Deserialize;

use crate::matching::normalize::normalize_name;
use crate::models::core::{CountryKeyed, Dataset, ReferenceRegistry};

/// One country's population figures. Source values are in thousands; they
/// are scaled to absolute counts at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulationRow {
    pub country: String,
    pub pop_2020: i64,
    pub pop_2021: i64,
}

impl CountryKeyed for PopulationRow {
    fn country(&self) -> &str {
        &self.country
    }

    fn set_country(&mut self, name: String) {
        self.country = name;
    }
}

// Raw CSV shape; every column beyond these three is dropped.
#[derive(Debug, Deserialize)]
struct PopulationCsvRow {
    name: String,
    pop2021: f64,
    pop2020: f64,
}

fn read_population<R: Read>(reader: R, label: &str) -> Result<Dataset<PopulationRow>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();

    for record in csv_reader.deserialize() {
        let raw: PopulationCsvRow =
            record.with_context(|| format!("Malformed population row for '{}'", label))?;
        rows.push(PopulationRow {
            country: raw.name,
            pop_2020: (raw.pop2020 * 1000.0).round() as i64,
            pop_2021: (raw.pop2021 * 1000.0).round() as i64,
        });
    }

    Ok(Dataset::new(label, rows))
}

pub fn load_population(path: &Path, label: &str) -> Result<Dataset<PopulationRow>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open population table {}", path.display()))?;
    let dataset = read_population(file, label)?;
    info!("Loaded {} population rows into '{}'", dataset.len(), label);
    Ok(dataset)
}

/// Builds the canonical-name registry from the population dataset's
/// normalized name column. The registry is the single source of truth every
/// other dataset aligns to for the rest of the run.
pub fn build_registry(population: &Dataset<PopulationRow>) -> ReferenceRegistry {
    let registry = ReferenceRegistry::from_names(
        population
            .rows()
            .iter()
            .map(|row| normalize_name(&row.country)),
    );
    info!("Reference registry holds {} canonical names", registry.len());
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_scaled_to_absolute_counts() {
        let csv = "\
name,pop2021,pop2020,rank
China,1444216.107,1439323.776,1
Norway,5465.630,5421.241,119
";
        let dataset = read_population(csv.as_bytes(), "population").unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.rows()[0].pop_2021, 1_444_216_107);
        assert_eq!(dataset.rows()[1].pop_2020, 5_421_241);
    }

    #[test]
    fn test_registry_built_from_normalized_names() {
        let csv = "\
name,pop2021,pop2020
DR_Congo,92377.993,89561.403
Cote d'Ivoire,27053.629,26378.274
";
        let dataset = read_population(csv.as_bytes(), "population").unwrap();
        let registry = build_registry(&dataset);
        assert!(registry.contains("DR Congo"));
        assert!(registry.contains("Cote d'Ivoire"));
        assert_eq!(registry.len(), 2);
    }
}
