//! CSV loading and per-source cleaning for the six input tables, plus the
//! curated override file. Everything here happens before resolution; the
//! resolved datasets go straight to storage.

pub mod covid;
pub mod gdp;
pub mod medals;
pub mod population;

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::models::core::Dataset;

pub use covid::{load_covid, CovidRow};
pub use gdp::{load_gdp, GdpRow, GDP_YEARS};
pub use medals::{load_medals, MedalRow};
pub use population::{build_registry, load_population, PopulationRow};

/// Aggregate pseudo-countries shipped inside some sources (continents,
/// income bands). They have no counterpart in the reference registry and
/// are dropped at load time.
pub const NON_COUNTRY_AGGREGATES: [&str; 13] = [
    "Africa",
    "Asia",
    "Europe",
    "European Union",
    "High income",
    "International",
    "Low income",
    "Lower middle income",
    "North America",
    "Oceania",
    "South America",
    "Upper middle income",
    "World",
];

// Dataset labels double as storage table names.
pub const TOKYO_TABLE: &str = "tokyo_olympic_2020";
pub const RIO_TABLE: &str = "rio_olympic_2016";
pub const LONDON_TABLE: &str = "london_olympic_2012";
pub const POPULATION_TABLE: &str = "population";
pub const COVID_TABLE: &str = "covid_and_vac";
pub const GDP_TABLE: &str = "gdp_value";

/// File the curated overrides live in, relative to the data directory.
pub const OVERRIDES_FILE: &str = "overrides.json";

/// All six source tables, loaded and cleaned but not yet reconciled.
#[derive(Debug)]
pub struct SourceTables {
    pub tokyo: Dataset<MedalRow>,
    pub rio: Dataset<MedalRow>,
    pub london: Dataset<MedalRow>,
    pub population: Dataset<PopulationRow>,
    pub covid: Dataset<CovidRow>,
    pub gdp: Dataset<GdpRow>,
}

/// Loads every source table from `data_dir` using the original export
/// filenames.
pub fn load_all(data_dir: &Path) -> Result<SourceTables> {
    let tables = SourceTables {
        tokyo: load_medals(&data_dir.join("Tokyo_Medals_2020.csv"), TOKYO_TABLE)?,
        rio: load_medals(&data_dir.join("Rio_Medals_2016.csv"), RIO_TABLE)?,
        london: load_medals(&data_dir.join("London_Medals_2012.csv"), LONDON_TABLE)?,
        population: load_population(&data_dir.join("Population_2020-21.csv"), POPULATION_TABLE)?,
        covid: load_covid(&data_dir.join("Covid_Vaccination_Data.csv"), COVID_TABLE)?,
        gdp: load_gdp(&data_dir.join("GDP_Actual_Value.csv"), GDP_TABLE)?,
    };
    info!("All source tables loaded from {}", data_dir.display());
    Ok(tables)
}

/// Loads the curated override file: a JSON object mapping dataset labels to
/// `[row_index, corrected_name]` pairs. A missing file is an empty ledger,
/// not an error; overrides are optional curated input.
pub fn load_overrides(data_dir: &Path) -> Result<HashMap<String, Vec<(usize, String)>>> {
    let path = data_dir.join(OVERRIDES_FILE);
    if !path.exists() {
        warn!(
            "No override file at {}; running with automated matches only",
            path.display()
        );
        return Ok(HashMap::new());
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read override file {}", path.display()))?;
    let overrides: HashMap<String, Vec<(usize, String)>> = serde_json::from_str(&contents)
        .with_context(|| format!("Malformed override file {}", path.display()))?;

    let total: usize = overrides.values().map(Vec::len).sum();
    info!(
        "Loaded {} override entries for {} datasets from {}",
        total,
        overrides.len(),
        path.display()
    );
    Ok(overrides)
}
