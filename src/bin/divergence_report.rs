// src/bin/divergence_report.rs
//
// Curator tool: prints the divergence surface and fuzzy candidates for one
// dataset so a human can review automated matches and author override
// entries before the next pipeline run. No database access; this reads the
// CSVs the same way the pipeline does and stops before resolution writes
// anything back.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use clap::Parser;
use log::info;

use recon_lib::ingest::{self, covid::distinct_locations};
use recon_lib::matching::divergence::find_divergence;
use recon_lib::matching::fuzzy::FuzzyMatcher;
use recon_lib::matching::normalize::normalize_names;
use recon_lib::utils::env::load_env;

#[derive(Debug, Parser)]
#[command(name = "divergence_report")]
struct Args {
    /// Directory holding the source CSV files (falls back to $DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Dataset to report on: tokyo, rio, london, covid or gdp
    #[arg(long)]
    dataset: String,

    /// Also list registry names with no counterpart in the dataset
    #[arg(long)]
    show_reference_side: bool,
}

fn name_column(dataset: &str, data_dir: &std::path::Path) -> Result<(String, Vec<String>)> {
    let (label, names) = match dataset {
        "tokyo" => {
            let table = ingest::load_medals(
                &data_dir.join("Tokyo_Medals_2020.csv"),
                ingest::TOKYO_TABLE,
            )?;
            (ingest::TOKYO_TABLE, table.country_names())
        }
        "rio" => {
            let table =
                ingest::load_medals(&data_dir.join("Rio_Medals_2016.csv"), ingest::RIO_TABLE)?;
            (ingest::RIO_TABLE, table.country_names())
        }
        "london" => {
            let table = ingest::load_medals(
                &data_dir.join("London_Medals_2012.csv"),
                ingest::LONDON_TABLE,
            )?;
            (ingest::LONDON_TABLE, table.country_names())
        }
        "covid" => {
            let series = ingest::load_covid(
                &data_dir.join("Covid_Vaccination_Data.csv"),
                ingest::COVID_TABLE,
            )?;
            let names = distinct_locations(&series, ingest::COVID_TABLE);
            (ingest::COVID_TABLE, names.country_names())
        }
        "gdp" => {
            let table =
                ingest::load_gdp(&data_dir.join("GDP_Actual_Value.csv"), ingest::GDP_TABLE)?;
            (ingest::GDP_TABLE, table.country_names())
        }
        other => bail!(
            "Unknown dataset '{}'; expected tokyo, rio, london, covid or gdp",
            other
        ),
    };
    Ok((label.to_string(), names))
}

fn main() -> Result<()> {
    env_logger::init();
    load_env();
    let args = Args::parse();

    let data_dir = args
        .data_dir
        .or_else(|| std::env::var("DATA_DIR").ok().map(PathBuf::from))
        .ok_or_else(|| anyhow!("No data directory given; pass --data-dir or set DATA_DIR"))?;

    let population = ingest::load_population(
        &data_dir.join("Population_2020-21.csv"),
        ingest::POPULATION_TABLE,
    )?;
    let registry = ingest::build_registry(&population);

    let (label, raw_names) = name_column(&args.dataset, &data_dir)?;
    let normalized = normalize_names(&raw_names);
    let divergences = find_divergence(&registry, &normalized);
    let matcher = FuzzyMatcher::new(registry.names());

    info!(
        "Dataset '{}': {} rows, {} divergence records",
        label,
        raw_names.len(),
        divergences.len()
    );

    println!("Divergence report for '{}' (cutoff {:.2})", label, matcher.cutoff());
    println!(
        "{:>6}  {:<32} {:<28} {:>6}  {}",
        "row", "raw name", "best candidate", "score", "padded result"
    );
    for record in &divergences {
        if let (Some(index), Some(name)) = (record.ancillary_index, record.raw_name.as_deref()) {
            let candidate = matcher.best_candidate(name);
            println!(
                "{:>6}  {:<32} {:<28} {:>6.3}  {}",
                index,
                name,
                candidate.accepted().unwrap_or("-"),
                candidate.confidence,
                candidate.padded()
            );
        }
    }

    if args.show_reference_side {
        println!();
        println!("Registry names with no counterpart in '{}':", label);
        for record in &divergences {
            if let (Some(index), Some(name)) =
                (record.primary_index, record.reference_name.as_deref())
            {
                println!("{:>6}  {}", index, name);
            }
        }
    }

    Ok(())
}
