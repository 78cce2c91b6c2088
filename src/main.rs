use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{info, warn};

use recon_lib::ingest::{
    self,
    covid::{apply_name_mapping, distinct_locations},
};
use recon_lib::matching::overrides::OverrideLedger;
use recon_lib::matching::resolution::{resolve_dataset, ResolutionOutcome};
use recon_lib::models::core::ReferenceRegistry;
use recon_lib::storage;
use recon_lib::utils::db_connect::{connect, get_pool_status};
use recon_lib::utils::env::load_env;
use recon_lib::utils::progress::{phase_bar, ProgressConfig};

/// Reconciles country names across the source tables against the population
/// registry, then stores the resolved datasets.
#[derive(Debug, Parser)]
#[command(name = "reconcile")]
struct Args {
    /// Directory holding the source CSV files (falls back to $DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Run resolution and report, but skip database storage
    #[arg(long)]
    dry_run: bool,
}

fn ledger_for(
    label: &str,
    overrides: &HashMap<String, Vec<(usize, String)>>,
) -> Result<OverrideLedger> {
    match overrides.get(label) {
        Some(pairs) => Ok(OverrideLedger::from_pairs(label, pairs.iter().cloned())?),
        None => Ok(OverrideLedger::empty(label)),
    }
}

fn log_outcome(outcome: &ResolutionOutcome, registry: &ReferenceRegistry) {
    let mismatches = outcome
        .divergences
        .iter()
        .filter(|r| r.needs_resolution())
        .count();
    info!(
        "'{}': {} mismatches against {} registry names, {} rows rewritten, {} unresolved",
        outcome.dataset,
        mismatches,
        registry.len(),
        outcome.changed.len(),
        outcome.unresolved.len()
    );
    for candidate in &outcome.candidates {
        if candidate.accepted().is_none() {
            warn!(
                "'{}': no confident match for '{}' (best score {:.3}); add an override if needed",
                outcome.dataset, candidate.raw_name, candidate.confidence
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    load_env();
    let args = Args::parse();

    let data_dir = args
        .data_dir
        .or_else(|| std::env::var("DATA_DIR").ok().map(PathBuf::from))
        .ok_or_else(|| anyhow!("No data directory given; pass --data-dir or set DATA_DIR"))?;

    info!("Starting country-name reconciliation pipeline");
    let started = Instant::now();

    let progress_config = ProgressConfig::from_env();
    let multi_progress = progress_config.create_multi_progress();
    let main_pb = phase_bar(&multi_progress, 4);
    if let Some(pb) = &main_pb {
        pb.set_message("Phase 1: Loading source tables");
    }

    // Phase 1: load and clean every source, plus the curated overrides.
    let mut tables = ingest::load_all(&data_dir)?;
    let overrides = ingest::load_overrides(&data_dir)?;
    if let Some(pb) = &main_pb {
        pb.inc(1);
        pb.set_message("Phase 2: Resolving country names");
    }

    // Phase 2: build the registry from the trusted population table, then
    // resolve every dataset against it. The registry is built from already
    // normalized names, so resolving the population table itself only
    // applies normalization.
    let registry = ingest::build_registry(&tables.population);

    let outcome = resolve_dataset(
        &mut tables.population,
        &registry,
        &ledger_for(ingest::POPULATION_TABLE, &overrides)?,
    )?;
    log_outcome(&outcome, &registry);

    for (label, dataset) in [
        (ingest::TOKYO_TABLE, &mut tables.tokyo),
        (ingest::RIO_TABLE, &mut tables.rio),
        (ingest::LONDON_TABLE, &mut tables.london),
    ] {
        let outcome = resolve_dataset(dataset, &registry, &ledger_for(label, &overrides)?)?;
        log_outcome(&outcome, &registry);
    }

    let outcome = resolve_dataset(
        &mut tables.gdp,
        &registry,
        &ledger_for(ingest::GDP_TABLE, &overrides)?,
    )?;
    log_outcome(&outcome, &registry);

    // The covid series repeats each country once per date, so reconcile its
    // distinct names and replay the resulting mapping over the full series.
    let mut covid_names = distinct_locations(&tables.covid, ingest::COVID_TABLE);
    let raw_names = covid_names.country_names();
    let outcome = resolve_dataset(
        &mut covid_names,
        &registry,
        &ledger_for(ingest::COVID_TABLE, &overrides)?,
    )?;
    log_outcome(&outcome, &registry);

    let mapping: HashMap<String, String> = raw_names
        .into_iter()
        .zip(covid_names.country_names())
        .collect();
    let rewritten = apply_name_mapping(&mut tables.covid, &mapping);
    info!(
        "Replayed resolved covid names over the full series: {} rows rewritten",
        rewritten
    );

    if args.dry_run {
        info!("Dry run requested; skipping storage");
        if let Some(pb) = &main_pb {
            pb.finish_with_message("Resolution complete (dry run)");
        }
        return Ok(());
    }

    if let Some(pb) = &main_pb {
        pb.inc(1);
        pb.set_message("Phase 3: Preparing output schema");
    }

    // Phase 3: storage schema.
    let pool = connect().await.context("Failed to connect to database")?;
    storage::create_schema(&pool).await?;
    if let Some(pb) = &main_pb {
        pb.inc(1);
        pb.set_message("Phase 4: Storing resolved datasets");
    }

    // Phase 4: store everything. The small tables go in concurrently; the
    // covid series follows with its own row-level progress bar.
    let (tokyo_n, rio_n, london_n, population_n, gdp_n) = futures::try_join!(
        storage::store_medals(&pool, &tables.tokyo),
        storage::store_medals(&pool, &tables.rio),
        storage::store_medals(&pool, &tables.london),
        storage::store_population(&pool, &tables.population),
        storage::store_gdp(&pool, &tables.gdp),
    )?;

    let (pool_size, pool_idle) = get_pool_status(&pool);
    info!(
        "Pool state after concurrent inserts: {} connections, {} idle",
        pool_size, pool_idle
    );

    let covid_pb = if progress_config.should_show_detailed() {
        phase_bar(&multi_progress, tables.covid.len() as u64)
    } else {
        None
    };
    if let Some(pb) = &covid_pb {
        pb.set_message("covid_and_vac rows");
    }
    let covid_n = storage::store_covid(&pool, &tables.covid, covid_pb.as_ref()).await?;
    if let Some(pb) = &covid_pb {
        pb.finish_and_clear();
    }

    info!(
        "Stored rows: tokyo={}, rio={}, london={}, population={}, gdp={}, covid={}",
        tokyo_n, rio_n, london_n, population_n, gdp_n, covid_n
    );

    if let Some(pb) = &main_pb {
        pb.inc(1);
        pb.finish_with_message("Pipeline complete");
    }
    info!(
        "Reconciliation pipeline finished in {:.2}s",
        started.elapsed().as_secs_f64()
    );
    Ok(())
}
