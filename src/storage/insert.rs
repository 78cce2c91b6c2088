// src/storage/insert.rs - Writing resolved datasets into their tables

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use log::info;

use crate::ingest::{CovidRow, GdpRow, MedalRow, PopulationRow};
use crate::models::core::Dataset;
use crate::utils::db_connect::PgPool;

// Reruns hit the unique constraints instead of duplicating rows; resolved
// names are canonical, so a conflict always means "already stored".
const MEDAL_INSERT: &str = "
    INSERT INTO {table} (country_name, gold_medals, silver_medals, bronze_medals, total_medals)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT DO NOTHING
";

const POPULATION_INSERT: &str = "
    INSERT INTO population (country_name, pop_2020, pop_2021)
    VALUES ($1, $2, $3)
    ON CONFLICT DO NOTHING
";

const COVID_INSERT: &str = "
    INSERT INTO covid_and_vac (
        country_name, date_reported, cumulative_cases, new_cases,
        cumulative_deaths, new_deaths, people_vaccinated, people_fully_vaccinated
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
    ON CONFLICT DO NOTHING
";

const GDP_INSERT: &str = "
    INSERT INTO gdp_value (
        country_name, gdp_2012, gdp_2013, gdp_2014, gdp_2015, gdp_2016,
        gdp_2017, gdp_2018, gdp_2019, gdp_2020, gdp_2021
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
    ON CONFLICT DO NOTHING
";

pub async fn store_medals(pool: &PgPool, dataset: &Dataset<MedalRow>) -> Result<u64> {
    let conn = pool
        .get()
        .await
        .with_context(|| format!("Failed to get DB connection for '{}'", dataset.label()))?;
    let statement = conn
        .prepare(&MEDAL_INSERT.replace("{table}", dataset.label()))
        .await
        .with_context(|| format!("Failed to prepare insert for '{}'", dataset.label()))?;

    let mut inserted = 0u64;
    for row in dataset.rows() {
        inserted += conn
            .execute(
                &statement,
                &[&row.country, &row.gold, &row.silver, &row.bronze, &row.total],
            )
            .await
            .with_context(|| format!("Failed to insert into '{}'", dataset.label()))?;
    }

    info!("Stored {} rows into '{}'", inserted, dataset.label());
    Ok(inserted)
}

pub async fn store_population(pool: &PgPool, dataset: &Dataset<PopulationRow>) -> Result<u64> {
    let conn = pool
        .get()
        .await
        .context("Failed to get DB connection for 'population'")?;
    let statement = conn
        .prepare(POPULATION_INSERT)
        .await
        .context("Failed to prepare insert for 'population'")?;

    let mut inserted = 0u64;
    for row in dataset.rows() {
        inserted += conn
            .execute(&statement, &[&row.country, &row.pop_2020, &row.pop_2021])
            .await
            .context("Failed to insert into 'population'")?;
    }

    info!("Stored {} rows into 'population'", inserted);
    Ok(inserted)
}

/// The covid series is by far the largest table, so this one takes an
/// optional per-row progress bar.
pub async fn store_covid(
    pool: &PgPool,
    dataset: &Dataset<CovidRow>,
    progress: Option<&ProgressBar>,
) -> Result<u64> {
    let conn = pool
        .get()
        .await
        .context("Failed to get DB connection for 'covid_and_vac'")?;
    let statement = conn
        .prepare(COVID_INSERT)
        .await
        .context("Failed to prepare insert for 'covid_and_vac'")?;

    let mut inserted = 0u64;
    for row in dataset.rows() {
        inserted += conn
            .execute(
                &statement,
                &[
                    &row.country,
                    &row.date,
                    &row.total_cases,
                    &row.new_cases,
                    &row.total_deaths,
                    &row.new_deaths,
                    &row.people_vaccinated,
                    &row.people_fully_vaccinated,
                ],
            )
            .await
            .context("Failed to insert into 'covid_and_vac'")?;
        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    info!("Stored {} rows into 'covid_and_vac'", inserted);
    Ok(inserted)
}

pub async fn store_gdp(pool: &PgPool, dataset: &Dataset<GdpRow>) -> Result<u64> {
    let conn = pool
        .get()
        .await
        .context("Failed to get DB connection for 'gdp_value'")?;
    let statement = conn
        .prepare(GDP_INSERT)
        .await
        .context("Failed to prepare insert for 'gdp_value'")?;

    let mut inserted = 0u64;
    for row in dataset.rows() {
        let v = &row.values;
        inserted += conn
            .execute(
                &statement,
                &[
                    &row.country,
                    &v[0], &v[1], &v[2], &v[3], &v[4], &v[5], &v[6], &v[7], &v[8], &v[9],
                ],
            )
            .await
            .context("Failed to insert into 'gdp_value'")?;
    }

    info!("Stored {} rows into 'gdp_value'", inserted);
    Ok(inserted)
}
