// src/storage/schema.rs - Table definitions for the resolved datasets

use anyhow::{Context, Result};
use log::info;

use crate::utils::db_connect::PgPool;

const MEDAL_TABLE_COLUMNS: &str = "
    country_name VARCHAR(60) NOT NULL,
    gold_medals INT NOT NULL,
    silver_medals INT NOT NULL,
    bronze_medals INT NOT NULL,
    total_medals INT NOT NULL,

    CONSTRAINT uniq_country UNIQUE(country_name)
";

const POPULATION_DDL: &str = "
    CREATE TABLE IF NOT EXISTS population (
        country_name VARCHAR(60) NOT NULL,
        pop_2020 BIGINT NOT NULL,
        pop_2021 BIGINT NOT NULL,

        CONSTRAINT uniq_country UNIQUE(country_name)
    )
";

const COVID_DDL: &str = "
    CREATE TABLE IF NOT EXISTS covid_and_vac (
        country_name VARCHAR(60) NOT NULL,
        date_reported DATE NOT NULL,
        cumulative_cases BIGINT NOT NULL,
        new_cases BIGINT NOT NULL,
        cumulative_deaths BIGINT NOT NULL,
        new_deaths BIGINT NOT NULL,
        people_vaccinated BIGINT NOT NULL,
        people_fully_vaccinated BIGINT NOT NULL,

        CONSTRAINT uniq_country_date UNIQUE(country_name, date_reported)
    )
";

const GDP_DDL: &str = "
    CREATE TABLE IF NOT EXISTS gdp_value (
        country_name VARCHAR(60) NOT NULL,
        gdp_2012 DOUBLE PRECISION NOT NULL,
        gdp_2013 DOUBLE PRECISION NOT NULL,
        gdp_2014 DOUBLE PRECISION NOT NULL,
        gdp_2015 DOUBLE PRECISION NOT NULL,
        gdp_2016 DOUBLE PRECISION NOT NULL,
        gdp_2017 DOUBLE PRECISION NOT NULL,
        gdp_2018 DOUBLE PRECISION NOT NULL,
        gdp_2019 DOUBLE PRECISION NOT NULL,
        gdp_2020 DOUBLE PRECISION NOT NULL,
        gdp_2021 DOUBLE PRECISION NOT NULL,

        CONSTRAINT uniq_country UNIQUE(country_name)
    )
";

fn medal_table_ddl(table: &str) -> String {
    format!("CREATE TABLE IF NOT EXISTS {} ({})", table, MEDAL_TABLE_COLUMNS)
}

/// Creates every output table if it does not already exist.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    let conn = pool
        .get()
        .await
        .context("Failed to get DB connection for schema creation")?;

    for table in ["tokyo_olympic_2020", "rio_olympic_2016", "london_olympic_2012"] {
        conn.execute(medal_table_ddl(table).as_str(), &[])
            .await
            .with_context(|| format!("Failed to create table {}", table))?;
    }
    conn.execute(POPULATION_DDL, &[])
        .await
        .context("Failed to create table population")?;
    conn.execute(COVID_DDL, &[])
        .await
        .context("Failed to create table covid_and_vac")?;
    conn.execute(GDP_DDL, &[])
        .await
        .context("Failed to create table gdp_value")?;

    info!("Output schema is in place");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_medal_ddl_targets_named_table() {
        let ddl = medal_table_ddl("rio_olympic_2016");
        assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS rio_olympic_2016"));
        assert!(ddl.contains("total_medals INT NOT NULL"));
    }
}
