// src/ingest/covid.rs - COVID case and vaccination series

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;
use serde::Deserialize;

use crate::ingest::NON_COUNTRY_AGGREGATES;
use crate::models::core::{CountryKeyed, CountryNameRow, Dataset};

/// One location-and-date observation. Missing numeric cells become 0, as in
/// the source cleaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CovidRow {
    pub country: String,
    pub date: NaiveDate,
    pub total_cases: i64,
    pub new_cases: i64,
    pub total_deaths: i64,
    pub new_deaths: i64,
    pub people_vaccinated: i64,
    pub people_fully_vaccinated: i64,
}

impl CountryKeyed for CovidRow {
    fn country(&self) -> &str {
        &self.country
    }

    fn set_country(&mut self, name: String) {
        self.country = name;
    }
}

// Raw CSV shape; the source carries dozens more columns, all ignored.
#[derive(Debug, Deserialize)]
struct CovidCsvRow {
    location: String,
    date: NaiveDate,
    total_cases: Option<f64>,
    new_cases: Option<f64>,
    total_deaths: Option<f64>,
    new_deaths: Option<f64>,
    people_vaccinated: Option<f64>,
    people_fully_vaccinated: Option<f64>,
}

fn as_count(value: Option<f64>) -> i64 {
    value.unwrap_or(0.0).round() as i64
}

fn read_covid<R: Read>(reader: R, label: &str) -> Result<Dataset<CovidRow>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    let mut dropped_aggregates = 0usize;

    for record in csv_reader.deserialize() {
        let raw: CovidCsvRow =
            record.with_context(|| format!("Malformed covid row for '{}'", label))?;
        if NON_COUNTRY_AGGREGATES.contains(&raw.location.as_str()) {
            dropped_aggregates += 1;
            continue;
        }
        rows.push(CovidRow {
            country: raw.location,
            date: raw.date,
            total_cases: as_count(raw.total_cases),
            new_cases: as_count(raw.new_cases),
            total_deaths: as_count(raw.total_deaths),
            new_deaths: as_count(raw.new_deaths),
            people_vaccinated: as_count(raw.people_vaccinated),
            people_fully_vaccinated: as_count(raw.people_fully_vaccinated),
        });
    }

    if dropped_aggregates > 0 {
        info!(
            "Dropped {} aggregate rows (continents, income bands) from '{}'",
            dropped_aggregates, label
        );
    }
    Ok(Dataset::new(label, rows))
}

pub fn load_covid(path: &Path, label: &str) -> Result<Dataset<CovidRow>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open covid series {}", path.display()))?;
    let dataset = read_covid(file, label)?;
    info!("Loaded {} covid rows into '{}'", dataset.len(), label);
    Ok(dataset)
}

/// Distinct location names in first-appearance order, as a name-only
/// dataset. The long per-date series is reconciled through this compact
/// view, then the resulting name mapping is replayed over the full series.
pub fn distinct_locations(covid: &Dataset<CovidRow>, label: &str) -> Dataset<CountryNameRow> {
    let mut seen = std::collections::HashSet::new();
    let mut rows = Vec::new();
    for row in covid.rows() {
        if seen.insert(row.country.clone()) {
            rows.push(CountryNameRow {
                country: row.country.clone(),
            });
        }
    }
    Dataset::new(label, rows)
}

/// Replays a resolved name mapping (`raw -> canonical`) over every row of
/// the full series. Names absent from the mapping are left untouched.
pub fn apply_name_mapping(
    covid: &mut Dataset<CovidRow>,
    mapping: &std::collections::HashMap<String, String>,
) -> usize {
    let mut rewritten = 0usize;
    for index in 0..covid.len() {
        let current = match covid.country_at(index) {
            Some(name) => name.to_string(),
            None => continue,
        };
        if let Some(resolved) = mapping.get(&current) {
            if resolved != &current {
                covid.set_country_at(index, resolved.clone());
                rewritten += 1;
            }
        }
    }
    rewritten
}
