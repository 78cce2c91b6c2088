// src/models/core.rs - Core data model: datasets, rows, and the reference registry

use std::collections::HashMap;

/// A row type that carries a country-name field the resolution engine can
/// read and rewrite. Payload columns are the row type's own business.
pub trait CountryKeyed {
    fn country(&self) -> &str;
    fn set_country(&mut self, name: String);
}

/// An ordered sequence of rows with a designated country-name column.
/// Row indices are assigned at load time and stay stable for the run;
/// they are the join key used to splice resolved names back in.
#[derive(Debug, Clone)]
pub struct Dataset<R> {
    label: String,
    rows: Vec<R>,
}

impl<R: CountryKeyed> Dataset<R> {
    pub fn new(label: impl Into<String>, rows: Vec<R>) -> Self {
        Self {
            label: label.into(),
            rows,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Snapshot of the country-name column, in row order.
    pub fn country_names(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.country().to_string()).collect()
    }

    pub fn country_at(&self, index: usize) -> Option<&str> {
        self.rows.get(index).map(|r| r.country())
    }

    /// Writes a resolved name at its original row index. Callers are
    /// expected to have validated the index; out-of-range writes are a
    /// programming error at this layer and are ignored with a false return.
    pub fn set_country_at(&mut self, index: usize, name: String) -> bool {
        match self.rows.get_mut(index) {
            Some(row) => {
                row.set_country(name);
                true
            }
            None => false,
        }
    }
}

/// A bare country-name row, used when a dataset's distinct names are
/// reconciled separately from its full row set (e.g. long per-date series).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryNameRow {
    pub country: String,
}

impl CountryKeyed for CountryNameRow {
    fn country(&self) -> &str {
        &self.country
    }

    fn set_country(&mut self, name: String) {
        self.country = name;
    }
}

/// The set of canonical country names all other datasets align to.
/// Loaded once per run from the trusted source and immutable afterwards.
/// Iteration order is the source order, which makes fuzzy tie-breaking
/// deterministic.
#[derive(Debug, Clone)]
pub struct ReferenceRegistry {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl ReferenceRegistry {
    /// Builds the registry from canonical names, keeping first occurrence
    /// order and dropping duplicates.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ordered = Vec::new();
        let mut positions = HashMap::new();
        for name in names {
            let name = name.into();
            if !positions.contains_key(&name) {
                positions.insert(name.clone(), ordered.len());
                ordered.push(name);
            }
        }
        Self {
            names: ordered,
            positions,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Position of a canonical name in source order, if present.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// The canonical vocabulary, in source order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
