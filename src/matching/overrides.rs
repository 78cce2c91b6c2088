// src/matching/overrides.rs - Curated per-dataset corrections that outrank
// automated matches

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::matching::ResolutionError;

/// Manual `(row index -> corrected name)` corrections for one dataset,
/// authored out of band by a curator reviewing the divergence report.
/// Static input to a run; the engine never learns or persists new entries.
///
/// An override always wins over a fuzzy-match candidate at the same index.
#[derive(Debug, Clone, Default)]
pub struct OverrideLedger {
    dataset: String,
    entries: BTreeMap<usize, String>,
}

impl OverrideLedger {
    pub fn empty(dataset: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Builds the ledger from curated pairs. Two entries targeting the same
    /// index with different values are a configuration error and are
    /// rejected up front; an exact duplicate pair is tolerated.
    pub fn from_pairs<I>(dataset: impl Into<String>, pairs: I) -> Result<Self, ResolutionError>
    where
        I: IntoIterator<Item = (usize, String)>,
    {
        let dataset = dataset.into();
        let mut entries = BTreeMap::new();

        for (index, corrected_name) in pairs {
            match entries.entry(index) {
                Entry::Vacant(slot) => {
                    slot.insert(corrected_name);
                }
                Entry::Occupied(existing) => {
                    if *existing.get() != corrected_name {
                        return Err(ResolutionError::ConflictingOverride {
                            dataset,
                            index,
                            first: existing.get().clone(),
                            second: corrected_name,
                        });
                    }
                }
            }
        }

        Ok(Self { dataset, entries })
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(&index).map(String::as_str)
    }

    /// Entries in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.entries.iter().map(|(index, name)| (*index, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry whose index falls outside a dataset of `len` rows.
    pub fn first_index_beyond(&self, len: usize) -> Option<usize> {
        self.entries.keys().find(|index| **index >= len).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_index() {
        let ledger = OverrideLedger::from_pairs(
            "tokyo_olympic_2020",
            vec![
                (14, "DR Congo".to_string()),
                (3, "Ivory Coast".to_string()),
            ],
        )
        .unwrap();

        assert_eq!(ledger.get(14), Some("DR Congo"));
        assert_eq!(ledger.get(3), Some("Ivory Coast"));
        assert_eq!(ledger.get(99), None);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_iteration_is_index_ordered() {
        let ledger = OverrideLedger::from_pairs(
            "gdp_value",
            vec![(9, "Laos".to_string()), (2, "Taiwan".to_string())],
        )
        .unwrap();
        let collected: Vec<_> = ledger.iter().collect();
        assert_eq!(collected, vec![(2, "Taiwan"), (9, "Laos")]);
    }

    #[test]
    fn test_conflicting_values_for_same_index_are_rejected() {
        let err = OverrideLedger::from_pairs(
            "covid_and_vac",
            vec![
                (7, "DR Congo".to_string()),
                (7, "Republic of the Congo".to_string()),
            ],
        )
        .unwrap_err();

        assert_eq!(
            err,
            ResolutionError::ConflictingOverride {
                dataset: "covid_and_vac".to_string(),
                index: 7,
                first: "DR Congo".to_string(),
                second: "Republic of the Congo".to_string(),
            }
        );
    }

    #[test]
    fn test_exact_duplicate_pair_is_tolerated() {
        let ledger = OverrideLedger::from_pairs(
            "rio_olympic_2016",
            vec![(5, "Taiwan".to_string()), (5, "Taiwan".to_string())],
        )
        .unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(5), Some("Taiwan"));
    }

    #[test]
    fn test_first_index_beyond_dataset_length() {
        let ledger = OverrideLedger::from_pairs(
            "london_olympic_2012",
            vec![(2, "Iran".to_string()), (40, "China".to_string())],
        )
        .unwrap();
        assert_eq!(ledger.first_index_beyond(41), None);
        assert_eq!(ledger.first_index_beyond(40), Some(40));
        assert_eq!(ledger.first_index_beyond(1), Some(2));
    }
}
