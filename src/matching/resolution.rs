// src/matching/resolution.rs - Per-dataset orchestration of the resolution stages

use log::{debug, info, warn};

use crate::matching::divergence::find_divergence;
use crate::matching::fuzzy::FuzzyMatcher;
use crate::matching::normalize::normalize_names;
use crate::matching::overrides::OverrideLedger;
use crate::matching::ResolutionError;
use crate::models::core::{CountryKeyed, Dataset, ReferenceRegistry};
use crate::models::matching::{DivergenceRecord, MatchCandidate};

/// What one dataset's resolution did, kept for the curator workflow: the
/// full divergence surface, the fuzzy candidate computed for every
/// mismatched row, the rows actually rewritten, and the rows left as-is
/// because neither an override nor a confident match existed.
#[derive(Debug, Clone)]
pub struct ResolutionOutcome {
    pub dataset: String,
    pub divergences: Vec<DivergenceRecord>,
    pub candidates: Vec<MatchCandidate>,
    pub changed: Vec<(usize, String)>,
    pub unresolved: Vec<usize>,
}

/// Resolves one dataset's country-name column against the registry:
/// normalize, detect divergence, fuzzy-match every mismatch in padded mode,
/// overlay the override ledger, then write the winning names back at their
/// original row indices. Only the name column is touched; row count and
/// ordering are preserved.
///
/// Idempotent per row: a second run over the output produces no further
/// change. Structural problems abort before any row is rewritten.
pub fn resolve_dataset<R: CountryKeyed>(
    dataset: &mut Dataset<R>,
    registry: &ReferenceRegistry,
    overrides: &OverrideLedger,
) -> Result<ResolutionOutcome, ResolutionError> {
    // Structural validation first, so a bad ledger never leaves the dataset
    // partially rewritten.
    if let Some(index) = overrides.first_index_beyond(dataset.len()) {
        return Err(ResolutionError::IndexOutOfRange {
            dataset: dataset.label().to_string(),
            index,
            len: dataset.len(),
        });
    }

    let raw_names = dataset.country_names();
    let mut final_names = normalize_names(&raw_names);

    let divergences = find_divergence(registry, &final_names);
    let matcher = FuzzyMatcher::new(registry.names());

    let mut candidates = Vec::new();
    let mut unresolved = Vec::new();

    for record in &divergences {
        let (index, mismatched_name) = match (record.ancillary_index, record.raw_name.as_deref()) {
            (Some(index), Some(name)) if record.needs_resolution() => (index, name),
            _ => continue,
        };

        let candidate = matcher.best_candidate(mismatched_name);
        let resolved = match overrides.get(index) {
            // A curated correction is authoritative; the fuzzy result for
            // this row is discarded.
            Some(corrected) => corrected.to_string(),
            None => {
                if candidate.accepted().is_none() {
                    // Padded fallback: the raw name stands, flagged for the
                    // curator rather than silently treated as success.
                    unresolved.push(index);
                }
                candidate.padded().to_string()
            }
        };

        candidates.push(candidate);
        final_names[index] = resolved;
    }

    // Overrides are authoritative even where the automated stages saw no
    // mismatch, and reapplying one is a no-op by construction.
    for (index, corrected) in overrides.iter() {
        final_names[index] = corrected.to_string();
    }

    let mut changed = Vec::new();
    for (index, name) in final_names.into_iter().enumerate() {
        if dataset.country_at(index) != Some(name.as_str()) {
            dataset.set_country_at(index, name.clone());
            changed.push((index, name));
        }
    }

    info!(
        "Resolved dataset '{}': {} rows, {} rewritten, {} mismatches, {} left unresolved",
        dataset.label(),
        dataset.len(),
        changed.len(),
        candidates.len(),
        unresolved.len()
    );
    if !unresolved.is_empty() {
        warn!(
            "Dataset '{}' has unresolved rows needing curator review: {:?}",
            dataset.label(),
            unresolved
        );
    }
    debug!(
        "Dataset '{}': {} override entries applied",
        dataset.label(),
        overrides.len()
    );

    Ok(ResolutionOutcome {
        dataset: dataset.label().to_string(),
        divergences,
        candidates,
        changed,
        unresolved,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::core::CountryNameRow;

    fn dataset(label: &str, names: &[&str]) -> Dataset<CountryNameRow> {
        Dataset::new(
            label,
            names
                .iter()
                .map(|name| CountryNameRow {
                    country: name.to_string(),
                })
                .collect(),
        )
    }

    fn registry(names: &[&str]) -> ReferenceRegistry {
        ReferenceRegistry::from_names(names.iter().copied())
    }

    #[test]
    fn test_close_name_resolves_via_fuzzy_match() {
        let registry = registry(&["South Korea", "United Kingdom"]);
        let mut medals = dataset("medals", &["Korea, South", "United Kingdom"]);
        let overrides = OverrideLedger::empty("medals");

        let outcome = resolve_dataset(&mut medals, &registry, &overrides).unwrap();

        assert_eq!(medals.country_at(0), Some("South Korea"));
        assert_eq!(medals.country_at(1), Some("United Kingdom"));
        assert_eq!(outcome.changed, vec![(0, "South Korea".to_string())]);
        assert!(outcome.unresolved.is_empty());
        assert_eq!(outcome.candidates.len(), 1);
        assert!(outcome.candidates[0].confidence >= 0.5);
    }

    #[test]
    fn test_unmatched_name_left_as_is_and_flagged() {
        let registry = registry(&["South Korea", "United Kingdom"]);
        let mut medals = dataset("medals", &["Quuxland"]);
        let overrides = OverrideLedger::empty("medals");

        let outcome = resolve_dataset(&mut medals, &registry, &overrides).unwrap();

        assert_eq!(medals.country_at(0), Some("Quuxland"));
        assert_eq!(outcome.unresolved, vec![0]);
        assert!(outcome.changed.is_empty());
        // Still on the divergence surface for the curator.
        assert!(outcome
            .divergences
            .iter()
            .any(|r| r.needs_resolution() && r.raw_name.as_deref() == Some("Quuxland")));
    }

    #[test]
    fn test_override_supersedes_accepted_fuzzy_result() {
        let registry = registry(&["South Korea", "United Kingdom"]);
        let mut medals = dataset("medals", &["Korea, South"]);
        // The fuzzy stage confidently picks "South Korea" here; the curator
        // said otherwise, and the curator wins.
        let overrides =
            OverrideLedger::from_pairs("medals", vec![(0, "United Kingdom".to_string())]).unwrap();

        let outcome = resolve_dataset(&mut medals, &registry, &overrides).unwrap();

        assert_eq!(medals.country_at(0), Some("United Kingdom"));
        assert!(outcome.unresolved.is_empty());
        assert_eq!(outcome.candidates[0].accepted(), Some("South Korea"));
    }

    #[test]
    fn test_congo_resolves_through_override() {
        let registry = registry(&["DR Congo", "Norway"]);
        let mut series = dataset("covid", &["Norway", "Congo_(Kinshasa)"]);
        let overrides =
            OverrideLedger::from_pairs("covid", vec![(1, "DR Congo".to_string())]).unwrap();

        let outcome = resolve_dataset(&mut series, &registry, &overrides).unwrap();

        assert_eq!(series.country_at(0), Some("Norway"));
        assert_eq!(series.country_at(1), Some("DR Congo"));
        assert!(outcome.unresolved.is_empty());
        assert_eq!(outcome.changed, vec![(1, "DR Congo".to_string())]);
    }

    #[test]
    fn test_normalization_alone_rewrites_matching_rows() {
        let registry = registry(&["Cote d'Ivoire", "Norway"]);
        let mut medals = dataset("medals", &["Côte d'Ivoire", "Norway"]);
        let overrides = OverrideLedger::empty("medals");

        let outcome = resolve_dataset(&mut medals, &registry, &overrides).unwrap();

        assert_eq!(medals.country_at(0), Some("Cote d'Ivoire"));
        assert_eq!(outcome.changed, vec![(0, "Cote d'Ivoire".to_string())]);
        // Exact after normalization, so nothing reached the fuzzy stage.
        assert!(outcome.candidates.is_empty());
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let registry = registry(&["South Korea", "United Kingdom", "DR Congo"]);
        let mut medals = dataset(
            "medals",
            &["Korea, South", "United_Kingdom", "Congo (Kinshasa)", "Quuxland"],
        );
        let overrides =
            OverrideLedger::from_pairs("medals", vec![(2, "DR Congo".to_string())]).unwrap();

        resolve_dataset(&mut medals, &registry, &overrides).unwrap();
        let after_first = medals.country_names();

        let second = resolve_dataset(&mut medals, &registry, &overrides).unwrap();
        assert_eq!(medals.country_names(), after_first);
        assert!(second.changed.is_empty());
    }

    #[test]
    fn test_out_of_range_override_aborts_before_any_write() {
        let registry = registry(&["South Korea"]);
        let mut medals = dataset("medals", &["Korea,_South"]);
        let overrides =
            OverrideLedger::from_pairs("medals", vec![(9, "South Korea".to_string())]).unwrap();

        let err = resolve_dataset(&mut medals, &registry, &overrides).unwrap_err();
        assert_eq!(
            err,
            ResolutionError::IndexOutOfRange {
                dataset: "medals".to_string(),
                index: 9,
                len: 1,
            }
        );
        // Nothing was rewritten, not even normalization.
        assert_eq!(medals.country_at(0), Some("Korea,_South"));
    }

    #[test]
    fn test_pure_parenthetical_name_stays_unresolved() {
        let registry = registry(&["Norway"]);
        let mut medals = dataset("medals", &["(delegation withdrawn)"]);
        let overrides = OverrideLedger::empty("medals");

        let outcome = resolve_dataset(&mut medals, &registry, &overrides).unwrap();

        // Collapsed to empty by normalization; surfaced, not dropped.
        assert_eq!(medals.country_at(0), Some(""));
        assert_eq!(outcome.unresolved, vec![0]);
    }

    #[test]
    fn test_independent_datasets_resolve_identically_in_any_order() {
        let registry = registry(&["South Korea", "United Kingdom"]);
        let overrides_a = OverrideLedger::empty("a");
        let overrides_b = OverrideLedger::empty("b");

        let mut a1 = dataset("a", &["Korea, South"]);
        let mut b1 = dataset("b", &["United_Kingdom"]);
        resolve_dataset(&mut a1, &registry, &overrides_a).unwrap();
        resolve_dataset(&mut b1, &registry, &overrides_b).unwrap();

        let mut a2 = dataset("a", &["Korea, South"]);
        let mut b2 = dataset("b", &["United_Kingdom"]);
        resolve_dataset(&mut b2, &registry, &overrides_b).unwrap();
        resolve_dataset(&mut a2, &registry, &overrides_a).unwrap();

        assert_eq!(a1.country_names(), a2.country_names());
        assert_eq!(b1.country_names(), b2.country_names());
    }

    #[test]
    fn test_independent_datasets_resolve_identically_in_parallel() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(registry(&["South Korea", "United Kingdom", "DR Congo"]));
        let overrides_b =
            OverrideLedger::from_pairs("b", vec![(1, "DR Congo".to_string())]).unwrap();

        let mut sequential_a = dataset("a", &["Korea, South", "Quuxland"]);
        let mut sequential_b = dataset("b", &["United_Kingdom", "Congo (Kinshasa)"]);
        resolve_dataset(&mut sequential_a, &registry, &OverrideLedger::empty("a")).unwrap();
        resolve_dataset(&mut sequential_b, &registry, &overrides_b).unwrap();

        let registry_a = Arc::clone(&registry);
        let handle_a = thread::spawn(move || {
            let mut a = dataset("a", &["Korea, South", "Quuxland"]);
            resolve_dataset(&mut a, &registry_a, &OverrideLedger::empty("a")).unwrap();
            a.country_names()
        });
        let registry_b = Arc::clone(&registry);
        let handle_b = thread::spawn(move || {
            let mut b = dataset("b", &["United_Kingdom", "Congo (Kinshasa)"]);
            let overrides =
                OverrideLedger::from_pairs("b", vec![(1, "DR Congo".to_string())]).unwrap();
            resolve_dataset(&mut b, &registry_b, &overrides).unwrap();
            b.country_names()
        });

        assert_eq!(handle_a.join().unwrap(), sequential_a.country_names());
        assert_eq!(handle_b.join().unwrap(), sequential_b.country_names());
    }
}
