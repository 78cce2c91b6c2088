// src/matching/divergence.rs - Outer-join comparison of a dataset's name column
// against the reference registry

use std::collections::HashSet;

use crate::models::core::ReferenceRegistry;
use crate::models::matching::DivergenceRecord;

/// Full outer join on exact string equality between the registry's names and
/// a (normalized) ancillary name column. Returns every row where equality
/// failed on either side.
///
/// Totality: every ancillary row whose name has no exact registry
/// counterpart appears exactly once, keyed by its original row index.
/// Rows that match exactly never appear. Registry names without any
/// counterpart in the dataset are reported on the reference side only, so a
/// curator can see both halves of the join.
pub fn find_divergence(registry: &ReferenceRegistry, names: &[String]) -> Vec<DivergenceRecord> {
    let mut records = Vec::new();
    let mut matched_reference: HashSet<usize> = HashSet::new();

    for (ancillary_index, name) in names.iter().enumerate() {
        match registry.position(name) {
            Some(primary_index) => {
                // Distinct raw names that collapsed to the same canonical
                // form both land here; that is the intended synonym
                // collapse, not a suppressed mismatch.
                matched_reference.insert(primary_index);
            }
            None => {
                records.push(DivergenceRecord::unmatched_row(
                    ancillary_index,
                    name.clone(),
                ));
            }
        }
    }

    for (primary_index, reference_name) in registry.names().iter().enumerate() {
        if !matched_reference.contains(&primary_index) {
            records.push(DivergenceRecord::unmatched_reference(
                primary_index,
                reference_name.clone(),
            ));
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ReferenceRegistry {
        ReferenceRegistry::from_names(["South Korea", "United Kingdom", "Norway"])
    }

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_exact_matches_are_absent_from_output() {
        let records = find_divergence(&registry(), &names(&["Norway", "South Korea", "United Kingdom"]));
        assert!(records.is_empty());
    }

    #[test]
    fn test_every_mismatched_row_appears_exactly_once() {
        let column = names(&["Korea, South", "Norway", "Quuxland"]);
        let records = find_divergence(&registry(), &column);

        let unresolved: Vec<_> = records.iter().filter(|r| r.needs_resolution()).collect();
        assert_eq!(unresolved.len(), 2);
        assert_eq!(unresolved[0].ancillary_index, Some(0));
        assert_eq!(unresolved[0].raw_name.as_deref(), Some("Korea, South"));
        assert_eq!(unresolved[1].ancillary_index, Some(2));
        assert_eq!(unresolved[1].raw_name.as_deref(), Some("Quuxland"));
    }

    #[test]
    fn test_reference_names_without_counterpart_reported_on_reference_side() {
        let records = find_divergence(&registry(), &names(&["Norway"]));

        let reference_only: Vec<_> = records.iter().filter(|r| !r.needs_resolution()).collect();
        assert_eq!(reference_only.len(), 2);
        assert_eq!(reference_only[0].reference_name.as_deref(), Some("South Korea"));
        assert_eq!(reference_only[0].primary_index, Some(0));
        assert_eq!(reference_only[1].reference_name.as_deref(), Some("United Kingdom"));
        assert!(records.iter().all(|r| r.raw_name.as_deref() != Some("Norway")));
    }

    #[test]
    fn test_synonym_collapse_matches_both_rows() {
        // Two distinct rows carrying the same canonical name count as
        // matched; neither is reported.
        let records = find_divergence(&registry(), &names(&["Norway", "Norway"]));
        assert!(records.iter().all(|r| !r.needs_resolution()));
    }

    #[test]
    fn test_empty_normalized_name_surfaces_as_mismatch() {
        let records = find_divergence(&registry(), &names(&["", "Norway"]));
        let unresolved: Vec<_> = records.iter().filter(|r| r.needs_resolution()).collect();
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].ancillary_index, Some(0));
        assert_eq!(unresolved[0].raw_name.as_deref(), Some(""));
    }
}
