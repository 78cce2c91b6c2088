// src/models/matching.rs - Records produced by divergence detection and fuzzy matching

/// One row of the outer join between the reference registry and an
/// ancillary dataset's (normalized) name column.
///
/// A populated `reference_name` with an empty `raw_name` means the canonical
/// name simply has no counterpart in the dataset; a populated `raw_name`
/// with an empty `reference_name` is a genuine mismatch that resolution has
/// to deal with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivergenceRecord {
    pub primary_index: Option<usize>,
    pub reference_name: Option<String>,
    pub ancillary_index: Option<usize>,
    pub raw_name: Option<String>,
}

impl DivergenceRecord {
    pub fn unmatched_reference(primary_index: usize, reference_name: String) -> Self {
        Self {
            primary_index: Some(primary_index),
            reference_name: Some(reference_name),
            ancillary_index: None,
            raw_name: None,
        }
    }

    pub fn unmatched_row(ancillary_index: usize, raw_name: String) -> Self {
        Self {
            primary_index: None,
            reference_name: None,
            ancillary_index: Some(ancillary_index),
            raw_name: Some(raw_name),
        }
    }

    /// True for dataset rows that still need a resolution, as opposed to
    /// registry names that merely lack a counterpart.
    pub fn needs_resolution(&self) -> bool {
        self.raw_name.is_some() && self.reference_name.is_none()
    }
}

/// Best approximate match for one mismatched raw name against the registry
/// vocabulary. `matched_name` is populated only when the score cleared the
/// matcher's cutoff; the candidate itself is computed exactly once and both
/// retrieval modes are views over it.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    pub raw_name: String,
    pub matched_name: Option<String>,
    pub confidence: f64,
}

impl MatchCandidate {
    /// Padded view: the matched name, or the raw name itself when nothing
    /// cleared the cutoff. Never empty for non-empty input.
    pub fn padded(&self) -> &str {
        self.matched_name.as_deref().unwrap_or(&self.raw_name)
    }

    /// Unpadded view: `None` exactly when no candidate cleared the cutoff.
    pub fn accepted(&self) -> Option<&str> {
        self.matched_name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divergence_record_sides() {
        let reference = DivergenceRecord::unmatched_reference(3, "Tuvalu".to_string());
        assert!(!reference.needs_resolution());
        assert_eq!(reference.primary_index, Some(3));
        assert_eq!(reference.ancillary_index, None);

        let row = DivergenceRecord::unmatched_row(14, "Korea, South".to_string());
        assert!(row.needs_resolution());
        assert_eq!(row.raw_name.as_deref(), Some("Korea, South"));
        assert_eq!(row.reference_name, None);
    }

    #[test]
    fn test_candidate_views_share_one_computation() {
        let hit = MatchCandidate {
            raw_name: "Korea, South".to_string(),
            matched_name: Some("South Korea".to_string()),
            confidence: 0.72,
        };
        assert_eq!(hit.padded(), "South Korea");
        assert_eq!(hit.accepted(), Some("South Korea"));

        let miss = MatchCandidate {
            raw_name: "Quuxland".to_string(),
            matched_name: None,
            confidence: 0.31,
        };
        assert_eq!(miss.padded(), "Quuxland");
        assert_eq!(miss.accepted(), None);
    }
}
