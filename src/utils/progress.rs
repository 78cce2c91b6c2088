// src/utils/progress.rs

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::env;

/// Configuration for progress tracking throughout the pipeline
#[derive(Debug, Clone)]
pub struct ProgressConfig {
    /// Whether to show progress bars at all
    pub enabled: bool,
    /// Whether to show per-row insert progress in addition to phase bars
    pub detailed: bool,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            detailed: true,
        }
    }
}

impl ProgressConfig {
    /// Create progress configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            enabled: flag_from(env::var("PROGRESS_ENABLED").ok()),
            detailed: flag_from(env::var("PROGRESS_DETAILED").ok()),
        }
    }

    /// Create a MultiProgress instance if progress is enabled, None otherwise
    pub fn create_multi_progress(&self) -> Option<MultiProgress> {
        if self.enabled {
            Some(MultiProgress::new())
        } else {
            None
        }
    }

    pub fn should_show_detailed(&self) -> bool {
        self.enabled && self.detailed
    }
}

// Unset or unparsable values mean "on"; bars opt out, never opt in.
fn flag_from(value: Option<String>) -> bool {
    value.and_then(|v| v.parse().ok()).unwrap_or(true)
}

/// Standard phase bar used by the binaries.
pub fn phase_bar(multi: &Option<MultiProgress>, len: u64) -> Option<ProgressBar> {
    multi.as_ref().map(|mp| {
        let pb = mp.add(ProgressBar::new(len));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        pb
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProgressConfig::default();
        assert!(config.enabled);
        assert!(config.detailed);
    }

    #[test]
    fn test_flag_parsing() {
        assert!(flag_from(None));
        assert!(flag_from(Some("true".to_string())));
        assert!(!flag_from(Some("false".to_string())));
        // Garbage values fall back to the default rather than erroring.
        assert!(flag_from(Some("yes please".to_string())));
    }

    #[test]
    fn test_multi_progress_creation() {
        let mut config = ProgressConfig::default();

        config.enabled = true;
        assert!(config.create_multi_progress().is_some());

        config.enabled = false;
        assert!(config.create_multi_progress().is_none());
        assert!(!config.should_show_detailed());
    }
}
