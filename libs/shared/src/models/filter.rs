//! Command filtering configuration.
//!
//! Controls which extension commands get registered at startup. Supports
//! glob patterns in both directions:
//!
//! ```toml
//! [commands]
//! include = ["glog", "context-*"]
//! exclude = ["*-experimental"]
//! ```
//!
//! # Filtering Logic
//!
//! 1. If `include` is set and non-empty, only names matching at least one
//!    pattern are loaded
//! 2. If `exclude` is set and non-empty, names matching any pattern are
//!    filtered out
//! 3. `exclude` takes precedence over `include` (if both match, the
//!    command is excluded)

use serde::{Deserialize, Serialize};

/// Include/exclude filter applied to command names at registration time.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct CommandFilter {
    /// Include only these commands by name (supports glob patterns, empty = all allowed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,
    /// Exclude specific commands by name (supports glob patterns, empty = none excluded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
}

impl CommandFilter {
    /// Check if a command should be loaded based on include/exclude patterns.
    ///
    /// Returns `true` if the name passes both filters.
    pub fn should_load(&self, command_name: &str) -> bool {
        self.matches_include(command_name) && self.matches_exclude(command_name)
    }

    fn matches_include(&self, name: &str) -> bool {
        match &self.include {
            Some(patterns) if !patterns.is_empty() => patterns
                .iter()
                .any(|p| crate::utils::matches_glob(name, p)),
            _ => true, // No include filter = allow all
        }
    }

    fn matches_exclude(&self, name: &str) -> bool {
        match &self.exclude {
            Some(patterns) if !patterns.is_empty() => !patterns
                .iter()
                .any(|p| crate::utils::matches_glob(name, p)),
            _ => true, // No exclude filter = exclude none
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_load_no_filters() {
        let filter = CommandFilter::default();
        assert!(filter.should_load("any-command"));
        assert!(filter.should_load("glog"));
    }

    #[test]
    fn test_should_load_include_only() {
        let filter = CommandFilter {
            include: Some(vec!["context-*".to_string(), "glog".to_string()]),
            exclude: None,
        };
        assert!(filter.should_load("context-backup"));
        assert!(filter.should_load("glog"));
        assert!(!filter.should_load("stats"));
    }

    #[test]
    fn test_should_load_exclude_only() {
        let filter = CommandFilter {
            include: None,
            exclude: Some(vec!["*-experimental".to_string()]),
        };
        assert!(filter.should_load("glog"));
        assert!(!filter.should_load("timemachine-experimental"));
    }

    #[test]
    fn test_should_load_exclude_takes_precedence() {
        let filter = CommandFilter {
            include: Some(vec!["context-*".to_string()]),
            exclude: Some(vec!["context-load".to_string()]),
        };
        assert!(filter.should_load("context-backup"));
        // Excluded even though it matches include
        assert!(!filter.should_load("context-load"));
    }

    #[test]
    fn test_empty_lists_allow_all() {
        let filter = CommandFilter {
            include: Some(vec![]),
            exclude: Some(vec![]),
        };
        assert!(filter.should_load("anything"));
    }
}
