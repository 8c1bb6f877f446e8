//! Capability registration and hotword routing.
//!
//! The hosting framework routes an utterance to a capability by matching it
//! against the hotwords declared in the capability's manifest file.

use anyhow::{Context, Result};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Minimum fuzzy-match score for a hotword to count as a hit when no exact
/// substring match is found.
const MIN_MATCH_SCORE: i64 = 50;

/// The static registration record for this capability.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CapabilityManifest {
    /// Name the host registers this capability under.
    pub unique_name: String,
    /// Phrases that route an utterance to this capability.
    pub matching_hotwords: Vec<String>,
}

impl CapabilityManifest {
    /// Loads the manifest from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read capability manifest at {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid capability manifest at {}", path.display()))
    }

    /// Returns true when the utterance should route to this capability:
    /// either a case-insensitive substring hit on a hotword, or a fuzzy
    /// match scoring above the threshold.
    pub fn matches(&self, utterance: &str) -> bool {
        let matcher = SkimMatcherV2::default();
        let lowered = utterance.to_lowercase();
        self.matching_hotwords.iter().any(|hotword| {
            if lowered.contains(&hotword.to_lowercase()) {
                return true;
            }
            let score = matcher.fuzzy_match(&lowered, hotword).unwrap_or(0);
            if score >= MIN_MATCH_SCORE {
                debug!(hotword = %hotword, score, "fuzzy hotword match");
                true
            } else {
                false
            }
        })
    }
}
