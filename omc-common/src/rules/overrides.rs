//! Manually curated per-track exceptions
//!
//! An override forces a verdict for one (artist, title) pair and bypasses
//! every rule below it in the engine's chain. Only a takedown beats it.

use serde::{Deserialize, Serialize};

use crate::models::{ComplianceFailureReason, ComplianceStatus, Verdict};

/// Verdict forced by an override row (`resultOverride`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForcedResult {
    Ok,
    Potential,
    Disallowed,
}

impl ForcedResult {
    pub fn status(self) -> ComplianceStatus {
        match self {
            ForcedResult::Ok => ComplianceStatus::Ok,
            ForcedResult::Potential => ComplianceStatus::PotentiallyDisallowed,
            ForcedResult::Disallowed => ComplianceStatus::Disallowed,
        }
    }
}

/// Reason token accepted in `failureReasonOverride`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ForcedReason {
    Dmca,
    DisallowedArtist,
    DisallowedSource,
    DisallowedByRightsholder,
    FaTracksOnly,
}

impl From<ForcedReason> for ComplianceFailureReason {
    fn from(reason: ForcedReason) -> Self {
        match reason {
            ForcedReason::Dmca => ComplianceFailureReason::Dmca,
            ForcedReason::DisallowedArtist => ComplianceFailureReason::DisallowedArtist,
            ForcedReason::DisallowedSource => ComplianceFailureReason::DisallowedSource,
            ForcedReason::DisallowedByRightsholder => {
                ComplianceFailureReason::DisallowedByRightsholder
            }
            ForcedReason::FaTracksOnly => ComplianceFailureReason::FaTracksOnly,
        }
    }
}

/// How an override row selects titles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleMatch {
    /// Title equals the pattern, ignoring case
    EqualsIgnoreCase(String),
    /// Title contains the pattern, ignoring case
    Contains(String),
}

impl TitleMatch {
    fn matches(&self, title: &str) -> bool {
        match self {
            TitleMatch::EqualsIgnoreCase(expected) => title.to_lowercase() == expected.to_lowercase(),
            TitleMatch::Contains(fragment) => title
                .to_lowercase()
                .contains(&fragment.to_lowercase()),
        }
    }
}

/// One override row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideRule {
    pub artist: String,
    pub title_match: TitleMatch,
    pub forced_result: ForcedResult,
    pub forced_reason: Option<ComplianceFailureReason>,
    pub notes: Option<String>,
}

impl OverrideRule {
    pub fn new(artist: impl Into<String>, title_match: TitleMatch, forced_result: ForcedResult) -> Self {
        Self {
            artist: artist.into(),
            title_match,
            forced_result,
            forced_reason: None,
            notes: None,
        }
    }

    pub fn with_reason(mut self, reason: ComplianceFailureReason) -> Self {
        self.forced_reason = Some(reason);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn matches(&self, artist: &str, title: &str) -> bool {
        self.artist.to_lowercase() == artist.to_lowercase() && self.title_match.matches(title)
    }

    /// Verdict this row forces; reason notes default to the standard text
    pub fn verdict(&self) -> Verdict {
        Verdict::forced(
            self.forced_result.status(),
            self.forced_reason,
            self.notes.as_deref(),
        )
    }
}

// ========================================
// File Format
// ========================================

/// Override row as written in `overrides/edge-cases.json`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawOverride {
    artist: String,
    meta: RawOverrideMeta,
    result_override: ForcedResult,
    #[serde(default)]
    failure_reason_override: Option<ForcedReason>,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawOverrideMeta {
    title: RawTitleMatch,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawTitleMatch {
    #[serde(default)]
    equals_ignore_case: Option<String>,
    #[serde(default)]
    contains: Option<String>,
}

impl RawOverride {
    /// Validate the row; exactly one title matcher must be set
    pub(crate) fn into_rule(self) -> Result<OverrideRule, String> {
        let raw = self;
        let title_match = match (raw.meta.title.equals_ignore_case, raw.meta.title.contains) {
            (Some(expected), None) => TitleMatch::EqualsIgnoreCase(expected),
            (None, Some(fragment)) => TitleMatch::Contains(fragment),
            (Some(_), Some(_)) => {
                return Err(format!(
                    "override for '{}' sets both equalsIgnoreCase and contains",
                    raw.artist
                ))
            }
            (None, None) => {
                return Err(format!("override for '{}' has no title matcher", raw.artist))
            }
        };

        Ok(OverrideRule {
            artist: raw.artist,
            title_match,
            forced_result: raw.result_override,
            forced_reason: raw.failure_reason_override.map(Into::into),
            notes: raw.notes,
        })
    }
}

// ========================================
// Resolver
// ========================================

/// Ordered override table; the first matching row wins
#[derive(Debug, Clone, Default)]
pub struct OverrideResolver {
    rules: Vec<OverrideRule>,
}

impl OverrideResolver {
    pub fn new(rules: Vec<OverrideRule>) -> Self {
        Self { rules }
    }

    pub fn find(&self, artist: &str, title: &str) -> Option<&OverrideRule> {
        self.rules.iter().find(|rule| rule.matches(artist, title))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
