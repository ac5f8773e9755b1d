//! Compliance verdicts for a single set
//!
//! Rules are checked in a fixed order and the first rule that yields a
//! verdict decides:
//!
//! 1. Takedown (only when availability data is present)
//! 2. Manual override
//! 3. Featured Artist license or ranked/approved/loved status
//! 4. Banned tag
//! 5. Banned source
//! 6. Label catalog
//! 7. Restricted artist in the artist field
//! 8. Restricted artist credited in the title
//!
//! Anything that reaches the end is OK.

use tracing::debug;

use crate::models::{ComplianceFailureReason, TrackMetadata, Verdict};
use crate::rules::{ArtistStatus, RestrictedArtistEntry, RuleSet};

/// Evaluates metadata against a borrowed [`RuleSet`]
///
/// Holds no state of its own; evaluation is pure and performs no I/O.
#[derive(Debug, Clone, Copy)]
pub struct ComplianceEngine<'a> {
    rules: &'a RuleSet,
}

impl<'a> ComplianceEngine<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules }
    }

    /// Full evaluation, including the takedown check
    pub fn evaluate(&self, metadata: &TrackMetadata) -> Verdict {
        if let Some(availability) = &metadata.availability {
            if availability.is_taken_down() {
                debug!(artist = %metadata.artist, title = %metadata.title, "Set taken down");
                return Verdict::disallowed(ComplianceFailureReason::Dmca, None);
            }
        }

        self.evaluate_standalone(metadata)
    }

    /// Evaluation for callers without availability data
    ///
    /// Identical to [`evaluate`](Self::evaluate) minus the takedown check;
    /// any `availability` on the input is ignored.
    pub fn evaluate_standalone(&self, metadata: &TrackMetadata) -> Verdict {
        let artist = metadata.artist.as_str();
        let title = metadata.title.as_str();

        if let Some(rule) = self.rules.overrides().find(artist, title) {
            debug!(artist, title, result = ?rule.forced_result, "Override matched");
            return rule.verdict();
        }

        if metadata.is_licensed() || metadata.rank_status.is_approved() {
            return Verdict::ok();
        }

        let banned = self.rules.banned_sources();
        if let Some(token) = metadata.tags.iter().find_map(|tag| banned.tag_matches(tag)) {
            debug!(artist, title, token, "Banned tag");
            return Verdict::disallowed(ComplianceFailureReason::DisallowedSource, None);
        }

        if let Some(token) = metadata
            .source
            .as_deref()
            .and_then(|source| banned.source_matches(source))
        {
            debug!(artist, title, token, "Banned source");
            return Verdict::disallowed(ComplianceFailureReason::DisallowedSource, None);
        }

        if let Some(catalog) = self.rules.labels().find_catalog(artist, title) {
            debug!(artist, title, catalog = catalog.name(), "Label catalog match");
            return Verdict::disallowed(ComplianceFailureReason::DisallowedByRightsholder, None);
        }

        let matcher = self.rules.artists();
        if let Some(verdict) = matcher.match_field(artist).and_then(artist_verdict) {
            return verdict;
        }

        if let Some(verdict) = matcher.match_within_text(title).and_then(artist_verdict) {
            return verdict;
        }

        Verdict::ok()
    }
}

/// Map a registry hit to a verdict; `partial` entries yield none
fn artist_verdict(entry: &RestrictedArtistEntry) -> Option<Verdict> {
    let notes = entry.notes.as_deref();
    let verdict = match entry.status {
        ArtistStatus::FaOnly => Verdict::disallowed(ComplianceFailureReason::FaTracksOnly, notes),
        ArtistStatus::Potential => Verdict::potentially_disallowed(notes),
        ArtistStatus::Disallowed => {
            Verdict::disallowed(ComplianceFailureReason::DisallowedArtist, notes)
        }
        ArtistStatus::Partial => {
            debug!(artist = %entry.key, "Partial artist entry carries no verdict");
            return None;
        }
    };

    debug!(artist = %entry.key, status = ?entry.status, "Restricted artist");
    Some(verdict)
}
