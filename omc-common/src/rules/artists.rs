//! Restricted-artist registry and name matching
//!
//! Two matching modes are used by the engine:
//!
//! - [`ArtistMatcher::match_field`] for a dedicated artist field, which may
//!   list collaborators ("A vs. B", "A feat. B", "A & B").
//! - [`ArtistMatcher::match_within_text`] for free-form title text, where
//!   remix and feat. credits appear inside parentheses.
//!
//! Single-word registry keys always need a word boundary on both sides, so
//! "NOMA" never matches inside "NOMANOA", "Binomaly" or "Tsunomaki Watame".
//! Boundaries are ASCII-only: kana, kanji and other non-ASCII letters next to
//! a key do not extend the word, so "NOMAの新曲" still credits NOMA.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Usage policy attached to a restricted artist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtistStatus {
    /// Allowed only when the track is individually licensed
    FaOnly,
    /// Needs manual review before use
    Potential,
    /// Never allowed absent an override
    Disallowed,
    /// Recognized by the matcher; carries no verdict in the engine
    Partial,
}

/// One registry row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestrictedArtistEntry {
    /// Canonical artist name as written in the registry
    pub key: String,
    pub status: ArtistStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RestrictedArtistEntry {
    pub fn new(key: impl Into<String>, status: ArtistStatus) -> Self {
        Self {
            key: key.into(),
            status,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

struct CompiledArtist {
    entry: RestrictedArtistEntry,
    lowered: String,
    multi_word: bool,
    boundary: Regex,
}

impl CompiledArtist {
    fn compile(entry: RestrictedArtistEntry) -> Result<Self> {
        let pattern = format!(r"(?i)(?-u:\b){}(?-u:\b)", regex::escape(&entry.key));
        let boundary = Regex::new(&pattern).map_err(|source| Error::Pattern {
            key: entry.key.clone(),
            source,
        })?;

        Ok(Self {
            lowered: entry.key.to_lowercase(),
            multi_word: entry.key.contains(' '),
            boundary,
            entry,
        })
    }
}

/// Precompiled matcher over the restricted-artist registry
///
/// Entries are scanned in registry order; the first hit wins.
pub struct ArtistMatcher {
    artists: Vec<CompiledArtist>,
}

impl ArtistMatcher {
    /// Compile one word-boundary pattern per registry entry
    pub fn new(entries: Vec<RestrictedArtistEntry>) -> Result<Self> {
        let artists = entries
            .into_iter()
            .map(CompiledArtist::compile)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { artists })
    }

    /// Match a dedicated artist field
    ///
    /// A field containing a space may list several artists, so each key is
    /// searched for on word boundaries. A field without a space must equal a
    /// key exactly (ignoring case).
    pub fn match_field(&self, field: &str) -> Option<&RestrictedArtistEntry> {
        if field.contains(' ') {
            self.artists
                .iter()
                .find(|artist| artist.boundary.is_match(field))
                .map(|artist| &artist.entry)
        } else {
            let lowered = field.to_lowercase();
            self.artists
                .iter()
                .find(|artist| artist.lowered == lowered)
                .map(|artist| &artist.entry)
        }
    }

    /// Scan free-form text (a title) for an embedded artist credit
    ///
    /// Multi-word keys match as plain substrings; single-word keys need word
    /// boundaries.
    pub fn match_within_text(&self, text: &str) -> Option<&RestrictedArtistEntry> {
        if text.is_empty() {
            return None;
        }

        let lowered = text.to_lowercase();
        self.artists
            .iter()
            .find(|artist| {
                if artist.multi_word {
                    lowered.contains(&artist.lowered)
                } else {
                    artist.boundary.is_match(text)
                }
            })
            .map(|artist| &artist.entry)
    }

    pub fn len(&self) -> usize {
        self.artists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artists.is_empty()
    }
}

impl std::fmt::Debug for ArtistMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtistMatcher")
            .field("artists", &self.artists.len())
            .finish()
    }
}
