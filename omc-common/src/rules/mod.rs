//! Rule tables consulted by the compliance engine
//!
//! A [`RuleSet`] is built once at startup and is read-only afterwards, so it
//! can be shared across request handlers behind an `Arc` without locking.

pub mod artists;
pub mod labels;
pub mod loader;
pub mod overrides;
pub mod sources;

use std::path::Path;
use tracing::info;

pub use artists::{ArtistMatcher, ArtistStatus, RestrictedArtistEntry};
pub use labels::{LabelCatalog, LabelFormat, LabelViolationDetector};
pub use overrides::{ForcedResult, OverrideResolver, OverrideRule, TitleMatch};
pub use sources::BannedSources;

use crate::Result;
use loader::RuleData;

/// Immutable bundle of every rule table
#[derive(Debug)]
pub struct RuleSet {
    artists: ArtistMatcher,
    overrides: OverrideResolver,
    banned_sources: BannedSources,
    labels: LabelViolationDetector,
}

impl RuleSet {
    pub fn new(data: RuleData) -> Result<Self> {
        Ok(Self {
            artists: ArtistMatcher::new(data.artists)?,
            overrides: OverrideResolver::new(data.overrides),
            banned_sources: BannedSources::new(data.banned_sources),
            labels: LabelViolationDetector::new(data.labels),
        })
    }

    /// Load and compile the rule tables under `root`
    pub fn load(root: &Path) -> Result<Self> {
        let rules = Self::new(loader::load_data_folder(root)?)?;

        info!(
            path = %root.display(),
            restricted_artists = rules.artists.len(),
            overrides = rules.overrides.len(),
            banned_sources = rules.banned_sources.len(),
            label_catalogs = rules.labels.catalogs().len(),
            "Rule data loaded"
        );

        Ok(rules)
    }

    pub fn artists(&self) -> &ArtistMatcher {
        &self.artists
    }

    pub fn overrides(&self) -> &OverrideResolver {
        &self.overrides
    }

    pub fn banned_sources(&self) -> &BannedSources {
        &self.banned_sources
    }

    pub fn labels(&self) -> &LabelViolationDetector {
        &self.labels
    }
}
