//! Track records and compliance verdicts
//!
//! Records are normalized into these shapes at the ingestion boundary; the
//! engine never sees upstream API payloads directly.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

// ========================================
// Rank Status
// ========================================

/// Publication state of a set on the catalog
///
/// Deserializes from either the lowercase name (`"ranked"`) or the catalog's
/// integer code (`1`). Unknown values are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RankStatus {
    Graveyard,
    Wip,
    Pending,
    Ranked,
    Approved,
    Qualified,
    Loved,
}

impl RankStatus {
    /// Map the catalog's integer code (-2..=4) to a status
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            -2 => Some(RankStatus::Graveyard),
            -1 => Some(RankStatus::Wip),
            0 => Some(RankStatus::Pending),
            1 => Some(RankStatus::Ranked),
            2 => Some(RankStatus::Approved),
            3 => Some(RankStatus::Qualified),
            4 => Some(RankStatus::Loved),
            _ => None,
        }
    }

    /// Ranked, approved and loved sets are cleared for use regardless of artist
    pub fn is_approved(self) -> bool {
        matches!(
            self,
            RankStatus::Ranked | RankStatus::Approved | RankStatus::Loved
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RankStatus::Graveyard => "graveyard",
            RankStatus::Wip => "wip",
            RankStatus::Pending => "pending",
            RankStatus::Ranked => "ranked",
            RankStatus::Approved => "approved",
            RankStatus::Qualified => "qualified",
            RankStatus::Loved => "loved",
        }
    }
}

impl Default for RankStatus {
    fn default() -> Self {
        RankStatus::Graveyard
    }
}

impl fmt::Display for RankStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "graveyard" => Ok(RankStatus::Graveyard),
            "wip" => Ok(RankStatus::Wip),
            "pending" => Ok(RankStatus::Pending),
            "ranked" => Ok(RankStatus::Ranked),
            "approved" => Ok(RankStatus::Approved),
            "qualified" => Ok(RankStatus::Qualified),
            "loved" => Ok(RankStatus::Loved),
            other => Err(Error::InvalidInput(format!("Unknown rank status '{}'", other))),
        }
    }
}

impl<'de> Deserialize<'de> for RankStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Code(i64),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Code(code) => RankStatus::from_code(code)
                .ok_or_else(|| de::Error::custom(format!("Unknown rank status code {}", code))),
            Raw::Name(name) => name.parse().map_err(de::Error::custom),
        }
    }
}

// ========================================
// Track Records
// ========================================

/// Takedown information for a set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    /// Downloads have been disabled by the catalog
    #[serde(default)]
    pub download_disabled: bool,

    /// Free-text takedown notice; any value marks the set as taken down
    #[serde(default)]
    pub takedown_notice: Option<String>,
}

impl Availability {
    pub fn is_taken_down(&self) -> bool {
        self.download_disabled || self.takedown_notice.is_some()
    }
}

/// Set-level metadata evaluated by the compliance engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackMetadata {
    #[serde(default)]
    pub artist: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub source: Option<String>,

    /// Ordered, but treated as a set
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub rank_status: RankStatus,

    /// Featured Artist license id; positive values mean the track is licensed
    #[serde(default)]
    pub license_track_id: Option<i64>,

    /// Absent for metadata-only submissions
    #[serde(default)]
    pub availability: Option<Availability>,
}

impl TrackMetadata {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn is_licensed(&self) -> bool {
        is_licensed(self.license_track_id)
    }
}

/// A license id counts only when it is a positive integer
pub fn is_licensed(license_track_id: Option<i64>) -> bool {
    matches!(license_track_id, Some(id) if id > 0)
}

/// One track (difficulty) as submitted for validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub id: u64,
    pub set_id: u64,
    #[serde(default)]
    pub owner_id: Option<u64>,
    #[serde(default)]
    pub owner_username: Option<String>,
    /// `None` when the set-level metadata could not be resolved upstream
    #[serde(default)]
    pub metadata: Option<TrackMetadata>,
}

// ========================================
// Verdicts
// ========================================

/// Tri-state compliance outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceStatus {
    Ok,
    PotentiallyDisallowed,
    Disallowed,
}

/// Machine-readable reason attached to a non-OK verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceFailureReason {
    Dmca,
    DisallowedArtist,
    DisallowedSource,
    DisallowedByRightsholder,
    FaTracksOnly,
}

impl ComplianceFailureReason {
    /// Explanation used when no registry entry or override supplies one
    pub fn default_note(self) -> &'static str {
        match self {
            ComplianceFailureReason::Dmca => {
                "This set contains content which has been removed due to a DMCA takedown."
            }
            ComplianceFailureReason::DisallowedArtist => {
                "The artist has prohibited usage of their tracks."
            }
            ComplianceFailureReason::DisallowedSource => "The track is from a prohibited source.",
            ComplianceFailureReason::DisallowedByRightsholder => {
                "The rightsholder has prohibited use of this track."
            }
            ComplianceFailureReason::FaTracksOnly => {
                "This artist prohibits usage of tracks which are not licensed through the Featured Artist program."
            }
        }
    }
}

/// Engine output for one set
///
/// Constructed only through the associated functions so that a reason is
/// never attached to an OK verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    status: ComplianceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<ComplianceFailureReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

impl Verdict {
    pub fn ok() -> Self {
        Self {
            status: ComplianceStatus::Ok,
            reason: None,
            notes: None,
        }
    }

    /// DISALLOWED with a reason; `notes` falls back to the reason's default text
    pub fn disallowed(reason: ComplianceFailureReason, notes: Option<&str>) -> Self {
        Self {
            status: ComplianceStatus::Disallowed,
            reason: Some(reason),
            notes: Some(notes.unwrap_or(reason.default_note()).to_string()),
        }
    }

    /// Needs manual review; carries no reason code
    pub fn potentially_disallowed(notes: Option<&str>) -> Self {
        Self {
            status: ComplianceStatus::PotentiallyDisallowed,
            reason: None,
            notes: notes.map(str::to_string),
        }
    }

    /// Build a verdict from an explicit status, as forced by an override
    ///
    /// OK drops any reason and notes. Without a reason, notes are kept only
    /// when supplied.
    pub fn forced(
        status: ComplianceStatus,
        reason: Option<ComplianceFailureReason>,
        notes: Option<&str>,
    ) -> Self {
        match (status, reason) {
            (ComplianceStatus::Ok, _) => Self::ok(),
            (_, Some(reason)) => Self {
                status,
                reason: Some(reason),
                notes: Some(notes.unwrap_or(reason.default_note()).to_string()),
            },
            (_, None) => Self {
                status,
                reason: None,
                notes: notes.map(str::to_string),
            },
        }
    }

    pub fn status(&self) -> ComplianceStatus {
        self.status
    }

    pub fn reason(&self) -> Option<ComplianceFailureReason> {
        self.reason
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn is_ok(&self) -> bool {
        self.status == ComplianceStatus::Ok
    }
}

/// Aggregated verdict for one set, with display copies of its metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetVerdict {
    pub set_id: u64,
    /// Every submitted track id belonging to this set, in submission order
    pub track_ids: Vec<u64>,
    #[serde(flatten)]
    pub verdict: Verdict,
    pub artist: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_username: Option<String>,
}
