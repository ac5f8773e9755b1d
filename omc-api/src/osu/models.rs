//! Catalog API payloads and their normalization into track records
//!
//! Only the fields the compliance engine reads are modeled; everything else
//! in the upstream JSON is ignored.

use serde::{Deserialize, Deserializer};

use omc_common::{Availability, RankStatus, TrackMetadata, TrackRecord};

/// `GET /beatmaps` response body
#[derive(Debug, Clone, Deserialize)]
pub struct BeatmapsResponse {
    #[serde(default)]
    pub beatmaps: Vec<OsuBeatmap>,
}

/// One beatmap (difficulty) with its embedded beatmapset
#[derive(Debug, Clone, Deserialize)]
pub struct OsuBeatmap {
    pub id: u64,
    pub beatmapset_id: u64,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub beatmapset: Option<OsuBeatmapset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OsuBeatmapset {
    pub id: u64,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub source: Option<String>,
    /// Space-separated upstream; an array is accepted too
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    /// Name (`"ranked"`) or integer code
    #[serde(default)]
    pub status: Option<RankStatus>,
    /// Integer rank code; used when `status` is absent
    #[serde(default)]
    pub ranked: Option<i64>,
    #[serde(default)]
    pub availability: Option<OsuAvailability>,
    /// Featured Artist license id
    #[serde(default)]
    pub track_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OsuAvailability {
    #[serde(default)]
    pub download_disabled: bool,
    #[serde(default)]
    pub more_information: Option<String>,
}

/// Accept tags as a whitespace-delimited string or as an array of strings
pub fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tags {
        Joined(String),
        List(Vec<String>),
        Missing(()),
    }

    Ok(match Tags::deserialize(deserializer)? {
        Tags::Joined(joined) => split_tags(&joined),
        Tags::List(list) => list
            .into_iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect(),
        Tags::Missing(()) => Vec::new(),
    })
}

pub fn split_tags(joined: &str) -> Vec<String> {
    joined.split_whitespace().map(str::to_string).collect()
}

impl OsuBeatmapset {
    pub fn rank_status(&self) -> RankStatus {
        self.status
            .or_else(|| self.ranked.and_then(RankStatus::from_code))
            .unwrap_or_default()
    }

    pub fn to_metadata(&self) -> TrackMetadata {
        TrackMetadata {
            artist: self.artist.clone(),
            title: self.title.clone(),
            source: self.source.clone().filter(|s| !s.is_empty()),
            tags: self.tags.clone(),
            rank_status: self.rank_status(),
            license_track_id: self.track_id,
            availability: self.availability.as_ref().map(|a| Availability {
                download_disabled: a.download_disabled,
                takedown_notice: a.more_information.clone(),
            }),
        }
    }
}

impl OsuBeatmap {
    /// Normalize into the engine's record shape
    ///
    /// A beatmap without an embedded beatmapset yields a record with no
    /// metadata; aggregation skips such sets.
    pub fn into_record(self) -> TrackRecord {
        let set = self.beatmapset.as_ref();
        TrackRecord {
            id: self.id,
            set_id: self.beatmapset_id,
            owner_id: set.and_then(|s| s.user_id).or(self.user_id),
            owner_username: set.and_then(|s| s.creator.clone()),
            metadata: set.map(OsuBeatmapset::to_metadata),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn beatmap_json() -> serde_json::Value {
        json!({
            "id": 4074595,
            "beatmapset_id": 1,
            "user_id": 99,
            "mode": "osu",
            "beatmapset": {
                "id": 1,
                "artist": "Test Artist",
                "title": "Test Title",
                "creator": "Test Creator",
                "user_id": 1,
                "source": "",
                "tags": "  touhou  megarex\tfarm ",
                "status": "graveyard",
                "availability": { "download_disabled": false, "more_information": null },
                "track_id": null
            }
        })
    }

    #[test]
    fn test_normalizes_beatmap() {
        let beatmap: OsuBeatmap = serde_json::from_value(beatmap_json()).unwrap();
        let record = beatmap.into_record();

        assert_eq!(record.id, 4074595);
        assert_eq!(record.set_id, 1);
        assert_eq!(record.owner_id, Some(1));
        assert_eq!(record.owner_username.as_deref(), Some("Test Creator"));

        let metadata = record.metadata.unwrap();
        assert_eq!(metadata.tags, ["touhou", "megarex", "farm"]);
        assert_eq!(metadata.source, None);
        assert_eq!(metadata.rank_status, RankStatus::Graveyard);
        assert_eq!(metadata.license_track_id, None);
        assert!(!metadata.availability.unwrap().is_taken_down());
    }

    #[test]
    fn test_takedown_notice_is_carried() {
        let mut value = beatmap_json();
        value["beatmapset"]["availability"]["more_information"] =
            json!("https://example.com/takedown");
        let record = serde_json::from_value::<OsuBeatmap>(value).unwrap().into_record();
        assert!(record
            .metadata
            .unwrap()
            .availability
            .unwrap()
            .is_taken_down());
    }

    #[test]
    fn test_tags_array_and_integer_status() {
        let mut value = beatmap_json();
        value["beatmapset"]["tags"] = json!(["a", " b ", ""]);
        value["beatmapset"]["status"] = json!(4);
        value["beatmapset"]["track_id"] = json!(1234);
        let metadata = serde_json::from_value::<OsuBeatmap>(value)
            .unwrap()
            .into_record()
            .metadata
            .unwrap();
        assert_eq!(metadata.tags, ["a", "b"]);
        assert_eq!(metadata.rank_status, RankStatus::Loved);
        assert!(metadata.is_licensed());
    }

    #[test]
    fn test_ranked_code_fallback() {
        let mut value = beatmap_json();
        value["beatmapset"].as_object_mut().unwrap().remove("status");
        value["beatmapset"]["ranked"] = json!(1);
        let set: OsuBeatmapset = serde_json::from_value(value["beatmapset"].clone()).unwrap();
        assert_eq!(set.rank_status(), RankStatus::Ranked);
    }

    #[test]
    fn test_missing_beatmapset_has_no_metadata() {
        let beatmap: OsuBeatmap =
            serde_json::from_value(json!({ "id": 5, "beatmapset_id": 2, "user_id": 3 })).unwrap();
        let record = beatmap.into_record();
        assert!(record.metadata.is_none());
        assert_eq!(record.owner_id, Some(3));
    }

    #[test]
    fn test_null_tags() {
        let mut value = beatmap_json();
        value["beatmapset"]["tags"] = json!(null);
        let set: OsuBeatmapset = serde_json::from_value(value["beatmapset"].clone()).unwrap();
        assert!(set.tags.is_empty());
    }
}
