//! Validation endpoints
//!
//! - `POST /validate`: beatmap ids, looked up upstream and evaluated per set
//! - `POST /validate/metadata`: caller-supplied metadata, evaluated as given

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

use omc_common::{
    ComplianceEngine, RankStatus, ResultAggregator, SetVerdict, TrackMetadata, TrackRecord,
    Verdict,
};

use crate::error::{ApiError, ApiResult};
use crate::osu::models::deserialize_tags;
use crate::osu::OsuBeatmap;
use crate::AppState;

/// `POST /validate` response
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub results: Vec<SetVerdict>,
    /// Requested ids the catalog did not return
    pub failures: Vec<u64>,
}

/// One item of a `POST /validate/metadata` request
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataItem {
    /// Missing artist or title only rules out matches that need them
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    pub status: RankStatus,
    #[serde(default)]
    pub track_id: Option<i64>,
}

impl From<MetadataItem> for TrackMetadata {
    fn from(item: MetadataItem) -> Self {
        TrackMetadata {
            artist: item.artist,
            title: item.title,
            source: item.source.filter(|s| !s.is_empty()),
            tags: item.tags,
            rank_status: item.status,
            license_track_id: item.track_id,
            availability: None,
        }
    }
}

/// `POST /validate/metadata` response, one verdict per item in request order
#[derive(Debug, Serialize)]
pub struct MetadataResponse {
    pub results: Vec<Verdict>,
}

/// POST /validate
pub async fn validate_beatmaps(
    State(state): State<AppState>,
    payload: Result<Json<Vec<u64>>, JsonRejection>,
) -> ApiResult<Json<ValidateResponse>> {
    let Json(requested) = payload?;
    let ids = dedup_ids(requested);

    if ids.len() > state.max_ids_per_request {
        return Err(ApiError::BadRequest(format!(
            "Too many ids: {} (limit {})",
            ids.len(),
            state.max_ids_per_request
        )));
    }

    if ids.is_empty() {
        return Ok(Json(ValidateResponse {
            results: Vec::new(),
            failures: Vec::new(),
        }));
    }

    let fetched = state.fetcher.fetch_beatmaps(&ids).await?;
    let records: Vec<TrackRecord> = fetched
        .beatmaps
        .into_iter()
        .map(OsuBeatmap::into_record)
        .collect();

    let engine = ComplianceEngine::new(&state.rules);
    let results = ResultAggregator::new(engine).aggregate(&records);

    info!(
        requested = ids.len(),
        sets = results.len(),
        failures = fetched.failures.len(),
        "Validated beatmaps"
    );

    Ok(Json(ValidateResponse {
        results,
        failures: fetched.failures,
    }))
}

/// POST /validate/metadata
pub async fn validate_metadata(
    State(state): State<AppState>,
    payload: Result<Json<Vec<MetadataItem>>, JsonRejection>,
) -> ApiResult<Json<MetadataResponse>> {
    let Json(items) = payload?;

    if items.len() > state.max_ids_per_request {
        return Err(ApiError::BadRequest(format!(
            "Too many items: {} (limit {})",
            items.len(),
            state.max_ids_per_request
        )));
    }

    let engine = ComplianceEngine::new(&state.rules);
    let results: Vec<Verdict> = items
        .into_iter()
        .map(|item| engine.evaluate_standalone(&item.into()))
        .collect();

    debug!(count = results.len(), "Validated metadata items");

    Ok(Json(MetadataResponse { results }))
}

/// Drop repeated ids, keeping the first occurrence
fn dedup_ids(ids: Vec<u64>) -> Vec<u64> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
