//! Shared helpers for omc-api integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response},
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use omc_api::osu::{BeatmapFetcher, FetchResult, OsuApiError, OsuBeatmap};
use omc_api::{build_router, AppState};
use omc_common::RuleSet;

/// In-memory catalog standing in for the osu! API
#[derive(Default)]
pub struct StubFetcher {
    beatmaps: Vec<OsuBeatmap>,
    fail_with: Option<u16>,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn new(beatmaps: Vec<Value>) -> Self {
        Self {
            beatmaps: beatmaps
                .into_iter()
                .map(|value| serde_json::from_value(value).expect("valid beatmap fixture"))
                .collect(),
            ..Default::default()
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_with: Some(status),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BeatmapFetcher for StubFetcher {
    async fn fetch_beatmaps(&self, ids: &[u64]) -> Result<FetchResult, OsuApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.fail_with {
            return Err(OsuApiError::ApiError(status, "stub failure".to_string()));
        }

        let mut result = FetchResult::default();
        for id in ids {
            match self.beatmaps.iter().find(|b| b.id == *id) {
                Some(beatmap) => result.beatmaps.push(beatmap.clone()),
                None => result.failures.push(*id),
            }
        }
        Ok(result)
    }
}

/// Beatmap fixture shaped like the upstream payload
pub fn beatmap(id: u64, set_id: u64, artist: &str, title: &str) -> Value {
    json!({
        "id": id,
        "beatmapset_id": set_id,
        "user_id": 1,
        "version": "Normal",
        "beatmapset": {
            "id": set_id,
            "artist": artist,
            "title": title,
            "creator": "Test Creator",
            "user_id": 1,
            "source": null,
            "tags": "",
            "status": "graveyard",
            "availability": { "download_disabled": false, "more_information": null },
            "track_id": null
        }
    })
}

pub fn rules() -> Arc<RuleSet> {
    let data = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../data");
    Arc::new(RuleSet::load(&data).expect("bundled rule data should load"))
}

pub fn setup_app(fetcher: Arc<StubFetcher>, api_secret: Option<&str>) -> axum::Router {
    let state = AppState::new(rules(), fetcher, api_secret.map(str::to_string), 10);
    build_router(state)
}

pub fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn extract_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}
