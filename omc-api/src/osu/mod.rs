//! Upstream catalog access

pub mod client;
pub mod models;

use async_trait::async_trait;

pub use client::{FetchResult, OsuApiError, OsuClient};
pub use models::{OsuBeatmap, OsuBeatmapset};

/// Source of beatmap data for `/validate`
///
/// Implemented by [`OsuClient`]; tests substitute an in-memory stub.
#[async_trait]
pub trait BeatmapFetcher: Send + Sync {
    /// Look up beatmaps by id, reporting ids that could not be found
    async fn fetch_beatmaps(&self, ids: &[u64]) -> Result<FetchResult, OsuApiError>;
}
