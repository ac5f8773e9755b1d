//! osu! API v2 client
//!
//! Client-credentials OAuth with a cached token, chunked beatmap lookups and
//! a minimum interval between upstream requests.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use omc_common::config::OsuSettings;

use super::models::{BeatmapsResponse, OsuBeatmap};
use super::BeatmapFetcher;

const USER_AGENT: &str = concat!("omc-api/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;
/// Refresh this long before the upstream expiry
const TOKEN_EXPIRY_MARGIN_SECS: u64 = 60;

/// Catalog client errors
#[derive(Debug, Error)]
pub enum OsuApiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Beatmaps found upstream plus the requested ids that were not
#[derive(Debug, Clone, Default)]
pub struct FetchResult {
    /// In request order
    pub beatmaps: Vec<OsuBeatmap>,
    /// In request order
    pub failures: Vec<u64>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    access_token: String,
    refresh_at: Instant,
}

/// Enforces a minimum interval between upstream requests
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// osu! API client
pub struct OsuClient {
    http_client: reqwest::Client,
    settings: OsuSettings,
    token: Mutex<Option<CachedToken>>,
    rate_limiter: Arc<RateLimiter>,
}

impl OsuClient {
    pub fn new(settings: OsuSettings) -> Result<Self, OsuApiError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| OsuApiError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            rate_limiter: Arc::new(RateLimiter::new(settings.request_interval_ms)),
            settings,
            token: Mutex::new(None),
        })
    }

    /// Current access token, requesting a new one when missing or near expiry
    async fn access_token(&self) -> Result<String, OsuApiError> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.access_token.clone());
            }
        }

        self.rate_limiter.wait().await;
        debug!(url = %self.settings.token_url, "Requesting access token");

        let response = self
            .http_client
            .post(&self.settings.token_url)
            .form(&[
                ("client_id", self.settings.client_id.as_str()),
                ("client_secret", self.settings.client_secret.as_str()),
                ("grant_type", "client_credentials"),
                ("scope", "public"),
            ])
            .send()
            .await
            .map_err(|e| OsuApiError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(OsuApiError::AuthError(format!("{}: {}", status.as_u16(), error_text)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| OsuApiError::ParseError(e.to_string()))?;

        let lifetime = Duration::from_secs(token.expires_in.saturating_sub(TOKEN_EXPIRY_MARGIN_SECS));
        info!(expires_in = token.expires_in, "Obtained osu! API access token");

        *cached = Some(CachedToken {
            access_token: token.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });

        Ok(token.access_token)
    }

    /// One upstream lookup for at most `chunk_size` ids
    async fn fetch_chunk(&self, ids: &[u64]) -> Result<Vec<OsuBeatmap>, OsuApiError> {
        let token = self.access_token().await?;
        self.rate_limiter.wait().await;

        let url = format!("{}/beatmaps", self.settings.api_base_url.trim_end_matches('/'));
        let query: Vec<(&str, u64)> = ids.iter().map(|id| ("ids[]", *id)).collect();

        debug!(url = %url, count = ids.len(), "Querying osu! API");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(token)
            .query(&query)
            .send()
            .await
            .map_err(|e| OsuApiError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            // Token revoked early; the next call fetches a fresh one
            *self.token.lock().await = None;
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(OsuApiError::ApiError(status.as_u16(), error_text));
        }

        let body: BeatmapsResponse = response
            .json()
            .await
            .map_err(|e| OsuApiError::ParseError(e.to_string()))?;

        Ok(body.beatmaps)
    }
}

#[async_trait]
impl BeatmapFetcher for OsuClient {
    /// Chunks are requested one after another; any upstream error aborts
    /// the whole fetch. Ids are expected to be unique.
    async fn fetch_beatmaps(&self, ids: &[u64]) -> Result<FetchResult, OsuApiError> {
        if ids.is_empty() {
            return Ok(FetchResult::default());
        }

        let mut found: HashMap<u64, OsuBeatmap> = HashMap::with_capacity(ids.len());
        for chunk in ids.chunks(self.settings.chunk_size.max(1)) {
            for beatmap in self.fetch_chunk(chunk).await? {
                found.insert(beatmap.id, beatmap);
            }
        }

        let mut result = FetchResult::default();
        for id in ids {
            match found.remove(id) {
                Some(beatmap) => result.beatmaps.push(beatmap),
                None => result.failures.push(*id),
            }
        }

        debug!(
            requested = ids.len(),
            found = result.beatmaps.len(),
            failures = result.failures.len(),
            "Beatmap fetch complete"
        );

        Ok(result)
    }
}
