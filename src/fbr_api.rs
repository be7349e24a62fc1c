use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use crate::config::Settings;
use crate::http_client::{Reply, Transport};
use crate::models::{SeasonId, decode_season_ids, data_items};
use crate::pacing::{Pacer, Pause};

pub const FBR_BASE_URL: &str = "https://fbrapi.com";
pub const PREMIER_LEAGUE_ID: u32 = 9;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const STANDINGS_MAX_ATTEMPTS: u32 = 2;

const API_KEY_HEADER: &str = "X-API-Key";
const GENERATE_KEY_ENDPOINT: &str = "generate_api_key";

#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep keys out of debug logs.
impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(..)")
    }
}

#[derive(Debug, Deserialize)]
struct GeneratedKey {
    api_key: String,
}

/// Client for the FBR stats API. Every attempt is preceded by a
/// `Pause::PreRequest`; failed attempts back off with `Pause::Backoff`
/// while attempts remain. Exhausted retries read as `None`.
pub struct FbrClient<T, P> {
    transport: T,
    pacer: P,
    base_url: String,
    league_id: u32,
    max_attempts: u32,
    api_key: Option<ApiKey>,
}

impl<T: Transport, P: Pacer> FbrClient<T, P> {
    pub fn new(transport: T, pacer: P, settings: &Settings) -> Self {
        Self {
            transport,
            pacer,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            league_id: settings.league_id,
            max_attempts: settings.max_attempts.max(1),
            api_key: settings.api_key.clone(),
        }
    }

    pub fn with_api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }

    pub fn api_key(&self) -> Option<&ApiKey> {
        self.api_key.as_ref()
    }

    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    /// Requests a fresh key from the API and stores it, replacing any
    /// existing one.
    pub fn refresh_api_key(&mut self) -> Result<&ApiKey> {
        let url = format!("{}/{}", self.base_url, GENERATE_KEY_ENDPOINT);
        let reply = self
            .transport
            .post(&url)
            .context("api key request failed")?;
        if !reply.status.is_success() {
            return Err(anyhow!("api key request returned http {}", reply.status));
        }
        let generated: GeneratedKey =
            serde_json::from_str(reply.body.trim()).context("invalid api key response")?;
        log::info!("API key generated");
        Ok(&*self.api_key.insert(ApiKey::new(generated.api_key)))
    }

    pub fn ensure_api_key(&mut self) -> Result<&ApiKey> {
        if self.api_key.is_none() {
            log::info!("Generating API key...");
            self.refresh_api_key()?;
        }
        self.api_key
            .as_ref()
            .ok_or_else(|| anyhow!("api key missing after refresh"))
    }

    pub fn request(&self, endpoint: &str, params: &[(&str, String)]) -> Option<Value> {
        self.request_with_attempts(endpoint, params, self.max_attempts)
    }

    pub fn request_with_attempts(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        max_attempts: u32,
    ) -> Option<Value> {
        let Some(key) = self.api_key.as_ref() else {
            log::warn!("no API key available, skipping request to {endpoint}");
            return None;
        };
        let url = format!("{}/{}", self.base_url, endpoint);
        let headers = [(API_KEY_HEADER, key.as_str())];
        let max_attempts = max_attempts.max(1);

        for attempt in 1..=max_attempts {
            log::info!("Making request to {endpoint} (attempt {attempt}/{max_attempts})");
            self.pacer.pause(Pause::PreRequest);

            match self.attempt(&url, &headers, params) {
                Ok(data) => {
                    log::info!("Successfully got data from {endpoint}");
                    return Some(data);
                }
                Err(err) => {
                    log::warn!("Error on attempt {attempt} for {endpoint}: {err:#}");
                    if attempt < max_attempts {
                        self.pacer.pause(Pause::Backoff);
                    }
                }
            }
        }

        log::warn!("All {max_attempts} attempts failed for {endpoint}");
        None
    }

    fn attempt(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        params: &[(&str, String)],
    ) -> Result<Value> {
        let reply = self.transport.get(url, headers, params)?;
        check_status(&reply)?;
        serde_json::from_str(reply.body.trim()).context("invalid json body")
    }

    pub fn league_params(&self) -> Vec<(&'static str, String)> {
        vec![("league_id", self.league_id.to_string())]
    }

    pub fn season_params(&self, season: &SeasonId) -> Vec<(&'static str, String)> {
        vec![
            ("league_id", self.league_id.to_string()),
            ("season_id", season.to_string()),
        ]
    }

    pub fn team_season_params(
        &self,
        team_id: &str,
        season: &SeasonId,
    ) -> Vec<(&'static str, String)> {
        vec![
            ("team_id", team_id.to_string()),
            ("league_id", self.league_id.to_string()),
            ("season_id", season.to_string()),
        ]
    }

    pub fn available_seasons(&self) -> Vec<SeasonId> {
        self.request("league-seasons", &self.league_params())
            .map(|data| decode_season_ids(data_items(&data)))
            .unwrap_or_default()
    }

    pub fn team_matches(&self, team_id: &str, season: &SeasonId) -> Vec<Value> {
        log::info!("Getting matches for team {team_id} in {season}");
        let items = self
            .request("matches", &self.team_season_params(team_id, season))
            .map(|data| data_items(&data).to_vec())
            .unwrap_or_default();
        if !items.is_empty() {
            log::info!("Found {} matches", items.len());
        }
        items
    }

    pub fn team_match_stats(&self, team_id: &str, season: &SeasonId) -> Vec<Value> {
        log::info!("Getting match stats for team {team_id} in {season}");
        let items = self
            .request("team-match-stats", &self.team_season_params(team_id, season))
            .map(|data| data_items(&data).to_vec())
            .unwrap_or_default();
        if !items.is_empty() {
            log::info!("Found stats for {} matches", items.len());
        }
        items
    }
}

fn check_status(reply: &Reply) -> Result<()> {
    if reply.status == StatusCode::INTERNAL_SERVER_ERROR {
        return Err(anyhow!("server error (500)"));
    }
    if !reply.status.is_success() {
        return Err(anyhow!("http {}: {}", reply.status, reply.body.trim()));
    }
    Ok(())
}
