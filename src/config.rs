use std::time::Duration;

use crate::fbr_api::{ApiKey, DEFAULT_MAX_ATTEMPTS, FBR_BASE_URL, PREMIER_LEAGUE_ID};
use crate::http_client::REQUEST_TIMEOUT_SECS;
use crate::models::SeasonId;
use crate::pacing::{BACKOFF_SECS, BETWEEN_TEAMS_SECS, PRE_REQUEST_SECS, Schedule};

pub const DEFAULT_SEASONS: &[&str] = &["2023-2024", "2024-2025"];
pub const DEFAULT_OUTPUT: &str = "matches_2023_2025.csv";

#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub league_id: u32,
    pub api_key: Option<ApiKey>,
    pub seasons: Vec<SeasonId>,
    pub max_attempts: u32,
    pub timeout: Duration,
    pub schedule: Schedule,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: FBR_BASE_URL.to_string(),
            league_id: PREMIER_LEAGUE_ID,
            api_key: None,
            seasons: DEFAULT_SEASONS.iter().copied().map(SeasonId::from).collect(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            schedule: Schedule::default(),
        }
    }
}

impl Settings {
    /// Loads `.env.local` and `.env` (if present) and reads `FBR_*` overrides.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let secs = |key: &str, default: u64| {
            Duration::from_secs(
                get(key)
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .unwrap_or(default),
            )
        };

        let mut out = Self::default();
        if let Some(url) = get("FBR_BASE_URL") {
            out.base_url = url.trim().to_string();
        }
        if let Some(id) = get("FBR_LEAGUE_ID").and_then(|v| v.trim().parse::<u32>().ok()) {
            out.league_id = id;
        }
        out.api_key = get("FBR_API_KEY").map(|k| ApiKey::new(k.trim()));
        if let Some(raw) = get("FBR_SEASONS") {
            let seasons = parse_seasons(&raw);
            if !seasons.is_empty() {
                out.seasons = seasons;
            }
        }
        if let Some(n) = get("FBR_MAX_ATTEMPTS")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|n| *n > 0)
        {
            out.max_attempts = n;
        }
        out.timeout = secs("FBR_TIMEOUT_SECS", REQUEST_TIMEOUT_SECS);
        out.schedule = Schedule {
            pre_request: secs("FBR_PRE_REQUEST_SECS", PRE_REQUEST_SECS),
            backoff: secs("FBR_BACKOFF_SECS", BACKOFF_SECS),
            between_teams: secs("FBR_TEAM_DELAY_SECS", BETWEEN_TEAMS_SECS),
        };
        out
    }
}

pub fn parse_seasons(raw: &str) -> Vec<SeasonId> {
    let mut out: Vec<SeasonId> = Vec::new();
    for part in raw.split([',', ';', ' ']) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let season = SeasonId::from(part);
        if !out.contains(&season) {
            out.push(season);
        }
    }
    out
}

/// Value of `--name=value` or `--name value` in `args`.
pub fn flag_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("--{name}=");
    let bare = format!("--{name}");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if *arg == bare
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

pub fn has_flag(args: &[String], name: &str) -> bool {
    let bare = format!("--{name}");
    args.iter().any(|a| *a == bare)
}
