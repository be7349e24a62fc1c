use chrono::Utc;

use crate::aggregate::aggregate_team;
use crate::fbr_api::FbrClient;
use crate::http_client::Transport;
use crate::models::SeasonId;
use crate::pacing::{Pacer, Pause};
use crate::table::MatchTable;
use crate::teams::{TeamSource, default_sources, resolve_teams};

#[derive(Debug, Clone, Default)]
pub struct CollectSummary {
    pub started_at: String,
    pub finished_at: String,
    pub seasons_total: usize,
    pub seasons_with_teams: usize,
    pub teams_processed: usize,
    pub teams_with_rows: usize,
    pub teams_failed: usize,
    pub rows: usize,
    pub errors: Vec<String>,
}

pub struct Collector<T, P> {
    client: FbrClient<T, P>,
    sources: Vec<Box<dyn TeamSource<T, P>>>,
}

impl<T: Transport + 'static, P: Pacer + 'static> Collector<T, P> {
    pub fn new(client: FbrClient<T, P>) -> Self {
        Self {
            client,
            sources: default_sources(),
        }
    }
}

impl<T: Transport, P: Pacer> Collector<T, P> {
    pub fn with_sources(client: FbrClient<T, P>, sources: Vec<Box<dyn TeamSource<T, P>>>) -> Self {
        Self { client, sources }
    }

    pub fn client(&self) -> &FbrClient<T, P> {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut FbrClient<T, P> {
        &mut self.client
    }

    pub fn collect(&mut self, seasons: &[SeasonId]) -> MatchTable {
        self.collect_with_summary(seasons).0
    }

    /// Runs every season and team in order. Per-team failures are logged and
    /// skipped; only a missing API key ends the run early.
    pub fn collect_with_summary(&mut self, seasons: &[SeasonId]) -> (MatchTable, CollectSummary) {
        let mut summary = CollectSummary {
            started_at: Utc::now().to_rfc3339(),
            seasons_total: seasons.len(),
            ..CollectSummary::default()
        };

        if let Err(err) = self.client.ensure_api_key() {
            log::error!("Failed to generate API key: {err:#}");
            summary.errors.push(format!("api key: {err:#}"));
            summary.finished_at = Utc::now().to_rfc3339();
            return (MatchTable::default(), summary);
        }

        let mut tables = Vec::new();
        for season in seasons {
            log::info!("Processing season {season}...");
            let teams = resolve_teams(&self.client, &self.sources, season);
            if teams.is_empty() {
                log::warn!("No teams found for season {season}");
                continue;
            }
            summary.seasons_with_teams += 1;

            for (idx, team) in teams.iter().enumerate() {
                log::info!(
                    "Processing team {}/{}: {}",
                    idx + 1,
                    teams.len(),
                    team.team_name
                );
                summary.teams_processed += 1;
                match aggregate_team(&self.client, team, season) {
                    Ok(table) => {
                        if table.is_empty() {
                            log::info!("No data collected for {}", team.team_name);
                        } else {
                            log::info!("Added {} matches for {}", table.len(), team.team_name);
                            summary.teams_with_rows += 1;
                            tables.push(table);
                        }
                        self.client.pacer().pause(Pause::BetweenTeams);
                    }
                    Err(err) => {
                        log::error!("Error processing {}: {err:#}", team.team_name);
                        summary.teams_failed += 1;
                        summary
                            .errors
                            .push(format!("{season} {}: {err:#}", team.team_name));
                    }
                }
            }
        }

        let combined = if tables.is_empty() {
            log::warn!("No data collected");
            MatchTable::default()
        } else {
            log::info!("Combining data from {} team-seasons...", tables.len());
            MatchTable::concat(tables)
        };
        summary.rows = combined.len();
        summary.finished_at = Utc::now().to_rfc3339();
        (combined, summary)
    }
}
