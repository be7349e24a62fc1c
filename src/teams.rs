use crate::fbr_api::{FbrClient, STANDINGS_MAX_ATTEMPTS};
use crate::http_client::Transport;
use crate::models::{SeasonId, TeamRecord, data_items, decode_standings, teams_from_fixtures};
use crate::pacing::Pacer;

/// One way of discovering the teams that played in a season.
pub trait TeamSource<T, P> {
    fn name(&self) -> &'static str;

    fn teams(&self, client: &FbrClient<T, P>, season: &SeasonId) -> Vec<TeamRecord>;
}

/// Flattens every standings group of `league-standings`.
pub struct StandingsSource;

impl<T: Transport, P: Pacer> TeamSource<T, P> for StandingsSource {
    fn name(&self) -> &'static str {
        "league-standings"
    }

    fn teams(&self, client: &FbrClient<T, P>, season: &SeasonId) -> Vec<TeamRecord> {
        client
            .request_with_attempts(
                "league-standings",
                &client.season_params(season),
                STANDINGS_MAX_ATTEMPTS,
            )
            .map(|data| decode_standings(data_items(&data)))
            .unwrap_or_default()
    }
}

/// Derives teams from the home/away sides of every fixture in the season.
pub struct MatchScanSource;

impl<T: Transport, P: Pacer> TeamSource<T, P> for MatchScanSource {
    fn name(&self) -> &'static str {
        "matches"
    }

    fn teams(&self, client: &FbrClient<T, P>, season: &SeasonId) -> Vec<TeamRecord> {
        client
            .request("matches", &client.season_params(season))
            .map(|data| teams_from_fixtures(data_items(&data)))
            .unwrap_or_default()
    }
}

pub fn default_sources<T, P>() -> Vec<Box<dyn TeamSource<T, P>>>
where
    T: Transport + 'static,
    P: Pacer + 'static,
{
    vec![Box::new(StandingsSource), Box::new(MatchScanSource)]
}

/// Tries each source in order and returns the first non-empty team list.
pub fn resolve_teams<T: Transport, P: Pacer>(
    client: &FbrClient<T, P>,
    sources: &[Box<dyn TeamSource<T, P>>],
    season: &SeasonId,
) -> Vec<TeamRecord> {
    log::info!("Getting teams for season {season}");
    for source in sources {
        let teams = source.teams(client, season);
        if !teams.is_empty() {
            log::info!("Found {} teams for {season} via {}", teams.len(), source.name());
            return teams;
        }
        log::warn!("{} returned no teams for {season}", source.name());
    }
    Vec::new()
}
