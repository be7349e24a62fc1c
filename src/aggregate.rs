use anyhow::{Context, Result};

use crate::fbr_api::FbrClient;
use crate::http_client::Transport;
use crate::models::{
    MatchRecord, SeasonId, ShootingRecord, ShotStats, TeamRecord, decode_matches, decode_shooting,
};
use crate::pacing::Pacer;
use crate::table::{MatchRow, MatchTable};

pub const COMPETITION: &str = "Premier League";

/// Fetches and joins one team's matches and shooting stats for a season.
/// A team without matches yields an empty table.
pub fn aggregate_team<T: Transport, P: Pacer>(
    client: &FbrClient<T, P>,
    team: &TeamRecord,
    season: &SeasonId,
) -> Result<MatchTable> {
    log::info!("Processing {} for {season}...", team.team_name);

    let match_items = client.team_matches(&team.team_id, season);
    if match_items.is_empty() {
        log::info!("No matches found for {} in {season}", team.team_name);
        return Ok(MatchTable::default());
    }
    let matches = decode_matches(&match_items)
        .with_context(|| format!("decode matches for {}", team.team_name))?;

    let stat_items = client.team_match_stats(&team.team_id, season);
    if stat_items.is_empty() {
        log::warn!("No match stats found for {} in {season}", team.team_name);
    }
    let shooting = decode_shooting(&stat_items)
        .with_context(|| format!("decode match stats for {}", team.team_name))?;

    let table = build_team_table(&matches, &shooting, team, season);
    log::info!("Processed {} matches for {}", table.len(), team.team_name);
    Ok(table)
}

/// Left-joins shooting stats onto the base rows by date.
///
/// A row whose date has no stats keeps null shooting fields, while a team
/// with no shooting stats at all gets zeros in every row.
pub fn build_team_table(
    matches: &[MatchRecord],
    shooting: &[ShootingRecord],
    team: &TeamRecord,
    season: &SeasonId,
) -> MatchTable {
    let mut rows = Vec::with_capacity(matches.len());
    for m in matches {
        let base = base_row(m, team, season);
        if shooting.is_empty() {
            let mut row = base;
            row.set_shooting(Some(&ShotStats::ZERO));
            rows.push(row);
            continue;
        }
        let mut hits = shooting.iter().filter(|s| s.date == m.date).peekable();
        if hits.peek().is_none() {
            let mut row = base;
            row.set_shooting(None);
            rows.push(row);
            continue;
        }
        for hit in hits {
            let mut row = base.clone();
            row.set_shooting(Some(&hit.stats));
            rows.push(row);
        }
    }

    if !shooting.is_empty() {
        log::info!("Merged shooting stats for {} matches", shooting.len());
    } else {
        log::info!("No shooting stats available, added zeroed columns");
    }

    rows.retain(|r| r.comp == COMPETITION);
    MatchTable::new(rows)
}

fn base_row(m: &MatchRecord, team: &TeamRecord, season: &SeasonId) -> MatchRow {
    MatchRow {
        date: m.date.clone(),
        time: m.time.clone(),
        comp: COMPETITION.to_string(),
        round: m.round.clone(),
        venue: m.venue().to_string(),
        result: m.result.clone(),
        gf: m.gf,
        ga: m.ga,
        opponent: m.opponent.clone(),
        formation: m.formation.clone(),
        referee: m.referee.clone(),
        match_report: String::new(),
        notes: String::new(),
        sh: None,
        sot: None,
        dist: None,
        fk: None,
        pk: None,
        pkatt: None,
        season: season.to_string(),
        team: team.team_name.clone(),
    }
}
