use std::fmt;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeasonId(String);

impl SeasonId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeasonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SeasonId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRecord {
    pub team_id: String,
    pub team_name: String,
}

impl TeamRecord {
    pub fn new(team_id: impl Into<String>, team_name: impl Into<String>) -> Self {
        Self {
            team_id: team_id.into(),
            team_name: team_name.into(),
        }
    }
}

/// One fixture from the `matches` endpoint, seen from the queried team's side.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MatchRecord {
    #[serde(deserialize_with = "de_text")]
    pub date: String,
    #[serde(default, deserialize_with = "de_text")]
    pub time: String,
    #[serde(default, deserialize_with = "de_text")]
    pub round: String,
    #[serde(default, deserialize_with = "de_text")]
    pub home_away: String,
    #[serde(default, deserialize_with = "de_text")]
    pub result: String,
    #[serde(default = "zero_count", deserialize_with = "de_count")]
    pub gf: Option<u32>,
    #[serde(default = "zero_count", deserialize_with = "de_count")]
    pub ga: Option<u32>,
    #[serde(default, deserialize_with = "de_text")]
    pub opponent: String,
    #[serde(default, deserialize_with = "de_text")]
    pub formation: String,
    #[serde(default, deserialize_with = "de_text")]
    pub referee: String,
}

impl MatchRecord {
    pub fn venue(&self) -> &'static str {
        if self.home_away == "Home" {
            "Home"
        } else {
            "Away"
        }
    }
}

/// A missing key reads as zero; an explicit `null` stays `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShotStats {
    pub sh: Option<u32>,
    pub sot: Option<u32>,
    pub dist: Option<f64>,
    pub fk: Option<u32>,
    pub pk: Option<u32>,
    pub pkatt: Option<u32>,
}

impl ShotStats {
    pub const ZERO: ShotStats = ShotStats {
        sh: Some(0),
        sot: Some(0),
        dist: Some(0.0),
        fk: Some(0),
        pk: Some(0),
        pkatt: Some(0),
    };
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShootingRecord {
    pub date: String,
    pub stats: ShotStats,
}

#[derive(Debug, Deserialize)]
struct RawTeamMatchStat {
    #[serde(default)]
    meta_data: Option<RawMeta>,
    #[serde(default)]
    stats: Option<RawStats>,
}

#[derive(Debug, Deserialize)]
struct RawMeta {
    #[serde(default, deserialize_with = "de_opt_text")]
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawStats {
    #[serde(default)]
    shooting: Option<RawShooting>,
    #[serde(default)]
    schedule: Option<RawSchedule>,
}

#[derive(Debug, Deserialize)]
struct RawShooting {
    #[serde(default = "zero_count", deserialize_with = "de_count")]
    sh: Option<u32>,
    #[serde(default = "zero_count", deserialize_with = "de_count")]
    sot: Option<u32>,
    #[serde(default = "zero_float", deserialize_with = "de_float")]
    avg_sh_dist: Option<f64>,
    #[serde(default = "zero_count", deserialize_with = "de_count")]
    fk_sh: Option<u32>,
    #[serde(default = "zero_count", deserialize_with = "de_count")]
    pk_made: Option<u32>,
}

// Penalty attempts live outside the shooting block.
#[derive(Debug, Deserialize)]
struct RawSchedule {
    #[serde(default = "zero_count", deserialize_with = "de_count")]
    pk_att: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct StandingsGroup {
    #[serde(default)]
    standings: Vec<Value>,
}

/// The `data` array of an API envelope; anything else reads as empty.
pub fn data_items(root: &Value) -> &[Value] {
    root.get("data")
        .and_then(|v| v.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

pub fn decode_matches(items: &[Value]) -> Result<Vec<MatchRecord>> {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            MatchRecord::deserialize(item).with_context(|| format!("invalid match entry {idx}"))
        })
        .collect()
}

/// Entries without a shooting block are skipped; the rest must carry a date.
pub fn decode_shooting(items: &[Value]) -> Result<Vec<ShootingRecord>> {
    let mut out = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        let raw = RawTeamMatchStat::deserialize(item)
            .with_context(|| format!("invalid team-match-stats entry {idx}"))?;
        let Some(stats) = raw.stats else {
            continue;
        };
        let Some(shooting) = stats.shooting else {
            continue;
        };
        let Some(date) = raw.meta_data.and_then(|m| m.date) else {
            bail!("team-match-stats entry {idx} has shooting stats but no meta_data.date");
        };
        out.push(ShootingRecord {
            date,
            stats: ShotStats {
                sh: shooting.sh,
                sot: shooting.sot,
                dist: shooting.avg_sh_dist,
                fk: shooting.fk_sh,
                pk: shooting.pk_made,
                pkatt: stats.schedule.map_or(Some(0), |s| s.pk_att),
            },
        });
    }
    Ok(out)
}

/// Flattens standings groups into teams. Malformed groups and rows without a
/// usable `team_id` are skipped one at a time.
pub fn decode_standings(items: &[Value]) -> Vec<TeamRecord> {
    let mut out = Vec::new();
    for item in items {
        let group = match StandingsGroup::deserialize(item) {
            Ok(group) => group,
            Err(err) => {
                log::warn!("skipping malformed standings group: {err}");
                continue;
            }
        };
        for row in &group.standings {
            let Some(team_id) = row.get("team_id").and_then(id_from_value) else {
                log::warn!("skipping standings row without team_id: {row}");
                continue;
            };
            let team_name = row.get("team_name").map(text_from_value).unwrap_or_default();
            out.push(TeamRecord::new(team_id, team_name));
        }
    }
    out
}

/// Distinct teams seen on either side of a list of fixtures. A repeated id
/// keeps its first position but takes the latest name.
pub fn teams_from_fixtures(items: &[Value]) -> Vec<TeamRecord> {
    let mut out: Vec<TeamRecord> = Vec::new();
    for item in items {
        for (id_key, name_key) in [("home_team_id", "home"), ("away_team_id", "away")] {
            let Some(team_id) = item.get(id_key).and_then(id_from_value) else {
                continue;
            };
            let Some(name) = item.get(name_key) else {
                continue;
            };
            let team_name = text_from_value(name);
            match out.iter_mut().find(|t| t.team_id == team_id) {
                Some(existing) => existing.team_name = team_name,
                None => out.push(TeamRecord::new(team_id, team_name)),
            }
        }
    }
    out
}

pub fn decode_season_ids(items: &[Value]) -> Vec<SeasonId> {
    items
        .iter()
        .filter_map(|item| item.get("season_id").and_then(id_from_value))
        .map(SeasonId::new)
        .collect()
}

fn id_from_value(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text_from_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

// Null and unparseable values are `None`, never zero.
fn count_from_value(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => n
            .as_u64()
            .map(|x| x.min(u32::MAX as u64) as u32)
            .or_else(|| n.as_f64().filter(|x| *x >= 0.0).map(|x| x.round() as u32)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|x| x.is_finite() && *x >= 0.0)
            .map(|x| x.round() as u32),
        _ => None,
    }
}

fn float_from_value(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|x| x.is_finite()),
        _ => None,
    }
}

fn zero_count() -> Option<u32> {
    Some(0)
}

fn zero_float() -> Option<f64> {
    Some(0.0)
}

fn de_text<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(text_from_value(&Value::deserialize(d)?))
}

fn de_opt_text<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<String>, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::Null => None,
        other => Some(text_from_value(&other)),
    })
}

fn de_count<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<u32>, D::Error> {
    Ok(count_from_value(&Value::deserialize(d)?))
}

fn de_float<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<f64>, D::Error> {
    Ok(float_from_value(&Value::deserialize(d)?))
}
