use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::ShotStats;

pub const COLUMNS: &[&str] = &[
    "date",
    "time",
    "comp",
    "round",
    "venue",
    "result",
    "gf",
    "ga",
    "opponent",
    "formation",
    "referee",
    "match report",
    "notes",
    "sh",
    "sot",
    "dist",
    "fk",
    "pk",
    "pkatt",
    "season",
    "team",
];

pub const SHOOTING_COLUMNS: &[&str] = &["sh", "sot", "dist", "fk", "pk", "pkatt"];

/// One match from one team's perspective. Shooting fields are `None` when the
/// join found no stats for the row's date or the API sent `null`; so are the
/// goals of an unplayed fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRow {
    pub date: String,
    pub time: String,
    pub comp: String,
    pub round: String,
    pub venue: String,
    pub result: String,
    pub gf: Option<u32>,
    pub ga: Option<u32>,
    pub opponent: String,
    pub formation: String,
    pub referee: String,
    #[serde(rename = "match report")]
    pub match_report: String,
    pub notes: String,
    pub sh: Option<u32>,
    pub sot: Option<u32>,
    pub dist: Option<f64>,
    pub fk: Option<u32>,
    pub pk: Option<u32>,
    pub pkatt: Option<u32>,
    pub season: String,
    pub team: String,
}

impl MatchRow {
    pub fn set_shooting(&mut self, stats: Option<&ShotStats>) {
        self.sh = stats.and_then(|s| s.sh);
        self.sot = stats.and_then(|s| s.sot);
        self.dist = stats.and_then(|s| s.dist);
        self.fk = stats.and_then(|s| s.fk);
        self.pk = stats.and_then(|s| s.pk);
        self.pkatt = stats.and_then(|s| s.pkatt);
    }

    pub fn shooting_value(&self, column: &str) -> Option<f64> {
        match column {
            "sh" => self.sh.map(f64::from),
            "sot" => self.sot.map(f64::from),
            "dist" => self.dist,
            "fk" => self.fk.map(f64::from),
            "pk" => self.pk.map(f64::from),
            "pkatt" => self.pkatt.map(f64::from),
            _ => None,
        }
    }

    pub fn has_shooting(&self) -> bool {
        SHOOTING_COLUMNS
            .iter()
            .any(|c| self.shooting_value(c).is_some())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: &'static str,
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchTable {
    pub rows: Vec<MatchRow>,
}

impl MatchTable {
    pub fn new(rows: Vec<MatchRow>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn concat(tables: impl IntoIterator<Item = MatchTable>) -> MatchTable {
        let rows = tables
            .into_iter()
            .filter(|t| !t.is_empty())
            .flat_map(|t| t.rows)
            .collect();
        MatchTable { rows }
    }

    pub fn seasons(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.season.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn team_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.team.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// count/mean/min/max over the non-null values of each shooting column.
    pub fn shooting_summary(&self) -> Vec<ColumnSummary> {
        let mut out = Vec::new();
        for &column in SHOOTING_COLUMNS {
            let values: Vec<f64> = self
                .rows
                .iter()
                .filter_map(|r| r.shooting_value(column))
                .collect();
            if values.is_empty() {
                continue;
            }
            let count = values.len();
            let mean = values.iter().sum::<f64>() / count as f64;
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            out.push(ColumnSummary {
                column,
                count,
                mean,
                min,
                max,
            });
        }
        out
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let file =
            File::create(path).with_context(|| format!("create csv {}", path.display()))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        // Headers are written explicitly so an empty table still has them.
        writer.write_record(COLUMNS).context("write csv header")?;
        for row in &self.rows {
            writer.serialize(row).context("write csv row")?;
        }
        writer.flush().context("flush csv")?;
        Ok(())
    }

    pub fn read_csv(path: &Path) -> Result<MatchTable> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("open csv {}", path.display()))?;
        let mut rows = Vec::new();
        for (idx, row) in reader.deserialize::<MatchRow>().enumerate() {
            rows.push(row.with_context(|| format!("invalid csv row {}", idx + 1))?);
        }
        Ok(MatchTable { rows })
    }
}

pub fn read_csv_headers(path: &Path) -> Result<Vec<String>> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("open csv {}", path.display()))?;
    let headers = reader.headers().context("read csv header")?;
    Ok(headers.iter().map(|h| h.to_string()).collect())
}
