use std::path::PathBuf;

use anyhow::{Context, Result};

use fbr_match_stats::collect::Collector;
use fbr_match_stats::config::{self, DEFAULT_OUTPUT, Settings};
use fbr_match_stats::fbr_api::FbrClient;
use fbr_match_stats::http_client::HttpTransport;
use fbr_match_stats::pacing::SleepPacer;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut settings = Settings::from_env();
    if let Some(raw) = config::flag_value(&args, "seasons") {
        let seasons = config::parse_seasons(&raw);
        if !seasons.is_empty() {
            settings.seasons = seasons;
        }
    }
    let out_path = config::flag_value(&args, "out")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let transport = HttpTransport::new(settings.timeout)?;
    let pacer = SleepPacer::new(settings.schedule);
    let client = FbrClient::new(transport, pacer, &settings);
    let mut collector = Collector::new(client);

    if config::has_flag(&args, "list-seasons") {
        collector
            .client_mut()
            .ensure_api_key()
            .context("unable to obtain api key")?;
        let seasons = collector.client().available_seasons();
        println!("Seasons available for league {}:", settings.league_id);
        for season in seasons {
            println!(" - {season}");
        }
        return Ok(());
    }

    let labels = settings
        .seasons
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>();
    println!("Scraping seasons: {}", labels.join(", "));

    let (table, summary) = collector.collect_with_summary(&settings.seasons);

    if table.is_empty() {
        println!("No data was collected.");
        println!();
        println!("Troubleshooting suggestions:");
        println!("1. The FBR API might be experiencing server issues");
        println!("2. Try running the script later");
        println!("3. Check the seasons against --list-seasons");
        if !summary.errors.is_empty() {
            println!("Errors: {}", summary.errors.len());
            for err in summary.errors.iter().take(8) {
                println!(" - {err}");
            }
        }
        return Ok(());
    }

    println!();
    println!("Collected {} matches", table.len());
    println!("Seasons covered: {:?}", table.seasons());
    println!("Teams covered: {}", table.team_count());
    println!(
        "Teams: {}/{} with rows, {} failed",
        summary.teams_with_rows, summary.teams_processed, summary.teams_failed
    );
    println!("Run: {} -> {}", summary.started_at, summary.finished_at);

    let shooting = table.shooting_summary();
    if !shooting.is_empty() {
        println!();
        println!("Shooting stats summary:");
        println!(
            "{:<6} {:>6} {:>8} {:>8} {:>8}",
            "col", "count", "mean", "min", "max"
        );
        for col in shooting {
            println!(
                "{:<6} {:>6} {:>8.2} {:>8.2} {:>8.2}",
                col.column, col.count, col.mean, col.min, col.max
            );
        }
    }

    table.write_csv(&out_path)?;
    println!();
    println!("Data saved to {}", out_path.display());
    Ok(())
}
