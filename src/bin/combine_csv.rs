use std::path::PathBuf;

use anyhow::Result;

use fbr_match_stats::combine::{DEFAULT_COMBINED_OUTPUT, DEFAULT_SEASON_DIRS, combine_dirs};
use fbr_match_stats::config::flag_value;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let out_path = flag_value(&args, "out")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_COMBINED_OUTPUT));
    let dirs = parse_dirs(&args);

    let combined = combine_dirs(&dirs)?;
    combined.write(&out_path)?;

    println!(
        "Combined {} rows ({} columns) into {}",
        combined.len(),
        combined.headers.len(),
        out_path.display()
    );
    Ok(())
}

fn parse_dirs(args: &[String]) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--out" {
            skip_next = true;
            continue;
        }
        if arg.starts_with("--") {
            continue;
        }
        dirs.push(PathBuf::from(arg));
    }
    if dirs.is_empty() {
        dirs.extend(DEFAULT_SEASON_DIRS.iter().map(PathBuf::from));
    }
    dirs
}
