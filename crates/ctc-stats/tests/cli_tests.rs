// Integration tests for the command-line front end.
//
// Each test writes a stats.toml pointing at the core crate's CSV fixtures,
// loads it through the config module, and runs parsed commands against the
// resulting engine.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use ctc_stats::cli::{self, Cli};
use ctc_stats::config;
use ctc_stats_core::{StatsEngine, StatsError};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../ctc-stats-core/tests/fixtures")
}

/// Write a config into a scratch dir and return its path.
fn write_config(name: &str, extra: &str) -> PathBuf {
    let tmp = std::env::temp_dir().join(name);
    let _ = fs::remove_dir_all(&tmp);
    fs::create_dir_all(&tmp).unwrap();
    let text = format!(
        "[data]\ndir = {:?}\ndefault_division = \"3\"\ndivisions = [\"1_2\", \"3\", \"4\"]\n{extra}",
        fixtures_dir().display().to_string()
    );
    let path = tmp.join("stats.toml");
    fs::write(&path, text).unwrap();
    path
}

fn run(config_path: &PathBuf, args: &[&str]) -> anyhow::Result<String> {
    let cli = Cli::try_parse_from(std::iter::once("ctc-stats").chain(args.iter().copied()))?;
    let config = config::load_config_file(config_path)?;
    let engine = StatsEngine::new(config.provider(&std::env::temp_dir()))
        .with_ranking_defaults(config.ranking_defaults());
    let division = cli
        .division
        .clone()
        .unwrap_or_else(|| config.data.default_division.clone());

    let mut out = Vec::new();
    cli::run(&cli.command, &engine, &division, cli.json, &mut out)?;
    Ok(String::from_utf8(out)?)
}

#[test]
fn default_division_comes_from_config() {
    let path = write_config("ctc_cli_default_division", "");
    let out = run(&path, &["list", "team"]).unwrap();
    assert_eq!(out, "koopa kartel\nshroom squad\n");
}

#[test]
fn division_flag_overrides_config() {
    let path = write_config("ctc_cli_division_flag", "");
    let out = run(&path, &["--division", "1_2", "player", "MARIO"]).unwrap();
    assert_eq!(out, "Mario (Alpha) - 76.0 pts per war (3 races)\n");
}

#[test]
fn team_average_line() {
    let path = write_config("ctc_cli_team", "");
    let out = run(&path, &["team", "Koopa Kartel", "Rainbow Road"]).unwrap();
    assert_eq!(
        out,
        "Koopa Kartel - Rainbow Road - 31.9 pts per race (3 races)\n"
    );
}

#[test]
fn configured_track_limit_applies() {
    let path = write_config("ctc_cli_track_limit", "\n[ranking]\ntrack_limit = 2\n");
    let out = run(&path, &["top-team-tracks", "Koopa Kartel"]).unwrap();
    assert_eq!(
        out,
        "Koopa Cape - 39.3 pts (3 races)\nMute City - 37.0 pts (2 races)\n"
    );
}

#[test]
fn configured_roster_threshold_applies() {
    let path = write_config("ctc_cli_roster", "\n[ranking]\nroster_min_races = 10\n");
    let out = run(&path, &["team-players", "Shroom Squad"]).unwrap();
    assert_eq!(out, "Peach - 73.2 pts (10 races)\n");
}

#[test]
fn track_teams_json() {
    let path = write_config("ctc_cli_json", "");
    let out = run(&path, &["--json", "track-teams", "koopa cape"]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 2);
    assert_eq!(value[0]["name"], "Koopa Kartel");
    assert_eq!(value[0]["sample_count"], 3);
}

#[test]
fn corrupt_division_surfaces_integrity_error() {
    let path = write_config("ctc_cli_corrupt", "");
    let err = run(&path, &["-d", "4", "track-players", "Rainbow Road"]).unwrap_err();
    let stats = err.downcast_ref::<StatsError>().expect("StatsError");
    assert!(!stats.is_validation());
    assert!(stats.to_string().contains("score"));
}

#[test]
fn unknown_track_lists_catalog() {
    let path = write_config("ctc_cli_unknown_track", "");
    let err = run(&path, &["track-players", "Baby Park"]).unwrap_err();
    let stats = err.downcast_ref::<StatsError>().expect("StatsError");
    assert_eq!(
        stats.valid_values().unwrap(),
        &["dk jungle", "koopa cape", "mute city", "rainbow road"]
    );
}
