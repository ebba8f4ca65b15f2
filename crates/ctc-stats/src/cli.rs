// Command-line surface: argument definitions and query dispatch.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ctc_stats_core::ranking::render;
use ctc_stats_core::{AggregateResult, DatasetProvider, RankedEntry, StatsEngine};
use serde::Serialize;

/// Per-race averages and rankings for a racing league.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: config/stats.toml under the working directory).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Division to query, e.g. "1_2" (default: data.default_division).
    #[arg(short, long, global = true)]
    pub division: Option<String>,

    /// Print results as JSON instead of text lines.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the distinct players, teams, or tracks in a division.
    List {
        /// One of "player", "team", "track".
        dimension: String,
        /// Keep the ingested casing instead of lower-casing.
        #[arg(long)]
        display: bool,
    },

    /// A player's season average (points per war) or track average.
    Player {
        name: String,
        /// Restrict to one track (points per race).
        #[arg(long)]
        track: Option<String>,
        /// Count only races played for this team.
        #[arg(long)]
        team: Option<String>,
    },

    /// A team's points per race on one track.
    Team { name: String, track: String },

    /// A player's best tracks.
    TopTracks {
        player: String,
        #[arg(long)]
        min_races: Option<usize>,
    },

    /// A team's best tracks.
    TopTeamTracks {
        team: String,
        #[arg(long)]
        min_races: Option<usize>,
    },

    /// Season averages of every player on a team.
    TeamPlayers {
        team: String,
        #[arg(long)]
        min_races: Option<usize>,
    },

    /// Every player's average on one track.
    TrackPlayers {
        track: String,
        #[arg(long)]
        min_races: Option<usize>,
    },

    /// Every team's points per race on one track.
    TrackTeams {
        track: String,
        #[arg(long)]
        min_races: Option<usize>,
    },
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Run the parsed command against `engine` for `division`, writing results to
/// `out`.
pub fn run<P, W>(
    command: &Command,
    engine: &StatsEngine<P>,
    division: &str,
    json: bool,
    out: &mut W,
) -> anyhow::Result<()>
where
    P: DatasetProvider,
    W: Write,
{
    match command {
        Command::List { dimension, display } => {
            let values = if *display {
                engine.display_values(division, dimension)?
            } else {
                engine.list_values(division, dimension)?
            };
            emit(out, json, &values, || values.clone())
        }
        Command::Player { name, track, team } => {
            let track = track.as_deref().unwrap_or("");
            let result = engine.player_average(
                name,
                division,
                track,
                team.as_deref().unwrap_or(""),
            )?;
            let line = if track.is_empty() {
                season_line(&result)
            } else {
                per_race_line(&result)
            };
            emit(out, json, &result, || vec![line])
        }
        Command::Team { name, track } => {
            let result = engine.team_average(name, track, division)?;
            let line = per_race_line(&result);
            emit(out, json, &result, || vec![line])
        }
        Command::TopTracks { player, min_races } => {
            let ranked = engine.top_tracks_for_player(player, division, *min_races)?;
            emit_ranking(out, json, &ranked)
        }
        Command::TopTeamTracks { team, min_races } => {
            let ranked = engine.top_tracks_for_team(team, division, *min_races)?;
            emit_ranking(out, json, &ranked)
        }
        Command::TeamPlayers { team, min_races } => {
            let ranked = engine.top_players_for_team(team, division, *min_races)?;
            emit_ranking(out, json, &ranked)
        }
        Command::TrackPlayers { track, min_races } => {
            let ranked = engine.top_players_on_track(track, division, *min_races)?;
            emit_ranking(out, json, &ranked)
        }
        Command::TrackTeams { track, min_races } => {
            let ranked = engine.top_teams_on_track(track, division, *min_races)?;
            emit_ranking(out, json, &ranked)
        }
    }
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

/// `Mario (Alpha) - 76.0 pts per war (3 races)`
fn season_line(r: &AggregateResult) -> String {
    let name = match &r.qualifier {
        Some(team) => format!("{} ({})", r.name, team),
        None => r.name.clone(),
    };
    format!(
        "{} - {:.1} pts per war ({} races)",
        name, r.average, r.sample_count
    )
}

/// `Mario - Rainbow Road - 2.0 pts per race (2 races)`
fn per_race_line(r: &AggregateResult) -> String {
    format!(
        "{} - {} - {:.1} pts per race ({} races)",
        r.name,
        r.qualifier.as_deref().unwrap_or(""),
        r.average,
        r.sample_count
    )
}

fn emit<W, T, F>(out: &mut W, json: bool, value: &T, lines: F) -> anyhow::Result<()>
where
    W: Write,
    T: Serialize + ?Sized,
    F: FnOnce() -> Vec<String>,
{
    if json {
        serde_json::to_writer_pretty(&mut *out, value)?;
        writeln!(out)?;
    } else {
        for line in lines() {
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}

fn emit_ranking<W: Write>(out: &mut W, json: bool, ranked: &[RankedEntry]) -> anyhow::Result<()> {
    emit(out, json, ranked, || render(ranked))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
