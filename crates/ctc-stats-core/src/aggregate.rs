// Score aggregation: per-player and per-team averages over a division.
//
// Two normalizations apply:
// - a player's season average is scaled to points per war (12 races);
// - a team's track average is scaled to points per race (5 players).
// A player's single-track average is left unscaled.

use serde::Serialize;

use crate::catalog::Catalog;
use crate::error::StatsError;
use crate::record::{Dataset, Dimension, ScoreRecord};

/// Races in a war.
pub const RACES_PER_WAR: f64 = 12.0;

/// Players a team fields in one race.
pub const PLAYERS_PER_TEAM_RACE: f64 = 5.0;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Outcome of one aggregate query.
///
/// `name` and `qualifier` carry the display casing of the last matching
/// record, falling back to the query text when nothing matched. An empty
/// selection yields `average == 0.0` and `sample_count == 0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub name: String,
    /// Track name for track queries, team name for season and team queries.
    pub qualifier: Option<String>,
    pub average: f64,
    pub sample_count: usize,
}

/// Which of a player's races a [`player_average`] query selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerScope<'a> {
    /// Every race, scaled per war.
    Season,
    /// Every race played for one team, scaled per war.
    SeasonOnTeam(&'a str),
    /// Races on one track, unscaled.
    Track(&'a str),
}

impl<'a> PlayerScope<'a> {
    /// Build a scope from the flat (track, team filter) pair used by callers
    /// that represent "not given" as an empty string. A non-empty track wins
    /// over the team filter.
    pub fn from_parts(track: &'a str, team_filter: &'a str) -> Self {
        if !track.is_empty() {
            PlayerScope::Track(track)
        } else if !team_filter.is_empty() {
            PlayerScope::SeasonOnTeam(team_filter)
        } else {
            PlayerScope::Season
        }
    }

    fn normalized(self) -> Self {
        match self {
            PlayerScope::Track("") | PlayerScope::SeasonOnTeam("") => PlayerScope::Season,
            other => other,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Round to one decimal place.
///
/// The exact binary value is rounded and exact ties go to the even digit, so
/// `2.25` becomes `2.2` while `2.35` (stored slightly above) becomes `2.4`.
/// Float formatting already rounds this way, so the value is formatted and
/// read back.
pub fn round_to_tenth(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.1}").parse().unwrap_or(value)
}

/// Case-insensitive comparison of a record cell against a key lower-cased
/// with `str::to_lowercase`, the same lowering the catalog uses. Blank cells
/// never match.
fn key_eq(value: &str, key: &str) -> bool {
    !value.is_empty() && value.to_lowercase() == key
}

/// Running totals over the selected records.
#[derive(Debug, Default)]
struct Sample {
    sum: i64,
    count: usize,
    name: Option<String>,
    qualifier: Option<String>,
}

impl Sample {
    /// Scan `dataset`, keeping counted records accepted by `select`. The
    /// display fields are overwritten on every hit so the last match wins;
    /// a blank qualifier cell leaves the previous one in place.
    fn collect<F, N, Q>(dataset: &Dataset, select: F, name: N, qualifier: Q) -> Self
    where
        F: Fn(&ScoreRecord) -> bool,
        N: Fn(&ScoreRecord) -> &str,
        Q: Fn(&ScoreRecord) -> &str,
    {
        let mut sample = Sample::default();
        for record in dataset.records() {
            if !record.is_counted() || !select(record) {
                continue;
            }
            sample.sum += i64::from(record.score);
            sample.count += 1;
            sample.name = Some(name(record).to_string());
            let q = qualifier(record);
            if !q.is_empty() {
                sample.qualifier = Some(q.to_string());
            }
        }
        sample
    }

    /// Mean score multiplied by `scale`; zero for an empty sample.
    fn scaled_mean(&self, scale: f64) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum as f64 * scale / self.count as f64
    }
}

// ---------------------------------------------------------------------------
// Player averages
// ---------------------------------------------------------------------------

/// Average score for `player` within `scope`.
///
/// The player (and, for a track scope, the track) must exist in the
/// division's catalog. A team filter is not validated: an unknown team simply
/// selects nothing.
pub fn player_average(
    dataset: &Dataset,
    player: &str,
    scope: PlayerScope<'_>,
) -> Result<AggregateResult, StatsError> {
    Catalog::build(dataset, Dimension::Player).require(player)?;
    if let PlayerScope::Track(track) = scope.normalized() {
        Catalog::build(dataset, Dimension::Track).require(track)?;
    }
    Ok(player_average_unchecked(dataset, player, scope))
}

/// [`player_average`] without catalog validation, for callers that already
/// validated their inputs.
pub(crate) fn player_average_unchecked(
    dataset: &Dataset,
    player: &str,
    scope: PlayerScope<'_>,
) -> AggregateResult {
    let player_key = player.to_lowercase();

    match scope.normalized() {
        PlayerScope::Track(track) => {
            let track_key = track.to_lowercase();
            let sample = Sample::collect(
                dataset,
                |r| key_eq(&r.player, &player_key) && key_eq(&r.track, &track_key),
                |r| &r.player,
                |r| &r.track,
            );
            AggregateResult {
                average: round_to_tenth(sample.scaled_mean(1.0)),
                sample_count: sample.count,
                name: sample.name.unwrap_or_else(|| player.to_string()),
                qualifier: Some(sample.qualifier.unwrap_or_else(|| track.to_string())),
            }
        }
        scope => {
            let team_key = match scope {
                PlayerScope::SeasonOnTeam(team) => Some(team.to_lowercase()),
                _ => None,
            };
            let sample = Sample::collect(
                dataset,
                |r| {
                    key_eq(&r.player, &player_key)
                        && team_key.as_deref().map_or(true, |t| key_eq(&r.team, t))
                },
                |r| &r.player,
                |r| &r.team,
            );
            let fallback_team = match scope {
                PlayerScope::SeasonOnTeam(team) => Some(team.to_string()),
                _ => None,
            };
            AggregateResult {
                average: round_to_tenth(sample.scaled_mean(RACES_PER_WAR)),
                sample_count: sample.count,
                name: sample.name.unwrap_or_else(|| player.to_string()),
                qualifier: sample.qualifier.or(fallback_team),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Team averages
// ---------------------------------------------------------------------------

/// Points per race for `team` on `track`.
///
/// `sample_count` is the number of team races, i.e. the selected player
/// results divided by the roster size and rounded. Fewer results than make up
/// half a race count as zero races with a zero average.
pub fn team_average(
    dataset: &Dataset,
    team: &str,
    track: &str,
) -> Result<AggregateResult, StatsError> {
    Catalog::build(dataset, Dimension::Team).require(team)?;
    Catalog::build(dataset, Dimension::Track).require(track)?;
    Ok(team_average_unchecked(dataset, team, track))
}

pub(crate) fn team_average_unchecked(dataset: &Dataset, team: &str, track: &str) -> AggregateResult {
    let team_key = team.to_lowercase();
    let track_key = track.to_lowercase();
    let sample = Sample::collect(
        dataset,
        |r| key_eq(&r.team, &team_key) && key_eq(&r.track, &track_key),
        |r| &r.team,
        |r| &r.track,
    );

    let races = (sample.count as f64 / PLAYERS_PER_TEAM_RACE).round() as usize;
    let average = if races > 0 {
        sample.scaled_mean(PLAYERS_PER_TEAM_RACE)
    } else {
        0.0
    };

    AggregateResult {
        average: round_to_tenth(average),
        sample_count: races,
        name: sample.name.unwrap_or_else(|| team.to_string()),
        qualifier: Some(sample.qualifier.unwrap_or_else(|| track.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
