// Rankings: run an aggregate over every candidate of a dimension, drop thin
// samples, order best-first, and optionally cut the list short.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

use crate::aggregate::{self, AggregateResult, PlayerScope};
use crate::catalog::Catalog;
use crate::error::StatsError;
use crate::record::{Dataset, Dimension};

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Whether a ranking is cut to a fixed length or returned whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingPolicy {
    Truncate(usize),
    Full,
}

/// Threshold and length policy for one ranking query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingOptions {
    /// Candidates with fewer races than this are dropped. At 0, candidates
    /// with no races are kept and are named by their lower-cased catalog
    /// key, since no record supplies a display casing.
    pub min_races: usize,
    pub policy: RankingPolicy,
}

impl RankingOptions {
    pub const DEFAULT_TRACK_LIMIT: usize = 10;

    /// Best tracks for a player or team: two races minimum, top ten.
    pub const fn tracks() -> Self {
        Self {
            min_races: 2,
            policy: RankingPolicy::Truncate(Self::DEFAULT_TRACK_LIMIT),
        }
    }

    /// Season averages of a team's players: a war's worth of races, every
    /// qualifying player listed.
    pub const fn roster() -> Self {
        Self {
            min_races: 12,
            policy: RankingPolicy::Full,
        }
    }

    /// Players or teams on one track: two races minimum, every qualifying
    /// entry listed.
    pub const fn on_track() -> Self {
        Self {
            min_races: 2,
            policy: RankingPolicy::Full,
        }
    }

    pub fn with_min_races(mut self, min_races: usize) -> Self {
        self.min_races = min_races;
        self
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// One line of a ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub name: String,
    pub average: f64,
    pub sample_count: usize,
}

impl fmt::Display for RankedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {:.1} pts ({} races)",
            self.name, self.average, self.sample_count
        )
    }
}

/// Render entries as `"<name> - <average> pts (<races> races)"` lines.
pub fn render(entries: &[RankedEntry]) -> Vec<String> {
    entries.iter().map(ToString::to_string).collect()
}

/// Best-first: higher average, then more races. Equal keys keep their
/// incoming order.
fn by_average_then_races(a: &RankedEntry, b: &RankedEntry) -> Ordering {
    b.average
        .total_cmp(&a.average)
        .then_with(|| b.sample_count.cmp(&a.sample_count))
}

/// Filter, sort, and cut a set of candidate entries.
pub fn rank<I>(candidates: I, options: &RankingOptions) -> Vec<RankedEntry>
where
    I: IntoIterator<Item = RankedEntry>,
{
    let mut entries: Vec<RankedEntry> = candidates
        .into_iter()
        .filter(|e| e.sample_count >= options.min_races)
        .collect();

    entries.sort_by(by_average_then_races);

    if let RankingPolicy::Truncate(limit) = options.policy {
        entries.truncate(limit);
    }
    entries
}

/// Entry named by the aggregate's qualifier (the track or team it was
/// scoped to).
fn entry_by_qualifier(result: AggregateResult) -> RankedEntry {
    RankedEntry {
        name: result.qualifier.unwrap_or(result.name),
        average: result.average,
        sample_count: result.sample_count,
    }
}

/// Entry named by the aggregate's subject (the player or team itself).
fn entry_by_name(result: AggregateResult) -> RankedEntry {
    RankedEntry {
        name: result.name,
        average: result.average,
        sample_count: result.sample_count,
    }
}

// ---------------------------------------------------------------------------
// Ranking queries
// ---------------------------------------------------------------------------

/// A player's best tracks by per-race average.
pub fn top_tracks_for_player(
    dataset: &Dataset,
    player: &str,
    options: &RankingOptions,
) -> Result<Vec<RankedEntry>, StatsError> {
    Catalog::build(dataset, Dimension::Player).require(player)?;
    let tracks = Catalog::build(dataset, Dimension::Track);

    let candidates = tracks.values().iter().map(|track| {
        entry_by_qualifier(aggregate::player_average_unchecked(
            dataset,
            player,
            PlayerScope::Track(track),
        ))
    });
    Ok(rank(candidates, options))
}

/// A team's best tracks by points per race.
pub fn top_tracks_for_team(
    dataset: &Dataset,
    team: &str,
    options: &RankingOptions,
) -> Result<Vec<RankedEntry>, StatsError> {
    Catalog::build(dataset, Dimension::Team).require(team)?;
    let tracks = Catalog::build(dataset, Dimension::Track);

    let candidates = tracks
        .values()
        .iter()
        .map(|track| entry_by_qualifier(aggregate::team_average_unchecked(dataset, team, track)));
    Ok(rank(candidates, options))
}

/// Season per-war averages of everyone who raced for `team`, counting only
/// races played for that team.
pub fn top_players_for_team(
    dataset: &Dataset,
    team: &str,
    options: &RankingOptions,
) -> Result<Vec<RankedEntry>, StatsError> {
    Catalog::build(dataset, Dimension::Team).require(team)?;
    let players = Catalog::build(dataset, Dimension::Player);

    let candidates = players.values().iter().map(|player| {
        entry_by_name(aggregate::player_average_unchecked(
            dataset,
            player,
            PlayerScope::SeasonOnTeam(team),
        ))
    });
    Ok(rank(candidates, options))
}

/// Every player's unscaled average on `track`.
pub fn top_players_on_track(
    dataset: &Dataset,
    track: &str,
    options: &RankingOptions,
) -> Result<Vec<RankedEntry>, StatsError> {
    Catalog::build(dataset, Dimension::Track).require(track)?;
    let players = Catalog::build(dataset, Dimension::Player);

    let candidates = players.values().iter().map(|player| {
        entry_by_name(aggregate::player_average_unchecked(
            dataset,
            player,
            PlayerScope::Track(track),
        ))
    });
    Ok(rank(candidates, options))
}

/// Every team's points per race on `track`.
pub fn top_teams_on_track(
    dataset: &Dataset,
    track: &str,
    options: &RankingOptions,
) -> Result<Vec<RankedEntry>, StatsError> {
    Catalog::build(dataset, Dimension::Track).require(track)?;
    let teams = Catalog::build(dataset, Dimension::Team);

    let candidates = teams
        .values()
        .iter()
        .map(|team| entry_by_name(aggregate::team_average_unchecked(dataset, team, track)));
    Ok(rank(candidates, options))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ScoreRecord;

    fn entry(name: &str, average: f64, sample_count: usize) -> RankedEntry {
        RankedEntry {
            name: name.into(),
            average,
            sample_count,
        }
    }

    fn assert_ranked(entries: &[RankedEntry]) {
        for pair in entries.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(
                a.average > b.average
                    || (a.average == b.average && a.sample_count >= b.sample_count),
                "entries out of order: {a} before {b}"
            );
        }
    }

    /// Mario races twelve tracks; track `Track NN` gets score NN+1 twice.
    fn many_tracks() -> Dataset {
        let mut records = Vec::new();
        for i in 0..12 {
            let track = format!("Track {i:02}");
            records.push(ScoreRecord::new("Alpha", "Mario", track.clone(), i + 1));
            records.push(ScoreRecord::new("Alpha", "Mario", track, i + 1));
        }
        records.push(ScoreRecord::new("Alpha", "Mario", "Solo Track", 15));
        Dataset::new("1_2", records)
    }

    // -- rank() --

    #[test]
    fn ties_broken_by_sample_count() {
        let ranked = rank(
            vec![entry("a", 9.0, 2), entry("b", 9.0, 5), entry("c", 10.0, 2)],
            &RankingOptions::on_track(),
        );
        let names: Vec<&str> = ranked.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["c", "b", "a"]);
    }

    #[test]
    fn full_ties_keep_input_order() {
        let ranked = rank(
            vec![entry("a", 9.0, 2), entry("b", 9.0, 2)],
            &RankingOptions::on_track(),
        );
        assert_eq!(ranked[0].name, "a");
        assert_eq!(ranked[1].name, "b");
    }

    #[test]
    fn below_threshold_dropped() {
        let ranked = rank(
            vec![entry("a", 15.0, 1), entry("b", 3.0, 2)],
            &RankingOptions::tracks(),
        );
        assert_eq!(ranked, vec![entry("b", 3.0, 2)]);
    }

    #[test]
    fn truncate_policy_caps_length() {
        let candidates: Vec<RankedEntry> = (0..15).map(|i| entry(&i.to_string(), i as f64, 3)).collect();
        let ranked = rank(candidates.clone(), &RankingOptions::tracks());
        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked[0].name, "14");

        let ranked = rank(candidates, &RankingOptions::on_track());
        assert_eq!(ranked.len(), 15);
    }

    #[test]
    fn display_format() {
        assert_eq!(entry("Rainbow Road", 2.0, 2).to_string(), "Rainbow Road - 2.0 pts (2 races)");
        assert_eq!(
            render(&[entry("Alpha", 45.3, 3)]),
            vec!["Alpha - 45.3 pts (3 races)".to_string()]
        );
    }

    // -- Track rankings --

    #[test]
    fn player_tracks_truncated_to_ten() {
        let ranked = top_tracks_for_player(&many_tracks(), "mario", &RankingOptions::tracks()).unwrap();
        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked[0].name, "Track 11");
        assert!((ranked[0].average - 12.0).abs() < f64::EPSILON);
        // Solo Track has one race and never qualifies.
        assert!(ranked.iter().all(|e| e.name != "Solo Track"));
        assert_ranked(&ranked);
    }

    #[test]
    fn player_tracks_respect_min_races_override() {
        let opts = RankingOptions::tracks().with_min_races(1);
        let ranked = top_tracks_for_player(&many_tracks(), "Mario", &opts).unwrap();
        assert_eq!(ranked[0].name, "Solo Track");
        assert_eq!(ranked[0].sample_count, 1);
    }

    #[test]
    fn player_tracks_unknown_player() {
        let err = top_tracks_for_player(&many_tracks(), "Luigi", &RankingOptions::tracks()).unwrap_err();
        assert!(matches!(err, StatsError::UnknownPlayer { .. }));
    }

    #[test]
    fn team_tracks_use_team_races() {
        let mut records = Vec::new();
        for player in ["A", "B", "C", "D", "E"] {
            for _ in 0..2 {
                records.push(ScoreRecord::new("Alpha", player, "Rainbow Road", 9));
            }
            records.push(ScoreRecord::new("Alpha", player, "Moo Moo Meadows", 12));
        }
        let ds = Dataset::new("3", records);

        let ranked = top_tracks_for_team(&ds, "ALPHA", &RankingOptions::tracks()).unwrap();
        // Moo Moo Meadows has only one team race.
        assert_eq!(ranked, vec![entry("Rainbow Road", 45.0, 2)]);

        let ranked = top_tracks_for_team(&ds, "alpha", &RankingOptions::tracks().with_min_races(1)).unwrap();
        assert_eq!(ranked[0], entry("Moo Moo Meadows", 60.0, 1));
    }

    // -- Roster rankings --

    #[test]
    fn team_players_are_complete_and_team_scoped() {
        let mut records = Vec::new();
        for i in 0..15 {
            records.push(ScoreRecord::new("Alpha", "Mario", format!("T{}", i % 4), 10));
            records.push(ScoreRecord::new("Alpha", "Peach", format!("T{}", i % 4), 8));
        }
        for i in 0..12 {
            records.push(ScoreRecord::new("Alpha", "Daisy", format!("T{}", i % 4), 10));
            // Races for another team must not count toward Alpha.
            records.push(ScoreRecord::new("Bravo", "Peach", format!("T{}", i % 4), 15));
        }
        for _ in 0..11 {
            records.push(ScoreRecord::new("Alpha", "Toad", "T0", 15));
        }
        let ds = Dataset::new("1_2", records);

        let ranked = top_players_for_team(&ds, "Alpha", &RankingOptions::roster()).unwrap();
        assert_eq!(
            ranked,
            vec![
                entry("Mario", 120.0, 15),
                entry("Daisy", 120.0, 12),
                entry("Peach", 96.0, 15),
            ]
        );
    }

    #[test]
    fn team_players_unknown_team() {
        let ds = many_tracks();
        let err = top_players_for_team(&ds, "Zulu", &RankingOptions::roster()).unwrap_err();
        match err {
            StatsError::UnknownTeam { valid, .. } => assert_eq!(valid, vec!["alpha"]),
            other => panic!("expected UnknownTeam, got: {other}"),
        }
    }

    #[test]
    fn players_and_teams_on_track() {
        let mut records = Vec::new();
        for player in ["A1", "A2", "A3", "A4", "A5"] {
            records.push(ScoreRecord::new("Alpha", player, "Rainbow Road", 10));
            records.push(ScoreRecord::new("Alpha", player, "Rainbow Road", 10));
        }
        for player in ["B1", "B2", "B3", "B4", "B5"] {
            records.push(ScoreRecord::new("Bravo", player, "Rainbow Road", 6));
            records.push(ScoreRecord::new("Bravo", player, "Rainbow Road", 6));
        }
        records.push(ScoreRecord::new("Bravo", "B1", "Rainbow Road", 15));
        let ds = Dataset::new("4", records);

        let players = top_players_on_track(&ds, "rainbow road", &RankingOptions::on_track()).unwrap();
        assert_eq!(players.len(), 10);
        assert_eq!(players[0].name, "A1");
        assert_eq!(players[5], entry("B1", 9.0, 3));
        assert_ranked(&players);

        let teams = top_teams_on_track(&ds, "Rainbow Road", &RankingOptions::on_track()).unwrap();
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0], entry("Alpha", 50.0, 2));
        assert_eq!(teams[1].name, "Bravo");
        assert_eq!(teams[1].sample_count, 2);
    }

    #[test]
    fn zero_threshold_keeps_empty_candidates_under_catalog_key() {
        let ds = Dataset::new(
            "1_2",
            vec![
                ScoreRecord::new("Alpha", "Mario", "Rainbow Road", 6),
                ScoreRecord::new("Alpha", "Mario", "Rainbow Road", 8),
                ScoreRecord::new("Bravo", "Peach", "Mute City", 12),
            ],
        );
        let ranked =
            top_tracks_for_player(&ds, "Mario", &RankingOptions::tracks().with_min_races(0)).unwrap();
        assert_eq!(
            ranked,
            vec![entry("Rainbow Road", 7.0, 2), entry("mute city", 0.0, 0)]
        );

        let ranked =
            top_teams_on_track(&ds, "Mute City", &RankingOptions::on_track().with_min_races(0)).unwrap();
        // One Bravo result is less than half a team race, so both teams tie at
        // zero and keep catalog order.
        assert_eq!(ranked, vec![entry("alpha", 0.0, 0), entry("Bravo", 0.0, 0)]);
    }

    #[test]
    fn non_ascii_players_stay_in_rankings() {
        let ds = Dataset::new(
            "3",
            vec![
                ScoreRecord::new("Alpha", "ΟΔΥΣΣΕΥΣ", "Rainbow Road", 12),
                ScoreRecord::new("Alpha", "ΟΔΥΣΣΕΥΣ", "Rainbow Road", 10),
                ScoreRecord::new("Alpha", "Mario", "Rainbow Road", 4),
                ScoreRecord::new("Alpha", "Mario", "Rainbow Road", 6),
            ],
        );
        let ranked = top_players_on_track(&ds, "Rainbow Road", &RankingOptions::on_track()).unwrap();
        assert_eq!(
            ranked,
            vec![entry("ΟΔΥΣΣΕΥΣ", 11.0, 2), entry("Mario", 5.0, 2)]
        );
    }

    #[test]
    fn track_rankings_validate_track() {
        let ds = many_tracks();
        assert!(matches!(
            top_players_on_track(&ds, "Mute City", &RankingOptions::on_track()),
            Err(StatsError::UnknownTrack { .. })
        ));
        assert!(matches!(
            top_teams_on_track(&ds, "Mute City", &RankingOptions::on_track()),
            Err(StatsError::UnknownTrack { .. })
        ));
    }
}
