// Division-addressed query surface over an injected dataset provider.
//
// Every call loads the division's snapshot from the provider and runs one
// independent scan over it. Nothing is cached or mutated here, so a single
// engine can be shared across threads.

use std::sync::Arc;

use tracing::debug;

use crate::aggregate::{self, AggregateResult, PlayerScope};
use crate::catalog;
use crate::error::StatsError;
use crate::provider::DatasetProvider;
use crate::ranking::{self, RankedEntry, RankingOptions};
use crate::record::{Dataset, Dimension};

/// Default thresholds and length policy for each ranking family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingDefaults {
    /// Top tracks for a player or team.
    pub tracks: RankingOptions,
    /// Players on a team.
    pub roster: RankingOptions,
    /// Players or teams on a single track.
    pub on_track: RankingOptions,
}

impl Default for RankingDefaults {
    fn default() -> Self {
        Self {
            tracks: RankingOptions::tracks(),
            roster: RankingOptions::roster(),
            on_track: RankingOptions::on_track(),
        }
    }
}

/// Statistics queries addressed by division identifier.
#[derive(Debug, Clone)]
pub struct StatsEngine<P> {
    provider: P,
    defaults: RankingDefaults,
}

impl<P: DatasetProvider> StatsEngine<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            defaults: RankingDefaults::default(),
        }
    }

    pub fn with_ranking_defaults(mut self, defaults: RankingDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn ranking_defaults(&self) -> &RankingDefaults {
        &self.defaults
    }

    fn dataset(&self, division: &str) -> Result<Arc<Dataset>, StatsError> {
        Ok(self.provider.load(division)?)
    }

    /// Log validation failures at debug; they are user errors, not faults.
    fn log_rejection<T>(op: &str, division: &str, result: Result<T, StatsError>) -> Result<T, StatsError> {
        if let Err(e) = &result {
            if e.is_validation() {
                debug!("{} in division {} rejected: {}", op, division, e);
            }
        }
        result
    }

    // -- Catalog --

    /// Lower-cased distinct values of `dimension` (`"player"`, `"team"` or
    /// `"track"`), sorted.
    pub fn list_values(&self, division: &str, dimension: &str) -> Result<Vec<String>, StatsError> {
        let dimension: Dimension = dimension.parse()?;
        let dataset = self.dataset(division)?;
        Ok(catalog::list_values(&dataset, dimension))
    }

    /// Distinct values of `dimension` in their ingested casing, sorted.
    pub fn display_values(
        &self,
        division: &str,
        dimension: &str,
    ) -> Result<Vec<String>, StatsError> {
        let dimension: Dimension = dimension.parse()?;
        let dataset = self.dataset(division)?;
        Ok(catalog::display_values(&dataset, dimension))
    }

    // -- Aggregates --

    /// A player's average. An empty `track` means season-wide, scaled per
    /// war; an empty `team_filter` means every team.
    pub fn player_average(
        &self,
        player: &str,
        division: &str,
        track: &str,
        team_filter: &str,
    ) -> Result<AggregateResult, StatsError> {
        let dataset = self.dataset(division)?;
        let scope = PlayerScope::from_parts(track, team_filter);
        Self::log_rejection(
            "player average",
            division,
            aggregate::player_average(&dataset, player, scope),
        )
    }

    /// A team's points per race on one track.
    pub fn team_average(
        &self,
        team: &str,
        track: &str,
        division: &str,
    ) -> Result<AggregateResult, StatsError> {
        let dataset = self.dataset(division)?;
        Self::log_rejection(
            "team average",
            division,
            aggregate::team_average(&dataset, team, track),
        )
    }

    // -- Rankings --
    //
    // `min_races` overrides the configured threshold for the family; the
    // length policy always comes from the configured defaults.

    pub fn top_tracks_for_player(
        &self,
        player: &str,
        division: &str,
        min_races: Option<usize>,
    ) -> Result<Vec<RankedEntry>, StatsError> {
        let options = resolve(self.defaults.tracks, min_races);
        let dataset = self.dataset(division)?;
        Self::log_rejection(
            "top tracks for player",
            division,
            ranking::top_tracks_for_player(&dataset, player, &options),
        )
    }

    pub fn top_tracks_for_team(
        &self,
        team: &str,
        division: &str,
        min_races: Option<usize>,
    ) -> Result<Vec<RankedEntry>, StatsError> {
        let options = resolve(self.defaults.tracks, min_races);
        let dataset = self.dataset(division)?;
        Self::log_rejection(
            "top tracks for team",
            division,
            ranking::top_tracks_for_team(&dataset, team, &options),
        )
    }

    pub fn top_players_for_team(
        &self,
        team: &str,
        division: &str,
        min_races: Option<usize>,
    ) -> Result<Vec<RankedEntry>, StatsError> {
        let options = resolve(self.defaults.roster, min_races);
        let dataset = self.dataset(division)?;
        Self::log_rejection(
            "top players for team",
            division,
            ranking::top_players_for_team(&dataset, team, &options),
        )
    }

    pub fn top_players_on_track(
        &self,
        track: &str,
        division: &str,
        min_races: Option<usize>,
    ) -> Result<Vec<RankedEntry>, StatsError> {
        let options = resolve(self.defaults.on_track, min_races);
        let dataset = self.dataset(division)?;
        Self::log_rejection(
            "top players on track",
            division,
            ranking::top_players_on_track(&dataset, track, &options),
        )
    }

    pub fn top_teams_on_track(
        &self,
        track: &str,
        division: &str,
        min_races: Option<usize>,
    ) -> Result<Vec<RankedEntry>, StatsError> {
        let options = resolve(self.defaults.on_track, min_races);
        let dataset = self.dataset(division)?;
        Self::log_rejection(
            "top teams on track",
            division,
            ranking::top_teams_on_track(&dataset, track, &options),
        )
    }
}

fn resolve(defaults: RankingOptions, min_races: Option<usize>) -> RankingOptions {
    match min_races {
        Some(n) => defaults.with_min_races(n),
        None => defaults,
    }
}
