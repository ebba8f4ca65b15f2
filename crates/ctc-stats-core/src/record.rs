// Score records, per-division datasets, and the dimensions a dataset can be
// enumerated along.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::StatsError;

/// Highest score that counts toward an average. Anything above is a sentinel
/// code (disconnect, did not finish) and is kept in the dataset but skipped
/// by every aggregate.
pub const MAX_COUNTED_SCORE: i32 = 15;

/// A "bag" is a race where the player only held position: score of 1.
pub const BAG_SCORE: i32 = 1;

// ---------------------------------------------------------------------------
// ScoreRecord
// ---------------------------------------------------------------------------

/// One player's result in one race.
///
/// Identifier fields keep the casing they were ingested with. An empty string
/// is the blank marker for a missing cell; it never matches a query and is
/// left out of every catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreRecord {
    pub team: String,
    pub player: String,
    pub track: String,
    pub score: i32,
}

impl ScoreRecord {
    pub fn new(
        team: impl Into<String>,
        player: impl Into<String>,
        track: impl Into<String>,
        score: i32,
    ) -> Self {
        Self {
            team: team.into(),
            player: player.into(),
            track: track.into(),
            score,
        }
    }

    /// The raw value of this record along `dimension`.
    pub fn field(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::Team => &self.team,
            Dimension::Player => &self.player,
            Dimension::Track => &self.track,
        }
    }

    /// Whether this record's field along `dimension` equals `key`,
    /// ignoring case.
    pub fn matches(&self, dimension: Dimension, key: &str) -> bool {
        let value = self.field(dimension);
        !value.is_empty() && value.to_lowercase() == key.to_lowercase()
    }

    /// Whether the score is inside the averaged domain.
    pub fn is_counted(&self) -> bool {
        self.score <= MAX_COUNTED_SCORE
    }

    /// Display-only marker. Bags are averaged like any other race.
    pub fn is_bag(&self) -> bool {
        self.score == BAG_SCORE
    }
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// The immutable, ordered record set for a single division.
///
/// Record order matters: display casing for an identifier is taken from the
/// last matching record in a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    division: String,
    records: Vec<ScoreRecord>,
}

impl Dataset {
    pub fn new(division: impl Into<String>, records: Vec<ScoreRecord>) -> Self {
        Self {
            division: division.into(),
            records,
        }
    }

    pub fn division(&self) -> &str {
        &self.division
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Dimension
// ---------------------------------------------------------------------------

/// The identifier axes a dataset can be listed or ranked along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Team,
    Player,
    Track,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Player, Dimension::Team, Dimension::Track];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Team => "team",
            Dimension::Player => "player",
            Dimension::Track => "track",
        }
    }

    fn names() -> Vec<String> {
        Self::ALL.iter().map(|d| d.as_str().to_string()).collect()
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "team" => Ok(Dimension::Team),
            "player" => Ok(Dimension::Player),
            "track" => Ok(Dimension::Track),
            _ => Err(StatsError::InvalidDimension {
                name: s.to_string(),
                valid: Dimension::names(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
