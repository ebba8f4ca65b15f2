// Library root for the league statistics engine: identifier catalogs, score
// aggregates, and rankings over per-division result snapshots.

pub mod aggregate;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod provider;
pub mod ranking;
pub mod record;

pub use aggregate::{AggregateResult, PlayerScope};
pub use engine::{RankingDefaults, StatsEngine};
pub use error::{DatasetError, StatsError};
pub use provider::{CsvDirectoryProvider, DatasetProvider, InMemoryProvider};
pub use ranking::{RankedEntry, RankingOptions, RankingPolicy};
pub use record::{Dataset, Dimension, ScoreRecord};
