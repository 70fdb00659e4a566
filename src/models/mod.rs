//! Data structures for the competition engine: teams, matches, competitions, standings.

mod competition;
mod game;
mod ranking;
mod team;

pub use competition::{
    Competition, CompetitionError, CompetitionId, CompetitionKind, GameMode, MatchRules,
};
pub use game::{ClockState, GameMatch, MatchId, MatchStatus, Side};
pub use ranking::RankingEntry;
pub use team::{Team, TeamId};
