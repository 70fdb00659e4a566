//! RankingEntry: one team's computed standings row.

use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};

/// Derived standings row for one team in a round-robin competition.
/// Recomputed from the completed-match set, never mutated in place.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub team: TeamId,
    pub name: String,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub points_for: u32,
    pub points_against: u32,
    pub point_difference: i64,
    pub points: i64,
    /// 1-indexed standing after sorting.
    pub position: u32,
}

impl RankingEntry {
    pub fn new(team: TeamId, name: impl Into<String>) -> Self {
        Self {
            team,
            name: name.into(),
            ..Self::default()
        }
    }
}
