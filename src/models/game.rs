//! Match, MatchStatus, Side, and the derived clock.

use crate::models::team::TeamId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Which side of a match a team occupies.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    A,
    B,
}

/// Lifecycle state of a match.
///
/// `Scheduled -> Live -> Completed`, with side branches to `Cancelled`
/// and `Walkover` from either non-terminal state. Completed, Cancelled
/// and Walkover are terminal for mutation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Live,
    Completed,
    Cancelled,
    Walkover,
}

impl MatchStatus {
    /// Terminal states reject all further mutation.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            MatchStatus::Completed | MatchStatus::Cancelled | MatchStatus::Walkover
        )
    }
}

/// Derived match clock. Stateless between reads: no background ticker
/// exists anywhere; the effective elapsed time is recomputed from
/// `last_update` on every read or write, so it survives process restarts
/// and concurrent readers.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ClockState {
    /// Elapsed seconds as of `last_update` (authoritative while paused).
    pub current_secs: u64,
    pub is_paused: bool,
    /// When `current_secs` was last stored; None before the first Start.
    pub last_update: Option<DateTime<Utc>>,
    /// Cap for the effective elapsed time.
    pub total_duration_secs: u64,
    /// When the clock was last started (not cleared by Pause).
    pub started_clock_at: Option<DateTime<Utc>>,
}

impl ClockState {
    /// A fresh, paused clock at 0 with the given cap.
    pub fn new(total_duration_secs: u64) -> Self {
        Self {
            current_secs: 0,
            is_paused: true,
            last_update: None,
            total_duration_secs,
            started_clock_at: None,
        }
    }

    /// Effective elapsed seconds at `now`.
    ///
    /// While the clock is running and the match is live, this is
    /// `min(total, current + (now - last_update))`; otherwise the stored
    /// value is authoritative. Negative wall-clock drift counts as zero.
    pub fn effective_elapsed(&self, status: MatchStatus, now: DateTime<Utc>) -> u64 {
        if self.is_paused || status != MatchStatus::Live {
            return self.current_secs.min(self.total_duration_secs);
        }
        let since_update = match self.last_update {
            Some(ts) => (now - ts).num_seconds().max(0) as u64,
            None => 0,
        };
        (self.current_secs + since_update).min(self.total_duration_secs)
    }

    /// Freeze the clock at its effective value (Pause / End / completion).
    pub fn freeze(&mut self, status: MatchStatus, now: DateTime<Utc>) {
        self.current_secs = self.effective_elapsed(status, now);
        self.is_paused = true;
        self.last_update = Some(now);
    }
}

/// A single match in a competition.
///
/// `round` and `position` are 1-based; in a cup, `successor_id` links this
/// match to the one its winner advances into (None for the final and for
/// league/single matches).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub round: u32,
    pub position: u32,
    /// None until resolved (bracket skeleton or bye).
    pub team_a: Option<TeamId>,
    pub team_b: Option<TeamId>,
    pub status: MatchStatus,
    pub score_a: u32,
    pub score_b: u32,
    /// Set only on Completed (scores not tied) or Walkover.
    pub winner: Option<TeamId>,
    pub successor_id: Option<MatchId>,
    pub clock: ClockState,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl GameMatch {
    pub fn new(round: u32, position: u32, total_duration_secs: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            round,
            position,
            team_a: None,
            team_b: None,
            status: MatchStatus::Scheduled,
            score_a: 0,
            score_b: 0,
            winner: None,
            successor_id: None,
            clock: ClockState::new(total_duration_secs),
            scheduled_at: None,
            started_at: None,
            completed_at: None,
        }
    }

    /// Which side the given team occupies, if any.
    pub fn side_of(&self, team: TeamId) -> Option<Side> {
        if self.team_a == Some(team) {
            Some(Side::A)
        } else if self.team_b == Some(team) {
            Some(Side::B)
        } else {
            None
        }
    }

    /// Winner by strict score comparison; an exact tie yields None.
    pub fn leader(&self) -> Option<TeamId> {
        if self.score_a > self.score_b {
            self.team_a
        } else if self.score_b > self.score_a {
            self.team_b
        } else {
            None
        }
    }
}
