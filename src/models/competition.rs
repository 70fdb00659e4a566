//! Competition aggregate, rule configuration, and errors.

use crate::models::game::{GameMatch, MatchId, MatchStatus};
use crate::models::team::{Team, TeamId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur during competition operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CompetitionError {
    /// Need at least 2 teams to draw a bracket.
    TooFewTeams { count: usize },
    /// Bracket already drawn for this competition.
    AlreadyDrawn,
    /// Operation does not apply to this competition kind (cup vs league).
    WrongCompetitionType,
    /// Competition or match is not in a state that allows this action.
    WrongLifecycleState,
    /// Match is in a terminal state (completed, cancelled, walkover).
    MatchTerminal,
    /// Match not found in this competition.
    MatchNotFound(MatchId),
    /// Team not found in this competition.
    TeamNotFound(TeamId),
    /// Team is not one of the match's two sides.
    TeamNotInMatch(TeamId),
    /// Score delta outside the allowed set {-1, +1, +2, +3}.
    InvalidDelta(i32),
    /// A team with this name already exists (names are unique, case-insensitive).
    DuplicateTeamName,
    /// A match needs two distinct teams.
    TeamsIdentical,
    /// Bracket reset refused: live or completed matches exist.
    ActiveOrCompletedMatchesExist,
    /// Match deletion refused: live/completed, or its winner already advanced.
    MatchProtected,
    /// Successor link points at a match that does not exist (bracket corruption).
    SuccessorNotFound(MatchId),
    /// Advancement requested for a match that has not completed.
    MatchNotCompleted(MatchId),
}

impl std::fmt::Display for CompetitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompetitionError::TooFewTeams { count } => {
                write!(f, "Need at least 2 teams to draw a bracket (have {})", count)
            }
            CompetitionError::AlreadyDrawn => write!(f, "Bracket has already been drawn"),
            CompetitionError::WrongCompetitionType => {
                write!(f, "Operation not valid for this competition type")
            }
            CompetitionError::WrongLifecycleState => {
                write!(f, "Invalid state for this action")
            }
            CompetitionError::MatchTerminal => {
                write!(f, "Match is completed, cancelled or a walkover")
            }
            CompetitionError::MatchNotFound(_) => write!(f, "Match not found"),
            CompetitionError::TeamNotFound(_) => write!(f, "Team not found"),
            CompetitionError::TeamNotInMatch(_) => write!(f, "Team is not playing in this match"),
            CompetitionError::InvalidDelta(d) => {
                write!(f, "Score delta {} not allowed (use -1, +1, +2 or +3)", d)
            }
            CompetitionError::DuplicateTeamName => {
                write!(f, "A team with this name already exists")
            }
            CompetitionError::TeamsIdentical => write!(f, "A match needs two different teams"),
            CompetitionError::ActiveOrCompletedMatchesExist => {
                write!(f, "Cannot reset: live or completed matches exist")
            }
            CompetitionError::MatchProtected => {
                write!(f, "Cannot delete: match is live/completed or already fed its successor")
            }
            CompetitionError::SuccessorNotFound(id) => {
                write!(f, "Successor match {} does not exist", id)
            }
            CompetitionError::MatchNotCompleted(id) => {
                write!(f, "Match {} has not completed", id)
            }
        }
    }
}

impl std::error::Error for CompetitionError {}

/// Unique identifier for a competition.
pub type CompetitionId = Uuid;

/// What format the competition is played in.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionKind {
    /// Single-elimination bracket.
    #[default]
    Cup,
    /// Round-robin with a standings table.
    League,
    /// One-off matches, no bracket, no table.
    Single,
}

/// How a match is decided.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// First to `points_to_win`.
    #[default]
    Points,
    /// Fixed duration on the clock.
    Timed,
}

/// Typed rule configuration, validated once at competition creation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchRules {
    pub game_mode: GameMode,
    pub points_to_win: u32,
    pub duration_secs: u64,
    /// Evaluate auto-completion after every scoring or clock event.
    pub auto_end: bool,
    /// Ranking points per outcome (league play).
    pub points_win: i32,
    pub points_draw: i32,
    pub points_loss: i32,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            game_mode: GameMode::Points,
            points_to_win: 11,
            duration_secs: 2 * 45 * 60,
            auto_end: true,
            points_win: 3,
            points_draw: 1,
            points_loss: 0,
        }
    }
}

/// Full competition state: teams, matches, rules, and format.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Competition {
    pub id: CompetitionId,
    pub name: String,
    pub kind: CompetitionKind,
    pub teams: Vec<Team>,
    /// All matches; in a cup this is the whole bracket, linked by successor_id.
    pub matches: Vec<GameMatch>,
    pub rules: MatchRules,
    pub created_at: DateTime<Utc>,
}

impl Competition {
    /// Create a new competition with no teams or matches.
    pub fn new(
        name: impl Into<String>,
        kind: CompetitionKind,
        rules: MatchRules,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            teams: Vec::new(),
            matches: Vec::new(),
            rules,
            created_at: now,
        }
    }

    /// Create a competition with initial teams (e.g. from setup).
    pub fn with_teams(
        name: impl Into<String>,
        kind: CompetitionKind,
        rules: MatchRules,
        teams: Vec<Team>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            teams,
            ..Self::new(name, kind, rules, now)
        }
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn game(&self, id: MatchId) -> Option<&GameMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn game_mut(&mut self, id: MatchId) -> Option<&mut GameMatch> {
        self.matches.iter_mut().find(|m| m.id == id)
    }

    /// Add a team. Names must be unique (case-insensitive). Refused once
    /// matches exist: rosters are frozen after the draw.
    pub fn add_team(&mut self, team: Team) -> Result<(), CompetitionError> {
        if !self.matches.is_empty() {
            return Err(CompetitionError::WrongLifecycleState);
        }
        let name_trimmed = team.name.trim().to_string();
        if name_trimmed.is_empty() {
            return Err(CompetitionError::WrongLifecycleState);
        }
        let is_duplicate = self
            .teams
            .iter()
            .any(|t| t.name.eq_ignore_ascii_case(&name_trimmed));
        if is_duplicate {
            return Err(CompetitionError::DuplicateTeamName);
        }
        self.teams.push(Team { name: name_trimmed, ..team });
        Ok(())
    }

    /// Remove a team by id (only before any matches exist).
    pub fn remove_team(&mut self, team_id: TeamId) -> Result<(), CompetitionError> {
        if !self.matches.is_empty() {
            return Err(CompetitionError::WrongLifecycleState);
        }
        let idx = self
            .teams
            .iter()
            .position(|t| t.id == team_id)
            .ok_or(CompetitionError::TeamNotFound(team_id))?;
        self.teams.remove(idx);
        Ok(())
    }

    /// Completed matches with both sides resolved (ranking input).
    pub fn completed_matches(&self) -> impl Iterator<Item = &GameMatch> {
        self.matches.iter().filter(|m| {
            m.status == MatchStatus::Completed && m.team_a.is_some() && m.team_b.is_some()
        })
    }
}
