//! Competition engine: brackets, match lifecycle, and standings for
//! amateur sports competitions (cups, leagues, single matches).

pub mod logic;
pub mod models;

pub use logic::{
    apply_score_delta, cancel_match, compute_ranking, control_clock, declare_walkover,
    draw_bracket, remove_match, reset_bracket, resolve_advancement, schedule_match, ClockAction,
};
pub use models::{
    ClockState, Competition, CompetitionError, CompetitionId, CompetitionKind, GameMatch,
    GameMode, MatchId, MatchRules, MatchStatus, RankingEntry, Side, Team, TeamId,
};
