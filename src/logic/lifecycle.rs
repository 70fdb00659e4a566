//! Match lifecycle: scoring, the derived clock, auto-completion,
//! walkover/cancel, and the deletion guard.

use crate::logic::advancement::resolve_advancement;
use crate::logic::bracket::feeding_side;
use crate::models::{
    Competition, CompetitionError, CompetitionKind, GameMatch, GameMode, MatchId, MatchStatus,
    Side, TeamId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Clock control actions.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockAction {
    /// Elapsed back to 0, running; Scheduled matches go Live.
    Start,
    /// Freeze at the recomputed elapsed value.
    Pause,
    /// Continue from the frozen value.
    Resume,
    /// Back to 0, paused; the match reverts to Scheduled.
    Reset,
    /// Freeze and force completion, winner by score.
    End,
}

/// Score deltas an organizer can apply from the scoreboard.
const ALLOWED_DELTAS: [i32; 4] = [-1, 1, 2, 3];

/// Adjust one team's score by `delta`, clamped at 0.
///
/// The first scoring event on a Scheduled match transitions it to Live and
/// stamps `started_at`. Terminal matches reject scoring, as do matches
/// still missing a team. Auto-completion is evaluated afterwards when the
/// competition's rules enable it.
pub fn apply_score_delta(
    competition: &mut Competition,
    match_id: MatchId,
    team_id: TeamId,
    delta: i32,
    now: DateTime<Utc>,
) -> Result<(), CompetitionError> {
    if !ALLOWED_DELTAS.contains(&delta) {
        return Err(CompetitionError::InvalidDelta(delta));
    }
    let m = competition
        .game_mut(match_id)
        .ok_or(CompetitionError::MatchNotFound(match_id))?;
    if m.status.is_terminal() {
        return Err(CompetitionError::MatchTerminal);
    }
    // A half-filled successor waits for its other source; it cannot be played.
    if m.team_a.is_none() || m.team_b.is_none() {
        return Err(CompetitionError::WrongLifecycleState);
    }
    let side = m
        .side_of(team_id)
        .ok_or(CompetitionError::TeamNotInMatch(team_id))?;

    if m.status == MatchStatus::Scheduled {
        m.status = MatchStatus::Live;
        m.started_at = Some(now);
    }
    let score = match side {
        Side::A => &mut m.score_a,
        Side::B => &mut m.score_b,
    };
    *score = (*score as i64 + delta as i64).max(0) as u32;

    maybe_auto_complete(competition, match_id, now)
}

/// Apply a clock action to a match.
///
/// The clock is derived state: nothing ticks in the background, so every
/// action first recomputes the effective elapsed time from the stored
/// timestamps. `explicit_secs` overrides the stored elapsed value (clamped
/// to the total duration) after the action is applied.
pub fn control_clock(
    competition: &mut Competition,
    match_id: MatchId,
    action: ClockAction,
    explicit_secs: Option<u64>,
    now: DateTime<Utc>,
) -> Result<(), CompetitionError> {
    let m = competition
        .game_mut(match_id)
        .ok_or(CompetitionError::MatchNotFound(match_id))?;
    if m.status.is_terminal() {
        return Err(CompetitionError::MatchTerminal);
    }

    match action {
        ClockAction::Start => {
            if m.team_a.is_none() || m.team_b.is_none() {
                return Err(CompetitionError::WrongLifecycleState);
            }
            m.clock.current_secs = 0;
            m.clock.is_paused = false;
            m.clock.last_update = Some(now);
            m.clock.started_clock_at = Some(now);
            if m.status == MatchStatus::Scheduled {
                m.status = MatchStatus::Live;
                m.started_at = Some(now);
            }
        }
        ClockAction::Pause => {
            if m.clock.started_clock_at.is_none() {
                return Err(CompetitionError::WrongLifecycleState);
            }
            m.clock.freeze(m.status, now);
        }
        ClockAction::Resume => {
            if m.clock.started_clock_at.is_none() {
                return Err(CompetitionError::WrongLifecycleState);
            }
            // Already running: a repeated Resume must not rewind the clock.
            if m.clock.is_paused {
                m.clock.is_paused = false;
                m.clock.last_update = Some(now);
            }
        }
        ClockAction::Reset => {
            m.clock.current_secs = 0;
            m.clock.is_paused = true;
            m.clock.last_update = None;
            m.clock.started_clock_at = None;
            m.status = MatchStatus::Scheduled;
            m.started_at = None;
        }
        ClockAction::End => {
            m.clock.freeze(m.status, now);
            complete_match(m, now);
            return resolve_advancement(competition, match_id);
        }
    }

    if let Some(secs) = explicit_secs {
        if let Some(m) = competition.game_mut(match_id) {
            m.clock.current_secs = secs.min(m.clock.total_duration_secs);
            m.clock.last_update = Some(now);
        }
    }

    maybe_auto_complete(competition, match_id, now)
}

/// Resolve a match without play: declare a winner and close it.
/// Valid from Scheduled or Live only. The winner advances like any other.
pub fn declare_walkover(
    competition: &mut Competition,
    match_id: MatchId,
    winner: TeamId,
    now: DateTime<Utc>,
) -> Result<(), CompetitionError> {
    let m = competition
        .game_mut(match_id)
        .ok_or(CompetitionError::MatchNotFound(match_id))?;
    if m.status.is_terminal() {
        return Err(CompetitionError::MatchTerminal);
    }
    if m.side_of(winner).is_none() {
        return Err(CompetitionError::TeamNotInMatch(winner));
    }
    m.clock.freeze(m.status, now);
    m.status = MatchStatus::Walkover;
    m.winner = Some(winner);
    m.completed_at = Some(now);
    resolve_advancement(competition, match_id)
}

/// Cancel a Scheduled or Live match. No winner, no advancement.
pub fn cancel_match(
    competition: &mut Competition,
    match_id: MatchId,
    now: DateTime<Utc>,
) -> Result<(), CompetitionError> {
    let m = competition
        .game_mut(match_id)
        .ok_or(CompetitionError::MatchNotFound(match_id))?;
    if m.status.is_terminal() {
        return Err(CompetitionError::MatchTerminal);
    }
    m.clock.freeze(m.status, now);
    m.status = MatchStatus::Cancelled;
    log::info!("Cancelled match {} in competition {}", match_id, competition.id);
    Ok(())
}

/// Create a match by hand (league and single-match competitions; cup
/// matches come only from the draw). Returns the new match's id.
pub fn schedule_match(
    competition: &mut Competition,
    team_a: TeamId,
    team_b: TeamId,
    now: DateTime<Utc>,
) -> Result<MatchId, CompetitionError> {
    if competition.kind == CompetitionKind::Cup {
        return Err(CompetitionError::WrongCompetitionType);
    }
    if team_a == team_b {
        return Err(CompetitionError::TeamsIdentical);
    }
    for id in [team_a, team_b] {
        if competition.team(id).is_none() {
            return Err(CompetitionError::TeamNotFound(id));
        }
    }
    let position = competition
        .matches
        .iter()
        .filter(|m| m.round == 1)
        .map(|m| m.position)
        .max()
        .unwrap_or(0)
        + 1;
    let mut m = GameMatch::new(1, position, competition.rules.duration_secs);
    m.team_a = Some(team_a);
    m.team_b = Some(team_b);
    m.scheduled_at = Some(now);
    let id = m.id;
    competition.matches.push(m);
    Ok(id)
}

/// Delete a match. Refused once it is Live or Completed, or once its
/// winner has been carried into the successor (the bracket depends on it).
pub fn remove_match(
    competition: &mut Competition,
    match_id: MatchId,
) -> Result<(), CompetitionError> {
    let m = competition
        .game(match_id)
        .ok_or(CompetitionError::MatchNotFound(match_id))?;
    if matches!(m.status, MatchStatus::Live | MatchStatus::Completed) {
        return Err(CompetitionError::MatchProtected);
    }
    if let (Some(winner), Some(succ_id)) = (m.winner, m.successor_id) {
        let side = feeding_side(m.position);
        if let Some(succ) = competition.game(succ_id) {
            let slot = match side {
                Side::A => succ.team_a,
                Side::B => succ.team_b,
            };
            if slot == Some(winner) {
                return Err(CompetitionError::MatchProtected);
            }
        }
    }
    competition.matches.retain(|m| m.id != match_id);
    Ok(())
}

/// Evaluate auto-completion after a scoring or clock event.
///
/// Points mode: either score at the limit ends the match on the spot.
/// Timed mode: the recomputed elapsed time reaching the total duration
/// ends it. Winner by strict score comparison; a tie leaves no winner.
fn maybe_auto_complete(
    competition: &mut Competition,
    match_id: MatchId,
    now: DateTime<Utc>,
) -> Result<(), CompetitionError> {
    let rules = competition.rules;
    if !rules.auto_end {
        return Ok(());
    }
    let m = match competition.game_mut(match_id) {
        Some(m) => m,
        None => return Ok(()),
    };
    if m.status != MatchStatus::Live {
        return Ok(());
    }
    let done = match rules.game_mode {
        GameMode::Points => {
            m.score_a >= rules.points_to_win || m.score_b >= rules.points_to_win
        }
        GameMode::Timed => {
            m.clock.effective_elapsed(m.status, now) >= m.clock.total_duration_secs
        }
    };
    if !done {
        return Ok(());
    }
    m.clock.freeze(m.status, now);
    complete_match(m, now);
    resolve_advancement(competition, match_id)
}

/// Transition into Completed: stamp the time and settle the winner.
fn complete_match(m: &mut GameMatch, now: DateTime<Utc>) {
    m.status = MatchStatus::Completed;
    m.completed_at = Some(now);
    m.winner = m.leader();
    log::info!(
        "Match {} completed {}-{}, winner {:?}",
        m.id,
        m.score_a,
        m.score_b,
        m.winner
    );
}
