//! Elimination draw: build the single-elimination match tree for a cup.

use crate::models::{
    Competition, CompetitionError, CompetitionKind, GameMatch, MatchStatus, Side, TeamId,
};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Draw the bracket for a cup competition.
///
/// 1. `bracket_size` = next power of two >= team count; one round per
///    doubling, `bracket_size - 1` matches total.
/// 2. Shuffle the teams with a seeded RNG (same seed, same draw).
/// 3. Round 1 matches take the shuffled teams pairwise; leftover slots
///    stay empty (byes). Later rounds are created with empty slots and
///    filled only by advancement.
/// 4. Successor links are wired at build time: round r position p feeds
///    round r+1 position ceil(p/2), odd positions into side A.
/// 5. Byes resolve immediately: a round-1 match with a single team becomes
///    a walkover and its team advances; a match left with no reachable
///    teams at all is cancelled. This cascades forward so every remaining
///    scheduled match can actually be played.
///
/// The whole match set is built before it is assigned to the competition,
/// so a failed draw leaves no partial bracket behind.
pub fn draw_bracket(
    competition: &mut Competition,
    seed: u64,
    now: DateTime<Utc>,
) -> Result<(), CompetitionError> {
    if competition.kind != CompetitionKind::Cup {
        return Err(CompetitionError::WrongCompetitionType);
    }
    if !competition.matches.is_empty() {
        return Err(CompetitionError::AlreadyDrawn);
    }
    let team_count = competition.teams.len();
    if team_count < 2 {
        return Err(CompetitionError::TooFewTeams { count: team_count });
    }

    let mut shuffled: Vec<TeamId> = competition.teams.iter().map(|t| t.id).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    shuffled.shuffle(&mut rng);

    let bracket_size = team_count.next_power_of_two();
    let round_count = bracket_size.trailing_zeros();
    let duration = competition.rules.duration_secs;

    // rounds[r] holds round r+1; matches keep 1-based round/position.
    let mut rounds: Vec<Vec<GameMatch>> = Vec::with_capacity(round_count as usize);
    for round in 1..=round_count {
        let count = bracket_size >> round;
        let mut matches = Vec::with_capacity(count);
        for position in 1..=count {
            let mut m = GameMatch::new(round, position as u32, duration);
            m.scheduled_at = Some(now);
            if round == 1 {
                m.team_a = shuffled.get(2 * position - 2).copied();
                m.team_b = shuffled.get(2 * position - 1).copied();
            }
            matches.push(m);
        }
        rounds.push(matches);
    }

    // Wire successor ids: round r position p -> round r+1 position ceil(p/2).
    for r in 0..rounds.len().saturating_sub(1) {
        for p in 0..rounds[r].len() {
            let succ_id = rounds[r + 1][p / 2].id;
            rounds[r][p].successor_id = Some(succ_id);
        }
    }

    resolve_byes(&mut rounds, now);

    competition.matches = rounds.into_iter().flatten().collect();
    log::info!(
        "Drew bracket for competition {}: {} teams, {} rounds, {} matches (seed {})",
        competition.id,
        team_count,
        round_count,
        competition.matches.len(),
        seed
    );
    Ok(())
}

/// Resolve byes front to back. A scheduled match whose missing side can
/// never be filled (round 1, or every source already terminal) becomes a
/// walkover for its sole team, or is cancelled if it has no team at all.
fn resolve_byes(rounds: &mut [Vec<GameMatch>], now: DateTime<Utc>) {
    for r in 0..rounds.len() {
        for p in 0..rounds[r].len() {
            let m = &rounds[r][p];
            if m.status != MatchStatus::Scheduled {
                continue;
            }
            // Round 1 slots are final; later rounds wait on playable sources.
            if r > 0 {
                let sources = &rounds[r - 1][2 * p..2 * p + 2];
                if sources.iter().any(|s| !s.status.is_terminal()) {
                    continue;
                }
            }
            let (team_a, team_b) = (rounds[r][p].team_a, rounds[r][p].team_b);
            match (team_a, team_b) {
                (Some(_), Some(_)) => {}
                (Some(sole), None) | (None, Some(sole)) => {
                    let position = rounds[r][p].position;
                    let m = &mut rounds[r][p];
                    m.status = MatchStatus::Walkover;
                    m.winner = Some(sole);
                    m.completed_at = Some(now);
                    if r + 1 < rounds.len() {
                        let succ = &mut rounds[r + 1][p / 2];
                        match feeding_side(position) {
                            Side::A => succ.team_a = Some(sole),
                            Side::B => succ.team_b = Some(sole),
                        }
                    }
                }
                (None, None) => {
                    let m = &mut rounds[r][p];
                    m.status = MatchStatus::Cancelled;
                    m.completed_at = Some(now);
                }
            }
        }
    }
}

/// Which successor side a source match feeds: odd positions into A,
/// even into B. Must agree with the wiring in `draw_bracket`.
pub fn feeding_side(position: u32) -> Side {
    if position % 2 == 1 {
        Side::A
    } else {
        Side::B
    }
}

/// Delete the bracket so the draw can be repeated.
///
/// Refused once any match is live or completed; auto-resolved byes alone
/// do not block a re-draw. Returns the number of deleted matches.
pub fn reset_bracket(competition: &mut Competition) -> Result<usize, CompetitionError> {
    if competition.kind != CompetitionKind::Cup {
        return Err(CompetitionError::WrongCompetitionType);
    }
    let blocked = competition
        .matches
        .iter()
        .any(|m| matches!(m.status, MatchStatus::Live | MatchStatus::Completed));
    if blocked {
        return Err(CompetitionError::ActiveOrCompletedMatchesExist);
    }
    let deleted = competition.matches.len();
    competition.matches.clear();
    log::info!(
        "Reset bracket for competition {}: {} matches deleted",
        competition.id,
        deleted
    );
    Ok(deleted)
}
