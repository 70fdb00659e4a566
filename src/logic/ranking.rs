//! Standings computation for round-robin play.

use crate::models::{Competition, CompetitionError, CompetitionKind, RankingEntry, TeamId};
use std::collections::HashMap;

/// Compute the standings table for a league competition.
///
/// Pure over the team list and the completed matches with both sides
/// resolved: no cached table is read and none is written, so calling this
/// twice on the same competition yields identical output. Points per
/// outcome come from the competition's rules (default 3/1/0).
///
/// Sort order, descending: points, then point difference, then points
/// scored, then matches played. The last two deliberately favor teams
/// that have played and scored more when everything else is level.
pub fn compute_ranking(
    competition: &Competition,
) -> Result<Vec<RankingEntry>, CompetitionError> {
    if competition.kind != CompetitionKind::League {
        return Err(CompetitionError::WrongCompetitionType);
    }
    let rules = competition.rules;

    let mut table: HashMap<TeamId, RankingEntry> = competition
        .teams
        .iter()
        .map(|t| (t.id, RankingEntry::new(t.id, t.name.clone())))
        .collect();

    for m in competition.completed_matches() {
        let (team_a, team_b) = match (m.team_a, m.team_b) {
            (Some(a), Some(b)) => (a, b),
            _ => continue,
        };
        record(&mut table, team_a, m.score_a, m.score_b);
        record(&mut table, team_b, m.score_b, m.score_a);
    }

    let mut entries: Vec<RankingEntry> = table.into_values().collect();
    for e in &mut entries {
        e.point_difference = e.points_for as i64 - e.points_against as i64;
        e.points = e.wins as i64 * rules.points_win as i64
            + e.draws as i64 * rules.points_draw as i64
            + e.losses as i64 * rules.points_loss as i64;
    }
    entries.sort_by(|a, b| {
        (b.points, b.point_difference, b.points_for, b.played)
            .cmp(&(a.points, a.point_difference, a.points_for, a.played))
            .then_with(|| a.name.cmp(&b.name))
    });
    for (i, e) in entries.iter_mut().enumerate() {
        e.position = i as u32 + 1;
    }
    Ok(entries)
}

/// Fold one completed match into a team's row, seen from that team's side.
fn record(table: &mut HashMap<TeamId, RankingEntry>, team: TeamId, own: u32, opp: u32) {
    let e = match table.get_mut(&team) {
        Some(e) => e,
        None => return,
    };
    e.played += 1;
    e.points_for += own;
    e.points_against += opp;
    if own > opp {
        e.wins += 1;
    } else if own < opp {
        e.losses += 1;
    } else {
        e.draws += 1;
    }
}
