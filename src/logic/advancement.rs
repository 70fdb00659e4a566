//! Winner advancement: carry a completed match's winner into its successor.

use crate::logic::bracket::feeding_side;
use crate::models::{Competition, CompetitionError, MatchId, Side};

/// Move the winner of a completed match into the right slot of its
/// successor.
///
/// Invoked after every transition into Completed or Walkover. Odd source
/// positions feed side A of the successor, even positions side B (the same
/// convention the draw uses). Idempotent: re-resolving a match writes the
/// same winner into the same slot.
pub fn resolve_advancement(
    competition: &mut Competition,
    match_id: MatchId,
) -> Result<(), CompetitionError> {
    let source = competition
        .game(match_id)
        .ok_or(CompetitionError::MatchNotFound(match_id))?;
    if !source.status.is_terminal() {
        return Err(CompetitionError::MatchNotCompleted(match_id));
    }
    let successor_id = match source.successor_id {
        Some(id) => id,
        // The final, or a league/single match: nowhere to advance to.
        None => return Ok(()),
    };
    let winner = match source.winner {
        Some(w) => w,
        None => {
            // Completed on an exact tie: there is no winner to carry.
            log::warn!(
                "Match {} completed without a winner; successor slot stays empty",
                match_id
            );
            return Ok(());
        }
    };
    let side = feeding_side(source.position);

    let successor = match competition.game_mut(successor_id) {
        Some(m) => m,
        None => {
            log::error!(
                "Bracket corruption: match {} links to missing successor {}",
                match_id,
                successor_id
            );
            return Err(CompetitionError::SuccessorNotFound(successor_id));
        }
    };
    match side {
        Side::A => successor.team_a = Some(winner),
        Side::B => successor.team_b = Some(winner),
    }
    log::debug!(
        "Advanced winner {} of match {} into side {:?} of match {}",
        winner,
        match_id,
        side,
        successor_id
    );
    Ok(())
}
