//! Integration tests for the derived match clock. All timestamps are
//! synthetic; nothing here sleeps or reads the wall clock.

use chrono::{DateTime, Duration, TimeZone, Utc};
use competition_engine::{
    apply_score_delta, control_clock, schedule_match, ClockAction, Competition,
    CompetitionError, CompetitionKind, GameMode, MatchId, MatchRules, MatchStatus, Team, TeamId,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 18, 0, 0).unwrap()
}

fn at(secs: i64) -> DateTime<Utc> {
    t0() + Duration::seconds(secs)
}

fn timed_rules(duration_secs: u64, auto_end: bool) -> MatchRules {
    MatchRules {
        game_mode: GameMode::Timed,
        duration_secs,
        auto_end,
        ..MatchRules::default()
    }
}

fn league_with_match(rules: MatchRules) -> (Competition, MatchId, TeamId, TeamId) {
    let teams = vec![Team::new("Home"), Team::new("Away")];
    let (a, b) = (teams[0].id, teams[1].id);
    let mut c = Competition::with_teams("League", CompetitionKind::League, rules, teams, t0());
    let id = schedule_match(&mut c, a, b, t0()).unwrap();
    (c, id, a, b)
}

fn elapsed(c: &Competition, id: MatchId, now: DateTime<Utc>) -> u64 {
    let m = c.game(id).unwrap();
    m.clock.effective_elapsed(m.status, now)
}

#[test]
fn elapsed_is_derived_from_timestamps_between_reads() {
    let (mut c, id, _, _) = league_with_match(timed_rules(5400, false));
    control_clock(&mut c, id, ClockAction::Start, None, t0()).unwrap();
    assert_eq!(c.game(id).unwrap().status, MatchStatus::Live);

    // No writes in between: reads alone advance the effective value.
    assert_eq!(elapsed(&c, id, at(0)), 0);
    assert_eq!(elapsed(&c, id, at(10)), 10);
    assert_eq!(elapsed(&c, id, at(600)), 600);
}

#[test]
fn pause_freezes_and_resume_continues() {
    let (mut c, id, _, _) = league_with_match(timed_rules(5400, false));
    control_clock(&mut c, id, ClockAction::Start, None, t0()).unwrap();
    control_clock(&mut c, id, ClockAction::Pause, None, at(30)).unwrap();

    // Frozen: wall time passing changes nothing.
    assert_eq!(elapsed(&c, id, at(100)), 30);
    assert_eq!(elapsed(&c, id, at(1000)), 30);

    control_clock(&mut c, id, ClockAction::Resume, None, at(100)).unwrap();
    assert_eq!(elapsed(&c, id, at(130)), 60);

    // Monotonic non-decreasing across the whole sequence.
    let reads = [
        elapsed(&c, id, at(130)),
        elapsed(&c, id, at(131)),
        elapsed(&c, id, at(200)),
    ];
    assert!(reads.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn elapsed_never_exceeds_total_duration() {
    let (mut c, id, _, _) = league_with_match(timed_rules(90, false));
    control_clock(&mut c, id, ClockAction::Start, None, t0()).unwrap();
    assert_eq!(elapsed(&c, id, at(89)), 89);
    assert_eq!(elapsed(&c, id, at(90)), 90);
    assert_eq!(elapsed(&c, id, at(10_000)), 90);
}

#[test]
fn pause_and_resume_need_a_started_clock() {
    let (mut c, id, _, _) = league_with_match(timed_rules(90, false));
    assert_eq!(
        control_clock(&mut c, id, ClockAction::Pause, None, t0()),
        Err(CompetitionError::WrongLifecycleState)
    );
    assert_eq!(
        control_clock(&mut c, id, ClockAction::Resume, None, t0()),
        Err(CompetitionError::WrongLifecycleState)
    );
}

#[test]
fn repeated_resume_does_not_rewind_the_clock() {
    let (mut c, id, _, _) = league_with_match(timed_rules(5400, false));
    control_clock(&mut c, id, ClockAction::Start, None, t0()).unwrap();

    // A retried Resume on a running clock changes nothing.
    control_clock(&mut c, id, ClockAction::Resume, None, at(60)).unwrap();
    assert_eq!(elapsed(&c, id, at(90)), 90);

    control_clock(&mut c, id, ClockAction::Pause, None, at(100)).unwrap();
    control_clock(&mut c, id, ClockAction::Resume, None, at(200)).unwrap();
    control_clock(&mut c, id, ClockAction::Resume, None, at(260)).unwrap();
    assert_eq!(elapsed(&c, id, at(300)), 200);
}

#[test]
fn timed_mode_auto_completes_when_time_is_up() {
    let (mut c, id, a, _) = league_with_match(timed_rules(60, true));
    control_clock(&mut c, id, ClockAction::Start, None, t0()).unwrap();
    apply_score_delta(&mut c, id, a, 1, at(30)).unwrap();
    assert_eq!(c.game(id).unwrap().status, MatchStatus::Live);

    // The next event after the duration elapses ends the match.
    apply_score_delta(&mut c, id, a, 1, at(65)).unwrap();
    let m = c.game(id).unwrap();
    assert_eq!(m.status, MatchStatus::Completed);
    assert_eq!(m.winner, Some(a));
    assert_eq!(m.completed_at, Some(at(65)));
    assert_eq!(m.clock.current_secs, 60);
}

#[test]
fn explicit_time_overrides_the_stored_elapsed() {
    let (mut c, id, _, _) = league_with_match(timed_rules(5400, false));
    control_clock(&mut c, id, ClockAction::Start, None, t0()).unwrap();
    control_clock(&mut c, id, ClockAction::Pause, Some(50), at(10)).unwrap();
    assert_eq!(elapsed(&c, id, at(500)), 50);

    // Clamped to the total duration.
    control_clock(&mut c, id, ClockAction::Pause, Some(99_999), at(20)).unwrap();
    assert_eq!(elapsed(&c, id, at(20)), 5400);
}

#[test]
fn reset_returns_the_match_to_scheduled() {
    let (mut c, id, a, _) = league_with_match(timed_rules(5400, false));
    control_clock(&mut c, id, ClockAction::Start, None, t0()).unwrap();
    apply_score_delta(&mut c, id, a, 1, at(5)).unwrap();

    control_clock(&mut c, id, ClockAction::Reset, None, at(60)).unwrap();
    let m = c.game(id).unwrap();
    assert_eq!(m.status, MatchStatus::Scheduled);
    assert_eq!(m.started_at, None);
    assert!(m.clock.is_paused);
    assert_eq!(elapsed(&c, id, at(120)), 0);
}

#[test]
fn end_freezes_the_clock_and_settles_the_winner() {
    let (mut c, id, a, b) = league_with_match(timed_rules(5400, false));
    control_clock(&mut c, id, ClockAction::Start, None, t0()).unwrap();
    apply_score_delta(&mut c, id, a, 2, at(100)).unwrap();
    apply_score_delta(&mut c, id, b, 1, at(200)).unwrap();

    control_clock(&mut c, id, ClockAction::End, None, at(300)).unwrap();
    let m = c.game(id).unwrap();
    assert_eq!(m.status, MatchStatus::Completed);
    assert_eq!(m.winner, Some(a));
    assert_eq!(m.completed_at, Some(at(300)));
    assert_eq!(m.clock.current_secs, 300);
    assert!(m.clock.is_paused);
    // Terminal: the frozen value no longer moves.
    assert_eq!(elapsed(&c, id, at(10_000)), 300);
}
