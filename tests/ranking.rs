//! Integration tests for the standings computation.

use chrono::{DateTime, TimeZone, Utc};
use competition_engine::{
    apply_score_delta, compute_ranking, control_clock, schedule_match, ClockAction,
    Competition, CompetitionError, CompetitionKind, GameMode, MatchRules, Team, TeamId,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 18, 0, 0).unwrap()
}

fn league_rules() -> MatchRules {
    // Manual ending only, so any scoreline (including draws) can be played out.
    MatchRules {
        game_mode: GameMode::Timed,
        auto_end: false,
        ..MatchRules::default()
    }
}

fn league(names: &[&str]) -> (Competition, Vec<TeamId>) {
    let teams: Vec<Team> = names.iter().map(|n| Team::new(*n)).collect();
    let ids = teams.iter().map(|t| t.id).collect();
    let c = Competition::with_teams("League", CompetitionKind::League, league_rules(), teams, now());
    (c, ids)
}

/// Schedule and complete a match with the given final score.
fn play(c: &mut Competition, a: TeamId, b: TeamId, score_a: u32, score_b: u32) {
    let id = schedule_match(c, a, b, now()).unwrap();
    for _ in 0..score_a {
        apply_score_delta(c, id, a, 1, now()).unwrap();
    }
    for _ in 0..score_b {
        apply_score_delta(c, id, b, 1, now()).unwrap();
    }
    control_clock(c, id, ClockAction::End, None, now()).unwrap();
}

#[test]
fn ranking_is_league_only() {
    let teams = vec![Team::new("One"), Team::new("Two")];
    let cup = Competition::with_teams("Cup", CompetitionKind::Cup, MatchRules::default(), teams, now());
    assert_eq!(
        compute_ranking(&cup),
        Err(CompetitionError::WrongCompetitionType)
    );
}

#[test]
fn table_accumulates_results_with_default_points() {
    let (mut c, ids) = league(&["Alpha", "Beta", "Gamma"]);
    let (alpha, beta, gamma) = (ids[0], ids[1], ids[2]);
    play(&mut c, alpha, beta, 3, 1);
    play(&mut c, beta, gamma, 2, 2);
    play(&mut c, alpha, gamma, 2, 0);

    let table = compute_ranking(&c).unwrap();
    assert_eq!(table.len(), 3);

    let top = &table[0];
    assert_eq!((top.team, top.position), (alpha, 1));
    assert_eq!((top.played, top.wins, top.draws, top.losses), (2, 2, 0, 0));
    assert_eq!((top.points_for, top.points_against), (5, 1));
    assert_eq!((top.point_difference, top.points), (4, 6));

    // Beta and Gamma: 1 point each, both -2 difference; Beta scored 3 to
    // Gamma's 2, so points_for decides.
    assert_eq!(table[1].team, beta);
    assert_eq!((table[1].points, table[1].point_difference, table[1].points_for), (1, -2, 3));
    assert_eq!(table[2].team, gamma);
    assert_eq!((table[2].points, table[2].point_difference, table[2].points_for), (1, -2, 2));
    assert_eq!(table[2].position, 3);
}

#[test]
fn played_breaks_the_last_tie() {
    // P: three draws (2-2, 1-1, 1-1)  -> 3 pts, diff 0, for 4, played 3
    // Q: one win 2-1, one loss 2-3    -> 3 pts, diff 0, for 4, played 2
    let (mut c, ids) = league(&["P", "Q", "R", "S"]);
    let (p, q, r, s) = (ids[0], ids[1], ids[2], ids[3]);
    play(&mut c, p, r, 2, 2);
    play(&mut c, p, s, 1, 1);
    play(&mut c, p, r, 1, 1);
    play(&mut c, q, r, 2, 1);
    play(&mut c, q, s, 2, 3);

    let table = compute_ranking(&c).unwrap();
    let pos = |team| table.iter().position(|e| e.team == team).unwrap();
    assert_eq!(table[pos(p)].points, table[pos(q)].points);
    assert_eq!(table[pos(p)].point_difference, table[pos(q)].point_difference);
    assert_eq!(table[pos(p)].points_for, table[pos(q)].points_for);
    assert!(pos(p) < pos(q), "more matches played ranks first");
}

#[test]
fn ranking_is_deterministic_and_idempotent() {
    let (mut c, ids) = league(&["Alpha", "Beta", "Gamma", "Delta"]);
    play(&mut c, ids[0], ids[1], 4, 2);
    play(&mut c, ids[2], ids[3], 1, 1);
    play(&mut c, ids[0], ids[2], 0, 3);

    let first = compute_ranking(&c).unwrap();
    let second = compute_ranking(&c).unwrap();
    assert_eq!(first, second);
    for (i, e) in first.iter().enumerate() {
        assert_eq!(e.position, i as u32 + 1);
    }
}

#[test]
fn unplayed_and_open_matches_do_not_count() {
    let (mut c, ids) = league(&["Alpha", "Beta"]);
    let (alpha, beta) = (ids[0], ids[1]);

    // Scheduled but never completed.
    let open = schedule_match(&mut c, alpha, beta, now()).unwrap();
    apply_score_delta(&mut c, open, alpha, 3, now()).unwrap();

    let table = compute_ranking(&c).unwrap();
    assert!(table.iter().all(|e| e.played == 0 && e.points == 0));
    assert_eq!(table.len(), 2);
}

#[test]
fn configured_point_values_are_used() {
    let rules = MatchRules {
        points_win: 2,
        points_draw: 0,
        ..league_rules()
    };
    let teams = vec![Team::new("Alpha"), Team::new("Beta")];
    let (alpha, beta) = (teams[0].id, teams[1].id);
    let mut c = Competition::with_teams("League", CompetitionKind::League, rules, teams, now());
    play(&mut c, alpha, beta, 1, 0);
    play(&mut c, alpha, beta, 1, 1);

    let table = compute_ranking(&c).unwrap();
    assert_eq!(table[0].team, alpha);
    assert_eq!(table[0].points, 2);
    assert_eq!(table[1].points, 0);
}
