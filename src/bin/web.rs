//! Single binary web server: JSON REST API over the competition engine.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default so the app is reachable via DNS on a VPS.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080).
//!
//! Clients poll GET /api/competitions/{id}; match snapshots carry the
//! recomputed clock so no server-side ticker is needed. Authorization is
//! handled upstream (reverse proxy / gateway); handlers trust the caller.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::Utc;
use competition_engine::{
    apply_score_delta, cancel_match, compute_ranking, control_clock, declare_walkover,
    draw_bracket, remove_match, reset_bracket, schedule_match, ClockAction, Competition,
    CompetitionError, CompetitionId, CompetitionKind, GameMatch, MatchRules, Team,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Per-competition entry: competition data + last activity time (for auto-cleanup).
struct CompetitionEntry {
    competition: Competition,
    last_activity: Instant,
}

/// In-memory state: many competitions by ID. Entries are removed after 12h inactivity.
/// The write lock serializes all mutation, so draws are at-most-once, bracket
/// creation is all-or-nothing to readers, and score deltas never interleave.
type AppState = Data<RwLock<HashMap<CompetitionId, CompetitionEntry>>>;

/// Inactivity threshold: competitions not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateCompetitionBody {
    name: String,
    #[serde(default)]
    kind: CompetitionKind,
    #[serde(default)]
    rules: MatchRules,
}

#[derive(Deserialize)]
struct AddTeamBody {
    name: String,
    #[serde(default)]
    players: Vec<String>,
}

#[derive(Deserialize)]
struct DrawBody {
    /// Optional fixed seed; a fresh random one is used when absent.
    seed: Option<u64>,
}

#[derive(Deserialize)]
struct ScheduleMatchBody {
    team_a: Uuid,
    team_b: Uuid,
}

#[derive(Deserialize)]
struct ScoreBody {
    team_id: Uuid,
    delta: i32,
}

#[derive(Deserialize)]
struct ClockBody {
    action: ClockAction,
    explicit_secs: Option<u64>,
}

#[derive(Deserialize)]
struct WalkoverBody {
    winner: Uuid,
}

/// Path segment: competition id (e.g. /api/competitions/{id})
#[derive(Deserialize)]
struct CompetitionPath {
    id: CompetitionId,
}

/// Path segments: competition id and team id.
#[derive(Deserialize)]
struct CompetitionTeamPath {
    id: CompetitionId,
    team_id: Uuid,
}

/// Path segments: competition id and match id.
#[derive(Deserialize)]
struct CompetitionMatchPath {
    id: CompetitionId,
    match_id: Uuid,
}

/// Map engine errors onto HTTP statuses per the error taxonomy:
/// validation 400, precondition/lifecycle 409, lookups 404, structural 500.
fn error_response(e: &CompetitionError) -> HttpResponse {
    use CompetitionError::*;
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        TooFewTeams { .. } | WrongCompetitionType | InvalidDelta(_) | DuplicateTeamName
        | TeamsIdentical | TeamNotInMatch(_) => HttpResponse::BadRequest().json(body),
        AlreadyDrawn | WrongLifecycleState | MatchTerminal | ActiveOrCompletedMatchesExist
        | MatchProtected => HttpResponse::Conflict().json(body),
        MatchNotFound(_) | TeamNotFound(_) => HttpResponse::NotFound().json(body),
        SuccessorNotFound(_) | MatchNotCompleted(_) => {
            log::error!("structural error surfaced to client: {}", e);
            HttpResponse::InternalServerError().json(body)
        }
    }
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No competition" }))
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

/// Match snapshot for responses: the match plus its recomputed elapsed
/// seconds, so pollers never depend on a server-side ticker.
fn match_snapshot(m: &GameMatch) -> serde_json::Value {
    let elapsed = m.clock.effective_elapsed(m.status, Utc::now());
    serde_json::json!({ "match": m, "elapsed_secs": elapsed })
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "competition-engine",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Create a new competition (returns it with id; client stores id for subsequent requests).
#[post("/api/competitions")]
async fn api_create_competition(state: AppState, body: Json<CreateCompetitionBody>) -> HttpResponse {
    let competition = Competition::new(body.name.trim(), body.kind, body.rules, Utc::now());
    let id = competition.id;
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = CompetitionEntry {
        competition,
        last_activity: Instant::now(),
    };
    let response = HttpResponse::Ok().json(&entry.competition);
    g.insert(id, entry);
    response
}

/// Get a competition by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/competitions/{id}")]
async fn api_get_competition(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(&entry.competition)
        }
        None => not_found(),
    }
}

/// Add a team (before any matches exist).
#[post("/api/competitions/{id}/teams")]
async fn api_add_team(state: AppState, path: Path<CompetitionPath>, body: Json<AddTeamBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    let team = Team::with_players(body.name.trim(), body.players.clone());
    match c.add_team(team) {
        Ok(()) => HttpResponse::Ok().json(c),
        Err(e) => error_response(&e),
    }
}

/// Remove a team by id (before any matches exist).
#[delete("/api/competitions/{id}/teams/{team_id}")]
async fn api_remove_team(state: AppState, path: Path<CompetitionTeamPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    match c.remove_team(path.team_id) {
        Ok(()) => HttpResponse::Ok().json(c),
        Err(e) => error_response(&e),
    }
}

/// Draw the elimination bracket (cup only, once).
#[post("/api/competitions/{id}/draw")]
async fn api_draw_bracket(state: AppState, path: Path<CompetitionPath>, body: Option<Json<DrawBody>>) -> HttpResponse {
    let seed = body
        .as_ref()
        .and_then(|b| b.seed)
        .unwrap_or_else(rand::random);
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    match draw_bracket(c, seed, Utc::now()) {
        Ok(()) => HttpResponse::Ok().json(c),
        Err(e) => error_response(&e),
    }
}

/// Delete the bracket so the draw can be repeated (no live/completed matches).
#[delete("/api/competitions/{id}/draw")]
async fn api_reset_bracket(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    match reset_bracket(c) {
        Ok(deleted) => HttpResponse::Ok().json(serde_json::json!({ "deleted": deleted })),
        Err(e) => error_response(&e),
    }
}

/// Schedule a match by hand (league/single competitions).
#[post("/api/competitions/{id}/matches")]
async fn api_schedule_match(
    state: AppState,
    path: Path<CompetitionPath>,
    body: Json<ScheduleMatchBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    match schedule_match(c, body.team_a, body.team_b, Utc::now()) {
        Ok(match_id) => match c.game(match_id) {
            Some(m) => HttpResponse::Ok().json(match_snapshot(m)),
            None => not_found(),
        },
        Err(e) => error_response(&e),
    }
}

/// Delete a match (refused when live/completed or already fed its successor).
#[delete("/api/competitions/{id}/matches/{match_id}")]
async fn api_remove_match(state: AppState, path: Path<CompetitionMatchPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    match remove_match(c, path.match_id) {
        Ok(()) => HttpResponse::Ok().json(c),
        Err(e) => error_response(&e),
    }
}

/// Apply a score delta to one team of a match.
#[put("/api/competitions/{id}/matches/{match_id}/score")]
async fn api_apply_score(
    state: AppState,
    path: Path<CompetitionMatchPath>,
    body: Json<ScoreBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    match apply_score_delta(c, path.match_id, body.team_id, body.delta, Utc::now()) {
        Ok(()) => match c.game(path.match_id) {
            Some(m) => HttpResponse::Ok().json(match_snapshot(m)),
            None => not_found(),
        },
        Err(e) => error_response(&e),
    }
}

/// Apply a clock action (start/pause/resume/reset/end) to a match.
#[put("/api/competitions/{id}/matches/{match_id}/clock")]
async fn api_control_clock(
    state: AppState,
    path: Path<CompetitionMatchPath>,
    body: Json<ClockBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    match control_clock(c, path.match_id, body.action, body.explicit_secs, Utc::now()) {
        Ok(()) => match c.game(path.match_id) {
            Some(m) => HttpResponse::Ok().json(match_snapshot(m)),
            None => not_found(),
        },
        Err(e) => error_response(&e),
    }
}

/// Resolve a match as a walkover with a declared winner.
#[post("/api/competitions/{id}/matches/{match_id}/walkover")]
async fn api_walkover(
    state: AppState,
    path: Path<CompetitionMatchPath>,
    body: Json<WalkoverBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    match declare_walkover(c, path.match_id, body.winner, Utc::now()) {
        Ok(()) => match c.game(path.match_id) {
            Some(m) => HttpResponse::Ok().json(match_snapshot(m)),
            None => not_found(),
        },
        Err(e) => error_response(&e),
    }
}

/// Cancel a scheduled or live match.
#[post("/api/competitions/{id}/matches/{match_id}/cancel")]
async fn api_cancel_match(state: AppState, path: Path<CompetitionMatchPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    match cancel_match(c, path.match_id, Utc::now()) {
        Ok(()) => match c.game(path.match_id) {
            Some(m) => HttpResponse::Ok().json(match_snapshot(m)),
            None => not_found(),
        },
        Err(e) => error_response(&e),
    }
}

/// Current standings for a league competition (recomputed on every call).
#[get("/api/competitions/{id}/ranking")]
async fn api_ranking(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    match compute_ranking(&entry.competition) {
        Ok(table) => HttpResponse::Ok().json(table),
        Err(e) => error_response(&e),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<CompetitionId, CompetitionEntry>::new()));

    // Background task: every 30 minutes, remove competitions inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive competition(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(favicon)
            .service(api_create_competition)
            .service(api_get_competition)
            .service(api_add_team)
            .service(api_remove_team)
            .service(api_draw_bracket)
            .service(api_reset_bracket)
            .service(api_schedule_match)
            .service(api_remove_match)
            .service(api_apply_score)
            .service(api_control_clock)
            .service(api_walkover)
            .service(api_cancel_match)
            .service(api_ranking)
    })
    .bind(bind)?
    .run()
    .await
}
