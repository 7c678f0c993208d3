//! Single binary web server: REST API over the tournament hub.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT; set TOURNAMENT_SEED
//! for reproducible draws.
//!
//! The caller identifies themselves with an `X-Player-Id` header (a registered player id).

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpRequest, HttpResponse, HttpServer, Responder,
};
use serde::{Deserialize, Serialize};
use tournament_hub::{
    InMemoryNotifier, InMemoryStore, NewTournament, PlayerId, ResultUpdate, RoundLabel,
    ServerConfig, TournamentError, TournamentHub,
};
use uuid::Uuid;

type Hub = TournamentHub<InMemoryStore, InMemoryNotifier>;
type AppState = Data<Hub>;

const CALLER_HEADER: &str = "X-Player-Id";

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct RegisterPlayerBody {
    name: String,
}

#[derive(Deserialize)]
struct JoinBody {
    #[serde(default)]
    join_code: Option<String>,
}

#[derive(Deserialize)]
struct NewMatchBody {
    round: RoundLabel,
    player_1: PlayerId,
    player_2: PlayerId,
}

#[derive(Deserialize)]
struct ReceiverBody {
    receiver: PlayerId,
}

/// Path segment: a record id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct IdPath {
    id: Uuid,
}

/// Path segments: record id and accept/reject style action (e.g. /api/requests/{id}/{action})
#[derive(Deserialize)]
struct ActionPath {
    id: Uuid,
    action: String,
}

fn error_body(message: impl Into<String>) -> serde_json::Value {
    serde_json::json!({ "error": message.into() })
}

fn error_response(e: &TournamentError) -> HttpResponse {
    use TournamentError::*;
    match e {
        Authorization => HttpResponse::Forbidden().json(error_body(e.to_string())),
        TournamentNotFound(_) | MatchNotFound(_) | PlayerNotFound(_) | RequestNotFound(_)
        | InvitationNotFound(_) | FriendshipNotFound(_) => {
            HttpResponse::NotFound().json(error_body(e.to_string()))
        }
        _ => HttpResponse::BadRequest().json(error_body(e.to_string())),
    }
}

fn respond<T: Serialize>(result: Result<T, TournamentError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => {
            log::warn!("Request rejected: {}", e);
            error_response(&e)
        }
    }
}

/// Caller identity from the `X-Player-Id` header.
fn caller(req: &HttpRequest) -> Result<PlayerId, HttpResponse> {
    req.headers()
        .get(CALLER_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| {
            HttpResponse::Unauthorized().json(error_body(format!("Missing {CALLER_HEADER} header")))
        })
}

/// Map an `accept`/`reject` (or `decline`) path action to a bool.
fn accepts(action: &str) -> Option<bool> {
    match action {
        "accept" | "approve" => Some(true),
        "reject" | "decline" => Some(false),
        _ => None,
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tournament-hub",
    })
}

/// Register a player in the directory.
#[post("/api/players")]
async fn api_register_player(state: AppState, body: Json<RegisterPlayerBody>) -> HttpResponse {
    respond(state.register_player(&body.name))
}

/// Player directory.
#[get("/api/players")]
async fn api_list_players(state: AppState) -> HttpResponse {
    HttpResponse::Ok().json(state.players())
}

#[get("/api/players/{id}")]
async fn api_get_player(state: AppState, path: Path<IdPath>) -> HttpResponse {
    respond(state.player(path.id))
}

/// Tournaments visible to the caller.
#[get("/api/tournaments")]
async fn api_list_tournaments(state: AppState, req: HttpRequest) -> HttpResponse {
    match caller(&req) {
        Ok(me) => HttpResponse::Ok().json(state.visible_tournaments(me)),
        Err(resp) => resp,
    }
}

/// Create a tournament; the caller becomes its admin.
#[post("/api/tournaments")]
async fn api_create_tournament(
    state: AppState,
    req: HttpRequest,
    body: Json<NewTournament>,
) -> HttpResponse {
    match caller(&req) {
        Ok(me) => respond(state.create_tournament(me, body.into_inner())),
        Err(resp) => resp,
    }
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(
    state: AppState,
    req: HttpRequest,
    path: Path<IdPath>,
) -> HttpResponse {
    match caller(&req) {
        Ok(me) => respond(state.tournament(me, path.id)),
        Err(resp) => resp,
    }
}

#[delete("/api/tournaments/{id}")]
async fn api_delete_tournament(state: AppState, req: HttpRequest, path: Path<IdPath>) -> HttpResponse {
    match caller(&req) {
        Ok(me) => respond(state.delete_tournament(me, path.id)),
        Err(resp) => resp,
    }
}

/// Join with a code (private) or send a join request (public).
#[post("/api/tournaments/{id}/join")]
async fn api_join(
    state: AppState,
    req: HttpRequest,
    path: Path<IdPath>,
    body: Option<Json<JoinBody>>,
) -> HttpResponse {
    let code = body.as_ref().and_then(|b| b.join_code.clone());
    match caller(&req) {
        Ok(me) => respond(state.join(me, path.id, code.as_deref())),
        Err(resp) => resp,
    }
}

#[get("/api/tournaments/{id}/participants")]
async fn api_participants(state: AppState, path: Path<IdPath>) -> HttpResponse {
    respond(state.participants(path.id))
}

/// Start the tournament (Draft -> Ongoing) and generate fixtures.
#[post("/api/tournaments/{id}/start")]
async fn api_start(state: AppState, req: HttpRequest, path: Path<IdPath>) -> HttpResponse {
    match caller(&req) {
        Ok(me) => respond(state.start(me, path.id)),
        Err(resp) => resp,
    }
}

/// Advance the knockout side by one round, or finish after the final.
#[post("/api/tournaments/{id}/advance")]
async fn api_advance(state: AppState, req: HttpRequest, path: Path<IdPath>) -> HttpResponse {
    match caller(&req) {
        Ok(me) => respond(state.advance_round(me, path.id)),
        Err(resp) => resp,
    }
}

#[get("/api/tournaments/{id}/matches")]
async fn api_matches(state: AppState, path: Path<IdPath>) -> HttpResponse {
    respond(state.matches(path.id))
}

/// Add a league or group match by hand (participants only).
#[post("/api/tournaments/{id}/matches")]
async fn api_create_match(
    state: AppState,
    req: HttpRequest,
    path: Path<IdPath>,
    body: Json<NewMatchBody>,
) -> HttpResponse {
    match caller(&req) {
        Ok(me) => {
            let NewMatchBody { round, player_1, player_2 } = body.into_inner();
            respond(state.create_match(me, path.id, round, player_1, player_2))
        }
        Err(resp) => resp,
    }
}

#[get("/api/tournaments/{id}/standings")]
async fn api_standings(state: AppState, path: Path<IdPath>) -> HttpResponse {
    respond(state.standings(path.id))
}

#[get("/api/tournaments/{id}/stage")]
async fn api_stage(state: AppState, path: Path<IdPath>) -> HttpResponse {
    respond(state.current_stage(path.id))
}

/// Invite a player (admin only).
#[post("/api/tournaments/{id}/invitations")]
async fn api_invite(
    state: AppState,
    req: HttpRequest,
    path: Path<IdPath>,
    body: Json<ReceiverBody>,
) -> HttpResponse {
    match caller(&req) {
        Ok(me) => respond(state.invite(me, path.id, body.receiver)),
        Err(resp) => resp,
    }
}

/// Update a match score / state (admin only).
#[put("/api/matches/{id}")]
async fn api_update_match(
    state: AppState,
    req: HttpRequest,
    path: Path<IdPath>,
    body: Json<ResultUpdate>,
) -> HttpResponse {
    match caller(&req) {
        Ok(me) => respond(state.record_result(me, path.id, body.into_inner())),
        Err(resp) => resp,
    }
}

#[get("/api/requests")]
async fn api_list_requests(state: AppState, req: HttpRequest) -> HttpResponse {
    match caller(&req) {
        Ok(me) => HttpResponse::Ok().json(state.join_requests_for(me)),
        Err(resp) => resp,
    }
}

/// Approve or reject a join request (admin only).
#[post("/api/requests/{id}/{action}")]
async fn api_request_action(state: AppState, req: HttpRequest, path: Path<ActionPath>) -> HttpResponse {
    let me = match caller(&req) {
        Ok(me) => me,
        Err(resp) => return resp,
    };
    match accepts(&path.action) {
        Some(true) => respond(state.approve_request(me, path.id)),
        Some(false) => respond(state.reject_request(me, path.id)),
        None => HttpResponse::BadRequest().json(error_body("Invalid action")),
    }
}

#[get("/api/invitations")]
async fn api_list_invitations(state: AppState, req: HttpRequest) -> HttpResponse {
    match caller(&req) {
        Ok(me) => HttpResponse::Ok().json(state.invitations_for(me)),
        Err(resp) => resp,
    }
}

/// Accept or decline an invitation (receiver only).
#[post("/api/invitations/{id}/{action}")]
async fn api_invitation_action(
    state: AppState,
    req: HttpRequest,
    path: Path<ActionPath>,
) -> HttpResponse {
    let me = match caller(&req) {
        Ok(me) => me,
        Err(resp) => return resp,
    };
    match accepts(&path.action) {
        Some(accept) => respond(state.respond_to_invitation(me, path.id, accept)),
        None => HttpResponse::BadRequest().json(error_body("Invalid action")),
    }
}

#[get("/api/friends")]
async fn api_list_friends(state: AppState, req: HttpRequest) -> HttpResponse {
    match caller(&req) {
        Ok(me) => HttpResponse::Ok().json(state.friendships_for(me)),
        Err(resp) => resp,
    }
}

#[post("/api/friends")]
async fn api_friend_request(
    state: AppState,
    req: HttpRequest,
    body: Json<ReceiverBody>,
) -> HttpResponse {
    match caller(&req) {
        Ok(me) => respond(state.send_friend_request(me, body.receiver)),
        Err(resp) => resp,
    }
}

/// Accept or reject a friend request addressed to the caller.
#[post("/api/friends/{id}/{action}")]
async fn api_friend_action(state: AppState, req: HttpRequest, path: Path<ActionPath>) -> HttpResponse {
    let me = match caller(&req) {
        Ok(me) => me,
        Err(resp) => return resp,
    };
    match accepts(&path.action) {
        Some(accept) => respond(state.respond_to_friend_request(me, path.id, accept)),
        None => HttpResponse::BadRequest().json(error_body("Invalid action")),
    }
}

#[get("/api/notifications")]
async fn api_notifications(state: AppState, req: HttpRequest) -> HttpResponse {
    match caller(&req) {
        Ok(me) => HttpResponse::Ok().json(state.notifier().for_receiver(me)),
        Err(resp) => resp,
    }
}

#[post("/api/notifications/read-all")]
async fn api_notifications_read_all(state: AppState, req: HttpRequest) -> HttpResponse {
    match caller(&req) {
        Ok(me) => {
            state.notifier().mark_all_read(me);
            HttpResponse::Ok().json(serde_json::json!({ "message": "All marked as read" }))
        }
        Err(resp) => resp,
    }
}

#[post("/api/notifications/{id}/read")]
async fn api_notification_read(state: AppState, req: HttpRequest, path: Path<IdPath>) -> HttpResponse {
    match caller(&req) {
        Ok(me) if state.notifier().mark_read(me, path.id) => {
            HttpResponse::Ok().json(serde_json::json!({ "message": "Marked as read" }))
        }
        Ok(_) => HttpResponse::NotFound().json(error_body("Notification not found")),
        Err(resp) => resp,
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    if let Some(seed) = config.seed {
        log::info!("Using fixed draw seed {}", seed);
    }
    let hub = Data::new(TournamentHub::new(
        InMemoryStore::new(),
        InMemoryNotifier::new(),
        config.rng(),
    ));

    log::info!("Starting server at http://{}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(hub.clone())
            .service(api_health)
            .service(api_register_player)
            .service(api_list_players)
            .service(api_get_player)
            .service(api_list_tournaments)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_delete_tournament)
            .service(api_join)
            .service(api_participants)
            .service(api_start)
            .service(api_advance)
            .service(api_matches)
            .service(api_create_match)
            .service(api_standings)
            .service(api_stage)
            .service(api_invite)
            .service(api_update_match)
            .service(api_list_requests)
            .service(api_request_action)
            .service(api_list_invitations)
            .service(api_invitation_action)
            .service(api_list_friends)
            .service(api_friend_request)
            .service(api_friend_action)
            .service(api_notifications)
            .service(api_notifications_read_all)
            .service(api_notification_read)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
