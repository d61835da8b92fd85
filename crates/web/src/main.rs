mod lobby;

use flipseven_core::{Event, RngState, Snapshot};
use flipseven_data::{load_deck_file, load_rules};
use lobby::{Command, Joined, Lobby, LobbyError, Outcome};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tiny_http::{Header, Method, Response, Server, StatusCode};

struct ServerConfig {
    addr: String,
    assets: PathBuf,
    seed: Option<u64>,
    deck: Option<PathBuf>,
}

impl ServerConfig {
    fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let seed = match std::env::var("FLIPSEVEN_SEED") {
            Ok(raw) => Some(raw.trim().parse::<u64>()?),
            Err(_) => None,
        };
        Ok(Self {
            addr: std::env::var("FLIPSEVEN_ADDR").unwrap_or_else(|_| "0.0.0.0:7878".to_string()),
            assets: std::env::var("FLIPSEVEN_ASSETS")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("assets")),
            seed,
            deck: std::env::var("FLIPSEVEN_DECK").ok().map(PathBuf::from),
        })
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = ServerConfig::from_env()?;
    let rules = load_rules(&config.assets)?;
    let scripted_deck = match &config.deck {
        Some(path) => Some(load_deck_file(path)?),
        None => None,
    };
    let rng = match config.seed {
        Some(seed) => RngState::from_seed(seed),
        None => RngState::from_entropy(),
    };
    let lobby = Arc::new(Mutex::new(Lobby::new(rules, rng, scripted_deck)));
    let server = Server::http(config.addr.as_str()).map_err(|e| e as Box<dyn std::error::Error>)?;
    log::info!("flip seven server on http://{}", config.addr);
    for request in server.incoming_requests() {
        if let Err(err) = handle_request(request, lobby.clone()) {
            log::warn!("request error: {err}");
        }
    }
    Ok(())
}

#[derive(Serialize, Default)]
struct ApiResponse {
    ok: bool,
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    conn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    player_id: Option<String>,
    frames: Vec<Snapshot>,
    events: Vec<Event>,
}

impl ApiResponse {
    fn joined(joined: Joined) -> Self {
        Self {
            ok: true,
            code: Some(joined.code),
            conn: Some(joined.conn),
            player_id: Some(joined.player_id),
            frames: joined.outcome.frames,
            events: joined.outcome.events,
            ..Self::default()
        }
    }

    fn outcome(outcome: Outcome) -> Self {
        Self {
            ok: true,
            frames: outcome.frames,
            events: outcome.events,
            ..Self::default()
        }
    }

    fn snapshot(snapshot: Snapshot) -> Self {
        Self {
            ok: true,
            frames: vec![snapshot],
            ..Self::default()
        }
    }

    /// Rejected actions carry no frames; only reportable ones carry a reason.
    fn rejected(err: LobbyError) -> Self {
        log::debug!("action rejected: {err}");
        Self {
            ok: false,
            error: err.is_reported().then(|| err.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Deserialize)]
struct CreateRequest {
    name: String,
    #[serde(default)]
    player_id: Option<String>,
}

#[derive(Deserialize)]
struct JoinRequest {
    code: String,
    name: String,
    #[serde(default)]
    player_id: Option<String>,
}

#[derive(Deserialize)]
struct ActionRequest {
    conn: String,
    #[serde(flatten)]
    command: Command,
}

#[derive(Deserialize)]
struct LeaveRequest {
    conn: String,
}

fn handle_request(
    mut request: tiny_http::Request,
    lobby: Arc<Mutex<Lobby>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let url = request.url().to_string();
    let (path, query) = url.split_once('?').unwrap_or((url.as_str(), ""));
    let method = request.method().clone();
    match (&method, path) {
        (&Method::Get, "/api/state") => {
            let conn = query_param(query, "conn").unwrap_or_default();
            let guard = lobby.lock().map_err(|_| "lobby lock poisoned")?;
            let response = match guard.state(&conn) {
                Ok(snapshot) => ApiResponse::snapshot(snapshot),
                Err(err) => ApiResponse::rejected(err),
            };
            drop(guard);
            respond_json(request, &response)?;
        }
        (&Method::Post, "/api/create") => {
            let body: CreateRequest = read_json(&mut request)?;
            let mut guard = lobby.lock().map_err(|_| "lobby lock poisoned")?;
            let response = match guard.create(&body.name, body.player_id.as_deref()) {
                Ok(joined) => ApiResponse::joined(joined),
                Err(err) => ApiResponse::rejected(err),
            };
            drop(guard);
            respond_json(request, &response)?;
        }
        (&Method::Post, "/api/join") => {
            let body: JoinRequest = read_json(&mut request)?;
            let mut guard = lobby.lock().map_err(|_| "lobby lock poisoned")?;
            let response = match guard.join(&body.code, &body.name, body.player_id.as_deref()) {
                Ok(joined) => {
                    log::info!("{} joined room {}", body.name, joined.code);
                    ApiResponse::joined(joined)
                }
                Err(err) => ApiResponse::rejected(err),
            };
            drop(guard);
            respond_json(request, &response)?;
        }
        (&Method::Post, "/api/action") => {
            let body: ActionRequest = read_json(&mut request)?;
            let mut guard = lobby.lock().map_err(|_| "lobby lock poisoned")?;
            let response = match guard.perform(&body.conn, body.command) {
                Ok(outcome) => ApiResponse::outcome(outcome),
                Err(err) => ApiResponse::rejected(err),
            };
            drop(guard);
            respond_json(request, &response)?;
        }
        (&Method::Post, "/api/leave") => {
            let body: LeaveRequest = read_json(&mut request)?;
            let mut guard = lobby.lock().map_err(|_| "lobby lock poisoned")?;
            let left = guard.leave(&body.conn);
            drop(guard);
            let response = match left {
                Some(left) => ApiResponse {
                    player_id: Some(left.player_id),
                    ..ApiResponse::outcome(left.outcome)
                },
                None => ApiResponse::default(),
            };
            respond_json(request, &response)?;
        }
        _ => {
            let response = Response::empty(StatusCode(404));
            request.respond(response)?;
        }
    }
    Ok(())
}

fn query_param(query: &str, key: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| *name == key)
        .map(|(_, value)| value.to_string())
}

fn read_json<T: serde::de::DeserializeOwned>(
    request: &mut tiny_http::Request,
) -> Result<T, Box<dyn std::error::Error>> {
    let mut body = String::new();
    request.as_reader().read_to_string(&mut body)?;
    Ok(serde_json::from_str(&body)?)
}

fn respond_json(
    request: tiny_http::Request,
    response: &ApiResponse,
) -> Result<(), Box<dyn std::error::Error>> {
    let body = serde_json::to_vec(response)?;
    let header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
        .map_err(|_| "invalid header")?;
    request.respond(Response::from_data(body).with_header(header))?;
    Ok(())
}
