//! Leaderboard HTTP API
//!
//! Routes:
//! - `POST /api/save-score`   `{address, score}` -> keeps the best score
//! - `GET  /api/get-records`  `?address=` -> `{worldRecord, personalRecord}`
//! - `GET  /api/scores`       every address and its best
//! - `GET  /health`

use std::env;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, error, middleware, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::store::{ScoreBook, StoreError};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SCORES_FILE: &str = "scores.json";
const DEFAULT_JSON_LIMIT: usize = 4096;

/// Server settings, read from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub scores_file: PathBuf,
    pub json_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            scores_file: PathBuf::from(DEFAULT_SCORES_FILE),
            json_limit: DEFAULT_JSON_LIMIT,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("LEADERBOARD_BIND_ADDR")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            scores_file: env::var("LEADERBOARD_SCORES_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_SCORES_FILE)),
            json_limit: read_env_usize("LEADERBOARD_JSON_LIMIT", DEFAULT_JSON_LIMIT),
        }
    }
}

fn read_env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

/// Shared between workers; the lock makes save-if-higher atomic
#[derive(Clone)]
pub struct AppState {
    book: Arc<Mutex<ScoreBook>>,
}

impl AppState {
    pub fn new(book: ScoreBook) -> Self {
        Self {
            book: Arc::new(Mutex::new(book)),
        }
    }

    fn book(&self) -> MutexGuard<'_, ScoreBook> {
        // A panic mid-request can't leave the map half-updated
        self.book.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Debug, Deserialize)]
struct SaveScoreRequest {
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    score: Option<Value>,
}

impl SaveScoreRequest {
    /// Address and floored score, or None if either is unusable
    fn validate(&self) -> Option<(&str, u64)> {
        let address = self.address.as_deref().map(str::trim).filter(|a| !a.is_empty())?;
        let score = self.score.as_ref()?.as_f64()?;
        if !score.is_finite() || score < 0.0 {
            return None;
        }
        Some((address, score.floor() as u64))
    }
}

#[derive(Debug, Deserialize)]
struct RecordsQuery {
    #[serde(default)]
    address: Option<String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    entries: usize,
}

fn message(status: actix_web::http::StatusCode, text: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "message": text.into() }))
}

fn invalid_data() -> HttpResponse {
    HttpResponse::BadRequest().json(json!({ "message": "Invalid data" }))
}

async fn save_score(state: web::Data<AppState>, body: web::Json<SaveScoreRequest>) -> HttpResponse {
    let Some((address, score)) = body.validate() else {
        return invalid_data();
    };

    match state.book().save_if_higher(address, score) {
        Ok(updated) => {
            if updated {
                log::info!("New best for {}: {}", address, score);
            }
            HttpResponse::Ok().json(json!({ "message": "Score saved" }))
        }
        Err(StoreError::EmptyAddress) => invalid_data(),
        Err(e) => {
            log::error!("Failed to save score for {}: {}", address, e);
            message(
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to save score",
            )
        }
    }
}

async fn get_records(
    state: web::Data<AppState>,
    query: web::Query<RecordsQuery>,
) -> impl Responder {
    let address = query.address.as_deref().unwrap_or_default();
    HttpResponse::Ok().json(state.book().records(address))
}

async fn get_scores(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.book().scores())
}

async fn health(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        service: "dog-runner-leaderboard",
        entries: state.book().len(),
    })
}

/// JSON extractor settings: size limit, and bad bodies answer like bad fields
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            log::debug!("Rejected request body: {}", err);
            error::InternalError::from_response(err, invalid_data()).into()
        })
}

/// Register the leaderboard routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/api/save-score", web::post().to(save_score))
        .route("/api/get-records", web::get().to(get_records))
        .route("/api/scores", web::get().to(get_scores));
}

/// Open the score file and serve until shutdown
pub async fn run(config: ServerConfig) -> std::io::Result<()> {
    let book = ScoreBook::open(&config.scores_file).map_err(|e| {
        std::io::Error::other(format!(
            "failed to open {}: {}",
            config.scores_file.display(),
            e
        ))
    })?;

    log::info!(
        "Leaderboard listening on {} (scores: {}, {} entries)",
        config.bind_addr,
        config.scores_file.display(),
        book.len()
    );

    let state = AppState::new(book);
    let json_limit = config.json_limit;

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(json_config(json_limit))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
