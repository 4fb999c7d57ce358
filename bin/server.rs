// Witness Rollup - Web Server
// REST API over a rollup built once at startup

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use witness_rollup::{
    load_exclusion_list, load_hearings, open_database, Chamber, HearingRecord, NormalizedIdentity,
    Rollup, RollupConfig, RollupEngine, RollupStats, WitnessQuery,
};

#[derive(Parser)]
#[command(name = "witness-server", version, about = "Serve a witness rollup over HTTP")]
struct ServerArgs {
    /// Hearing store built by `witness-rollup import`
    #[arg(long)]
    db: PathBuf,

    #[arg(long)]
    exclude: Option<PathBuf>,

    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "0.0.0.0:3000")]
    addr: String,
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    engine: Arc<RollupEngine>,
    hearings: Arc<Vec<HearingRecord>>,
    rollup: Arc<Rollup>,
}

impl AppState {
    fn build(engine: RollupEngine, hearings: Vec<HearingRecord>, excluded_names: &[String]) -> Self {
        let excluded = engine.exclusion_set(excluded_names);
        let rollup = engine.run(&hearings, &excluded);
        AppState {
            engine: Arc::new(engine),
            hearings: Arc::new(hearings),
            rollup: Arc::new(rollup),
        }
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

fn not_found(message: String) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse {
            success: false,
            data: (),
            error: Some(message),
        }),
    )
        .into_response()
}

/// One page of witnesses plus the number matching before paging
#[derive(Serialize)]
struct WitnessPage<'a> {
    total: usize,
    offset: usize,
    witnesses: Vec<&'a NormalizedIdentity>,
}

#[derive(Deserialize)]
struct HearingFilter {
    chamber: Option<Chamber>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/stats - Rollup statistics
async fn get_stats(State(state): State<AppState>) -> Json<ApiResponse<RollupStats>> {
    Json(ApiResponse::ok(state.rollup.stats.clone()))
}

/// GET /api/witnesses - Filtered, paged witness list
async fn get_witnesses(
    State(state): State<AppState>,
    Query(query): Query<WitnessQuery>,
) -> Response {
    let normalizer = state.engine.normalizer();

    let unpaged = WitnessQuery {
        offset: 0,
        limit: None,
        ..query.clone()
    };
    let total = unpaged.apply(&state.rollup.witnesses, normalizer).len();
    let witnesses = query.apply(&state.rollup.witnesses, normalizer);

    let page = WitnessPage {
        total,
        offset: query.offset,
        witnesses,
    };
    Json(ApiResponse::ok(page)).into_response()
}

/// GET /api/witnesses/:id - One witness with every counted hearing
async fn get_witness(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.rollup.find_by_id(&id) {
        Some(witness) => Json(ApiResponse::ok(witness)).into_response(),
        None => not_found(format!("No witness with id {}", id)),
    }
}

/// GET /api/hearings - Hearings in the loaded corpus
async fn get_hearings(
    State(state): State<AppState>,
    Query(filter): Query<HearingFilter>,
) -> Response {
    let hearings: Vec<&HearingRecord> = state
        .hearings
        .iter()
        .filter(|h| filter.chamber.map_or(true, |c| h.chamber == c))
        .collect();

    Json(ApiResponse::ok(hearings)).into_response()
}

/// GET /api/hearings/:id/witnesses - Surviving witnesses at one hearing
async fn get_hearing_witnesses(
    State(state): State<AppState>,
    Path(hearing_id): Path<String>,
) -> Response {
    if !state.hearings.iter().any(|h| h.id == hearing_id) {
        return not_found(format!("No hearing with id {}", hearing_id));
    }

    let witnesses = state.rollup.witnesses_for_hearing(&hearing_id);
    Json(ApiResponse::ok(witnesses)).into_response()
}

fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/stats", get(get_stats))
        .route("/witnesses", get(get_witnesses))
        .route("/witnesses/:id", get(get_witness))
        .route("/hearings", get(get_hearings))
        .route("/hearings/:id/witnesses", get(get_hearing_witnesses))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = ServerArgs::parse();

    if !args.db.exists() {
        anyhow::bail!(
            "Database not found at {:?}; run `witness-rollup import` first",
            args.db
        );
    }

    let config = match &args.config {
        Some(path) => RollupConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {:?}", path))?,
        None => RollupConfig::default(),
    };
    let engine = RollupEngine::new(config)?;

    let conn = open_database(&args.db)?;
    let hearings = load_hearings(&conn)?;
    info!(db = ?args.db, hearings = hearings.len(), "database opened");

    let excluded_names = match &args.exclude {
        Some(path) => load_exclusion_list(path)?,
        None => Vec::new(),
    };

    let state = AppState::build(engine, hearings, &excluded_names);
    info!("{}", state.rollup.stats.summary());

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&args.addr)
        .await
        .with_context(|| format!("Failed to bind to {}", args.addr))?;

    info!(addr = %args.addr, "server running");

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let hearings = vec![
            HearingRecord::new("1", Chamber::House, "Energy")
                .with_committee("Energy and Commerce")
                .with_witness("Dr. Jane A. Doe")
                .with_witness("Rep. John Smith (R-TX)"),
            HearingRecord::new("2", Chamber::Senate, "Banking")
                .with_witness("Jane Doe")
                .with_witness("Grace Hopper"),
        ];
        AppState::build(RollupEngine::default(), hearings, &["Grace Hopper".to_string()])
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = build_router(test_state())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], "OK");
    }

    #[tokio::test]
    async fn test_stats_reports_exclusions() {
        let (_, body) = get_json("/api/stats").await;
        let stats = &body["data"];
        assert_eq!(stats["hearings_processed"], 2);
        assert_eq!(stats["witnesses_included"], 1);
        assert_eq!(stats["excluded"]["party_affiliation"], 1);
        assert_eq!(stats["excluded"]["excluded_identity"], 1);
    }

    #[tokio::test]
    async fn test_witness_list_and_detail() {
        let (status, body) = get_json("/api/witnesses?q=doe&limit=10").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total"], 1);

        let witness = &body["data"]["witnesses"][0];
        assert_eq!(witness["key"], "jane doe");
        assert_eq!(witness["appearance_count"], 2);

        let id = witness["id"].as_str().unwrap().to_string();
        let (status, body) = get_json(&format!("/api/witnesses/{}", id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["display_name"], "Dr. Jane A. Doe");
    }

    #[tokio::test]
    async fn test_unknown_ids_are_404() {
        let (status, body) = get_json("/api/witnesses/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);

        let (status, _) = get_json("/api/hearings/999/witnesses").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_hearings_by_chamber() {
        let (_, body) = get_json("/api/hearings?chamber=senate").await;
        let hearings = body["data"].as_array().unwrap();
        assert_eq!(hearings.len(), 1);
        assert_eq!(hearings[0]["id"], "2");

        let (_, body) = get_json("/api/hearings/1/witnesses").await;
        let witnesses = body["data"].as_array().unwrap();
        assert_eq!(witnesses.len(), 1);
        assert_eq!(witnesses[0]["key"], "jane doe");
    }
}
