use crate::config::Config;
use crate::models::{results_of, HomeBundle, SearchResults, TrailerKey};
use crate::tmdb::{self, ProxyError, TmdbApi, TmdbClient};
use crate::trailer::{select_trailer, videos_from};
use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

const ACTION_GENRE: &str = "28";
const COMEDY_GENRE: &str = "35";
const POPULAR_FIRST: &str = "popularity.desc";

#[derive(Clone)]
pub struct AppState {
    pub tmdb: Arc<dyn TmdbApi>,
}

/// Route-level failure: always a 500 with the route message and the upstream detail.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: &'static str,
    pub detail: String,
}

impl ApiError {
    fn new(error: &'static str, cause: ProxyError) -> Self {
        error!("{}: {}", error, cause);
        Self {
            error,
            detail: cause.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}

pub async fn run_server(config: Config) -> Result<()> {
    let tmdb: Arc<dyn TmdbApi> = Arc::new(TmdbClient::from_config(&config)?);
    let app = build_router(AppState { tmdb })
        .layer(cors_layer(&config.cors_origin)?)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/home", get(home))
        .route("/search", get(search))
        .route("/movie/:id", get(movie))
        .route("/movie/:id/trailer", get(trailer))
        .with_state(state);
    Router::new().nest("/api", api)
}

pub fn cors_layer(origin: &str) -> Result<CorsLayer> {
    let origin = HeaderValue::from_str(origin)
        .with_context(|| format!("CORS_ORIGIN is not a valid header value: '{}'", origin))?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_methods([Method::GET]))
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

async fn home(State(state): State<AppState>) -> Result<Json<HomeBundle<Value>>, ApiError> {
    let tmdb = &state.tmdb;
    let (trending, top_rated, action, comedy) = tokio::try_join!(
        tmdb.call("/trending/movie/week", &[]),
        tmdb.call("/movie/top_rated", &[]),
        tmdb.call(
            "/discover/movie",
            &[("with_genres", ACTION_GENRE), ("sort_by", POPULAR_FIRST)],
        ),
        tmdb.call(
            "/discover/movie",
            &[("with_genres", COMEDY_GENRE), ("sort_by", POPULAR_FIRST)],
        ),
    )
    .map_err(|e| ApiError::new("Failed to load home", e))?;

    Ok(Json(HomeBundle {
        trending: results_of(trending),
        top_rated: results_of(top_rated),
        action: results_of(action),
        comedy: results_of(comedy),
    }))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResults<Value>>, ApiError> {
    let term = params.q.trim();
    if term.is_empty() {
        return Ok(Json(SearchResults {
            results: Vec::new(),
        }));
    }

    let data = state
        .tmdb
        .call("/search/movie", &[("query", term), ("include_adult", "false")])
        .await
        .map_err(|e| ApiError::new("Search failed", e))?;
    Ok(Json(SearchResults {
        results: results_of(data),
    }))
}

async fn movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .tmdb
        .call(&tmdb::movie_path(&id, ""), &[])
        .await
        .map(Json)
        .map_err(|e| ApiError::new("Movie failed", e))
}

async fn trailer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TrailerKey>, ApiError> {
    let payload = state
        .tmdb
        .call(&tmdb::movie_path(&id, "/videos"), &[])
        .await
        .map_err(|e| ApiError::new("Trailer failed", e))?;
    let videos = videos_from(&payload);
    Ok(Json(TrailerKey {
        key: select_trailer(&videos).map(str::to_string),
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        term.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
