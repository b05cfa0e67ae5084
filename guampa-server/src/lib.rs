//! guampa-server library
//!
//! HTTP front end of the Guampa translation service: JSON API, form login,
//! and static assets for the browser client.

use axum::Router;
use sqlx::SqlitePool;
use std::path::PathBuf;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod session;

pub use crate::error::{ApiError, ApiResult};
pub use crate::session::{CurrentUser, SessionStore};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Logged-in sessions
    pub sessions: SessionStore,
    /// Root of the browser client (index.html, css/, js/, ...)
    pub app_dir: PathBuf,
}

impl AppState {
    pub fn new(db: SqlitePool, app_dir: impl Into<PathBuf>) -> Self {
        Self {
            db,
            sessions: SessionStore::new(),
            app_dir: app_dir.into(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let json = Router::new()
        .route("/json/documents", get(api::list_documents))
        .route("/json/documents/*tagname", get(api::documents_for_tag))
        .route("/json/tags", get(api::list_tags))
        .route("/json/document/:docid", get(api::document_detail))
        .route("/json/sentencehistory/:sentenceid", get(api::sentence_history))
        .route("/json/currentuser", get(api::current_user))
        .route("/json/login", post(api::json_login))
        .route("/json/logout", get(api::json_logout).post(api::json_logout))
        .route("/json/add_translation", post(api::add_translation))
        .route("/json/add_comment", post(api::add_comment));

    let app_dir = &state.app_dir;

    // index.html and scripts change between deploys; never cache them
    let uncached_assets = Router::new()
        .route_service("/", ServeFile::new(app_dir.join("index.html")))
        .nest_service("/js", ServeDir::new(app_dir.join("js")));

    let assets = Router::new()
        .nest_service("/partials", ServeDir::new(app_dir.join("partials")))
        .nest_service("/css", ServeDir::new(app_dir.join("css")))
        .nest_service("/img", ServeDir::new(app_dir.join("img")))
        .nest_service("/lib", ServeDir::new(app_dir.join("lib")));

    Router::new()
        .merge(api::no_cache(json))
        .merge(api::no_cache(uncached_assets))
        .merge(assets)
        .merge(api::login_routes())
        .merge(api::health_routes())
        .fallback(api::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::resolve_current_user,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
