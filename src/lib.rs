pub mod changes;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod extract;
pub mod id_allocator;
pub mod messages;
pub mod models;
pub mod query;
pub mod repository;
pub mod routes;
pub mod templates;
pub mod uploads;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{config::Config, repository::MovieRepository, uploads::UploadStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub movies: MovieRepository,
    pub uploads: UploadStore,
}

pub fn router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);
    let images = ServeDir::new(state.uploads.dir());
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(routes::index))
        .route("/create", post(routes::create))
        .route("/read", get(routes::search))
        .route("/read/for/update", get(routes::find_by_id_fragment))
        .route("/read/for/delete", get(routes::find_by_id_fragment))
        .route("/update", put(routes::update))
        .route("/delete", delete(routes::delete))
        .route("/delete/all", delete(routes::delete_all))
        .nest_service("/images", images)
        .fallback_service(static_files)
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any).allow_methods(Any))
        .layer(TraceLayer::new_for_http())
}
