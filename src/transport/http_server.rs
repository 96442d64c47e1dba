use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::cors::{Any, CorsLayer};

use crate::server::AppState;
use crate::transport::routes::{files, info, sessions, stream};

pub fn router(state: Arc<AppState>) -> Router {
    let max_upload_bytes = state.config.storage.max_upload_mb * 1024 * 1024;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::HEAD,
            Method::OPTIONS,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/upload", post(files::upload))
        .route("/files", get(files::list_files))
        .route("/files/{name}", delete(files::delete_file))
        .route("/stream/{name}/manifest", get(stream::get_manifest))
        .route(
            "/stream/{name}/segment/{segment}",
            get(stream::get_segment),
        )
        .route("/stream/{name}/{segment}", get(stream::get_direct_segment))
        .route("/sessions", get(sessions::list_sessions))
        .route(
            "/sessions/{key}",
            get(sessions::get_session)
                .patch(sessions::patch_session)
                .delete(sessions::delete_session),
        )
        .route("/info", get(info::get_info))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
