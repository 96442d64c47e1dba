use axum::response::Json;

use crate::api::Info;

/// GET /info
pub async fn get_info() -> Json<Info> {
    Json(Info {
        version: env!("CARGO_PKG_VERSION").to_string(),
        build_time: env!("BUILD_TIME").parse().unwrap_or(0),
        git_commit: env!("GIT_COMMIT").to_string(),
    })
}
