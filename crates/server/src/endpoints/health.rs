//! # GET /

use axum::Json;
use login_types::StatusResponse;

pub async fn handle_health() -> Json<StatusResponse> {
    Json(StatusResponse::ok())
}
