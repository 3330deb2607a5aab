//! Health check endpoint.

use actix_web::{HttpResponse, web};
use quad_infra::moderation::ModerationStats;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    pub moderation: ModerationStats,
}

/// Health check endpoint - returns server status and moderation queue depth.
///
/// GET /health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let response = HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        moderation: state.moderation.stats(),
    };

    HttpResponse::Ok().json(response)
}
