//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{infrastructure::dto::http::BrokerStatsDto, ui::state::AppState};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Debug endpoint to get current broker load (for testing purposes)
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<BrokerStatsDto> {
    let stats = state.get_stats_usecase.execute().await;

    // Domain Model から DTO への変換
    Json(BrokerStatsDto {
        waiting_video: stats.waiting_video,
        waiting_text: stats.waiting_text,
        active_sessions: stats.active_sessions,
    })
}
