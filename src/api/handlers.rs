use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::collections::HashMap;

use crate::core::metrics;
use crate::core::redis::RedisHealth;
use crate::core::state::AppState;
use crate::schemas::{HealthResponse, RootResponse};

pub(crate) async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    let api = state.settings().api();
    Json(RootResponse {
        message: api.project_name.clone(),
        version: api.version.clone(),
        api_prefix: api.api_v1_str.clone(),
    })
}

/// Redis only backs login rate limiting, so losing it degrades the service;
/// losing the database makes it unhealthy.
fn overall_status(database: &Result<(), String>, redis: &RedisHealth) -> &'static str {
    match (database, redis) {
        (Err(_), _) => "unhealthy",
        (Ok(()), RedisHealth::Unhealthy(_)) => "degraded",
        (Ok(()), _) => "healthy",
    }
}

pub(crate) async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = sqlx::query("SELECT 1")
        .execute(state.db())
        .await
        .map(|_| ())
        .map_err(|err| err.to_string());
    let redis = state.redis().health().await;

    let status = overall_status(&database, &redis);

    let mut components = HashMap::new();
    components.insert(
        "database".to_string(),
        match &database {
            Ok(()) => "healthy".to_string(),
            Err(err) => format!("unhealthy: {err}"),
        },
    );
    components.insert(
        "redis".to_string(),
        match &redis {
            RedisHealth::Healthy => "healthy".to_string(),
            RedisHealth::Disconnected => "disconnected".to_string(),
            RedisHealth::Unhealthy(err) => format!("unhealthy: {err}"),
        },
    );

    if status != "healthy" {
        tracing::warn!(status, ?components, "Health check failed");
    }

    Json(HealthResponse { service: "ilaw-api".to_string(), status: status.to_string(), components })
}

pub(crate) async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    if !state.settings().telemetry().prometheus_enabled {
        return StatusCode::NOT_FOUND.into_response();
    }

    match metrics::render() {
        Some(body) => ([(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
            .into_response(),
        None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redis_outage_only_degrades() {
        assert_eq!(overall_status(&Ok(()), &RedisHealth::Healthy), "healthy");
        assert_eq!(overall_status(&Ok(()), &RedisHealth::Disconnected), "healthy");
        assert_eq!(
            overall_status(&Ok(()), &RedisHealth::Unhealthy("timeout".to_string())),
            "degraded"
        );
        assert_eq!(
            overall_status(&Err("refused".to_string()), &RedisHealth::Healthy),
            "unhealthy"
        );
    }
}
