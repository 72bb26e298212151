//! HTTP handlers for monitoring endpoints.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use sqlx::PgPool;

use crate::adapters::mongo::MongoAuditStore;
use crate::adapters::redis::RedisCacheStore;

#[derive(Clone)]
pub struct MonitoringAppState {
    pub pool: PgPool,
    pub redis: RedisCacheStore,
    pub mongo: Arc<MongoAuditStore>,
    pub prometheus: PrometheusHandle,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    components: BTreeMap<&'static str, String>,
}

async fn component_checks(state: &MonitoringAppState) -> (bool, BTreeMap<&'static str, String>) {
    let mut components = BTreeMap::new();
    let mut healthy = true;

    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => {
            components.insert("database", "ok".to_string());
        }
        Err(e) => {
            healthy = false;
            components.insert("database", format!("error: {}", e));
        }
    }

    match state.redis.ping().await {
        Ok(()) => {
            components.insert("redis", "ok".to_string());
        }
        Err(e) => {
            healthy = false;
            components.insert("redis", format!("error: {}", e));
        }
    }

    match state.mongo.ping().await {
        Ok(()) => {
            components.insert("mongo", "ok".to_string());
        }
        Err(e) => {
            healthy = false;
            components.insert("mongo", format!("error: {}", e));
        }
    }

    (healthy, components)
}

/// GET /v1/monitoring/health - full dependency check.
pub async fn health(State(state): State<MonitoringAppState>) -> Response {
    let (healthy, components) = component_checks(&state).await;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = HealthResponse {
        status: if healthy { "ok" } else { "degraded" },
        components,
    };
    (status, Json(body)).into_response()
}

/// GET /v1/monitoring/live - process liveness.
pub async fn live() -> Response {
    (StatusCode::OK, Json(serde_json::json!({"status": "alive"}))).into_response()
}

/// GET /v1/monitoring/ready - readiness gate, same checks as health.
pub async fn ready(state: State<MonitoringAppState>) -> Response {
    health(state).await
}

/// GET /v1/monitoring/metrics - Prometheus scrape text.
pub async fn metrics(State(state): State<MonitoringAppState>) -> Response {
    let body = state.prometheus.render();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response()
}
