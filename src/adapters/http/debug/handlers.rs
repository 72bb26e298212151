//! HTTP handlers for debug endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::application::DebugRecalculateHandler;

use super::super::error::handle_parcel_error;

#[derive(Clone)]
pub struct DebugAppState {
    pub recalculate: Arc<DebugRecalculateHandler>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecalculateResponse {
    pub event_id: String,
    pub message: String,
}

/// GET /v1/debug/recalculate - queue a recalculation event.
pub async fn trigger_recalculate(State(state): State<DebugAppState>) -> Response {
    match state.recalculate.handle().await {
        Ok(event_id) => {
            let response = RecalculateResponse {
                event_id,
                message: "Recalculation event queued".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_parcel_error(e),
    }
}
