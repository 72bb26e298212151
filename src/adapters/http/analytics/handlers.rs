//! HTTP handlers for analytics endpoints.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::application::DeliverySummaryHandler;
use crate::ports::DeliveryTotal;

use super::super::error::{handle_parcel_error, ErrorResponse};

#[derive(Clone)]
pub struct AnalyticsAppState {
    pub summary: Arc<DeliverySummaryHandler>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeliverySummaryParams {
    /// Day to aggregate, `YYYY-MM-DD`; defaults to the current UTC day.
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsResponse {
    pub date: String,
    pub group_by: &'static str,
    pub items: Vec<DeliveryTotal>,
}

/// GET /v1/analytics/delivery/summary - delivery cost totals per type for
/// one day.
pub async fn get_delivery_summary(
    State(state): State<AnalyticsAppState>,
    Query(params): Query<DeliverySummaryParams>,
) -> Response {
    let date = match params.date.as_deref() {
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(d) => Some(d),
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::new("Invalid date format. Use YYYY-MM-DD.")),
                )
                    .into_response()
            }
        },
        None => None,
    };

    match state.summary.handle(date).await {
        Ok(summary) => {
            let response = AnalyticsResponse {
                date: summary.date.format("%Y-%m-%dT%H:%M:%S").to_string(),
                group_by: "type",
                items: summary.items,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_parcel_error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_parse_accepts_iso_days() {
        assert!(NaiveDate::parse_from_str("2026-08-01", "%Y-%m-%d").is_ok());
        assert!(NaiveDate::parse_from_str("01-08-2026", "%Y-%m-%d").is_err());
        assert!(NaiveDate::parse_from_str("2026-13-01", "%Y-%m-%d").is_err());
    }

    #[test]
    fn response_serializes_totals_under_type_key() {
        let response = AnalyticsResponse {
            date: "2026-08-01T00:00:00".to_string(),
            group_by: "type",
            items: vec![DeliveryTotal {
                type_id: 1,
                total: 150.5,
            }],
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["items"][0]["type"], 1);
        assert_eq!(value["items"][0]["total"], 150.5);
        assert_eq!(value["group_by"], "type");
    }
}
