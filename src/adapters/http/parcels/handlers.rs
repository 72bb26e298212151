//! HTTP handlers for parcel endpoints.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::application::{
    BindCompanyHandler, GetParcelHandler, ListParcelTypesHandler, ListParcelsHandler,
    ListParcelsQuery, RegisterParcelCommand, RegisterParcelHandler,
};
use crate::domain::{ParcelError, ParcelType};
use crate::ports::{cache_key, CacheStore};

use super::super::error::handle_parcel_error;
use super::super::session::require_session_id;
use super::dto::{
    BindCompanyRequest, BindCompanyResponse, ListParcelsParams, ParcelCreateRequest,
    ParcelCreatedResponse, ParcelDetailResponse, ParcelListResponse,
};

const CREATE_CACHE_TTL_SECS: u64 = 60;
const READ_CACHE_TTL_SECS: u64 = 300;

/// Handler state for the parcel router.
#[derive(Clone)]
pub struct ParcelAppState {
    pub register: Arc<RegisterParcelHandler>,
    pub bind: Arc<BindCompanyHandler>,
    pub detail: Arc<GetParcelHandler>,
    pub list: Arc<ListParcelsHandler>,
    pub types: Arc<ListParcelTypesHandler>,
    pub cache: Arc<dyn CacheStore>,
}

fn parse_parcel_id(raw: &str) -> Result<String, Response> {
    Uuid::parse_str(raw)
        .map(|id| id.to_string())
        .map_err(|_| handle_parcel_error(ParcelError::validation("parcel_id", "must be a UUID")))
}

/// POST /v1/parcels/ - register a parcel.
pub async fn create_parcel(
    State(state): State<ParcelAppState>,
    headers: HeaderMap,
    Json(req): Json<ParcelCreateRequest>,
) -> Response {
    let session_id = match require_session_id(&headers) {
        Ok(s) => s,
        Err(response) => return response,
    };
    if let Err(e) = req.validate() {
        return handle_parcel_error(e);
    }

    let cmd = RegisterParcelCommand {
        session_id: session_id.clone(),
        name: req.name,
        weight_kg: req.weight_kg,
        type_id: req.type_id,
        cost_adjustment_usd: req.cost_adjustment_usd,
    };

    match state.register.handle(cmd).await {
        Ok(result) => {
            let key = cache_key(&["parcels", &session_id, &result.parcel_id]);
            match serde_json::to_string(&result.payload) {
                Ok(json) => {
                    if let Err(e) = state.cache.set_ex(&key, &json, CREATE_CACHE_TTL_SECS).await {
                        warn!(key = %key, error = %e, "failed to cache created parcel");
                    }
                }
                Err(e) => warn!(error = %e, "failed to serialize created parcel for cache"),
            }

            let response = ParcelCreatedResponse {
                parcel_id: result.parcel_id,
                message: "Parcel successfully registered".to_string(),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => handle_parcel_error(e),
    }
}

/// GET /v1/parcels/all - list the session's parcels.
pub async fn get_all_parcels(
    State(state): State<ParcelAppState>,
    headers: HeaderMap,
    Query(params): Query<ListParcelsParams>,
) -> Response {
    let session_id = match require_session_id(&headers) {
        Ok(s) => s,
        Err(response) => return response,
    };
    if let Err(e) = params.validate() {
        return handle_parcel_error(e);
    }

    let key = cache_key(&[
        "parcels",
        &session_id,
        &format!("offset={}", params.offset),
        &format!("limit={}", params.limit),
        &format!(
            "type={}",
            params.type_id.map_or("all".to_string(), |t| t.to_string())
        ),
        &format!("has_price={}", params.has_delivery_price),
    ]);

    if let Some(cached) = read_cached::<ParcelListResponse>(&state.cache, &key).await {
        return (StatusCode::OK, Json(cached)).into_response();
    }

    let query = ListParcelsQuery {
        session_id,
        type_id: params.type_id,
        has_delivery_price: params.has_delivery_price,
        limit: params.limit,
        offset: params.offset,
    };

    match state.list.handle(query).await {
        Ok(list) => {
            let response = ParcelListResponse {
                items: list.items.into_iter().map(Into::into).collect(),
                total: list.total,
            };

            // Only the first page is worth caching.
            if params.offset == 0 {
                write_cached(&state.cache, &key, &response, READ_CACHE_TTL_SECS).await;
            }

            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_parcel_error(e),
    }
}

/// GET /v1/parcels/parcels-types/ - list the parcel type dictionary.
pub async fn get_parcel_types(State(state): State<ParcelAppState>) -> Response {
    let key = cache_key(&["parcel_types", "all"]);

    if let Some(cached) = read_cached::<Vec<ParcelType>>(&state.cache, &key).await {
        return (StatusCode::OK, Json(cached)).into_response();
    }

    match state.types.handle().await {
        Ok(types) => {
            write_cached(&state.cache, &key, &types, READ_CACHE_TTL_SECS).await;
            (StatusCode::OK, Json(types)).into_response()
        }
        Err(e) => handle_parcel_error(e),
    }
}

/// GET /v1/parcels/:parcel_id - parcel detail.
pub async fn get_parcel_detail(
    State(state): State<ParcelAppState>,
    Path(parcel_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let session_id = match require_session_id(&headers) {
        Ok(s) => s,
        Err(response) => return response,
    };
    let parcel_id = match parse_parcel_id(&parcel_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let key = cache_key(&["parcels", &session_id, &parcel_id]);
    if let Some(cached) = read_cached::<ParcelDetailResponse>(&state.cache, &key).await {
        return (StatusCode::OK, Json(cached)).into_response();
    }

    match state.detail.handle(&parcel_id, &session_id).await {
        Ok(detail) => {
            let response: ParcelDetailResponse = detail.into();
            write_cached(&state.cache, &key, &response, READ_CACHE_TTL_SECS).await;
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_parcel_error(e),
    }
}

/// POST /v1/parcels/:parcel_id/bind-company - bind a transport company.
pub async fn bind_company(
    State(state): State<ParcelAppState>,
    Path(parcel_id): Path<String>,
    Json(req): Json<BindCompanyRequest>,
) -> Response {
    let parcel_id = match parse_parcel_id(&parcel_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    if let Err(e) = req.validate() {
        return handle_parcel_error(e);
    }

    match state.bind.handle(&parcel_id, req.company_id).await {
        Ok(()) => {
            let response = BindCompanyResponse {
                message: "Company bound to parcel".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_parcel_error(e),
    }
}

/// Cache read that treats every failure as a miss.
async fn read_cached<T: serde::de::DeserializeOwned>(
    cache: &Arc<dyn CacheStore>,
    key: &str,
) -> Option<T> {
    match cache.get(key).await {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(key, "cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(key, error = %e, "undecodable cache entry, ignoring");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!(key, error = %e, "cache read failed, falling through");
            None
        }
    }
}

/// Cache write that only logs on failure.
async fn write_cached<T: serde::Serialize>(
    cache: &Arc<dyn CacheStore>,
    key: &str,
    value: &T,
    ttl_secs: u64,
) {
    match serde_json::to_string(value) {
        Ok(json) => {
            if let Err(e) = cache.set_ex(key, &json, ttl_secs).await {
                warn!(key, error = %e, "cache write failed");
            }
        }
        Err(e) => warn!(key, error = %e, "failed to serialize cache value"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryCacheStore;

    #[test]
    fn parcel_id_must_be_uuid() {
        assert!(parse_parcel_id("not-a-uuid").is_err());
        assert!(parse_parcel_id("7e57d004-2b97-44e7-8f00-7f8b3edafc58").is_ok());
    }

    #[tokio::test]
    async fn cache_read_failure_is_a_miss() {
        let store = Arc::new(InMemoryCacheStore::new());
        store.set_failing(true);
        let cache: Arc<dyn CacheStore> = store;

        let result: Option<ParcelListResponse> = read_cached(&cache, "cache:parcels:x").await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn undecodable_cache_entry_is_a_miss() {
        let store = Arc::new(InMemoryCacheStore::new());
        let cache: Arc<dyn CacheStore> = store.clone();
        cache.set_ex("cache:parcels:x", "{broken", 60).await.unwrap();

        let result: Option<ParcelListResponse> = read_cached(&cache, "cache:parcels:x").await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn cache_write_records_the_ttl() {
        let store = Arc::new(InMemoryCacheStore::new());
        let cache: Arc<dyn CacheStore> = store.clone();

        let value = ParcelListResponse {
            items: vec![],
            total: 0,
        };
        write_cached(&cache, "cache:parcels:list", &value, READ_CACHE_TTL_SECS).await;

        assert_eq!(store.ttl_of("cache:parcels:list").await, Some(300));
    }
}
