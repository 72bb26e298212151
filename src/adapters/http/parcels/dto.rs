//! Request/response DTOs for parcel endpoints.

use serde::{Deserialize, Serialize};

use crate::application::ParcelDetail;
use crate::domain::{DeliveryPrice, ParcelError};

/// Body of `POST /v1/parcels/`.
#[derive(Debug, Clone, Deserialize)]
pub struct ParcelCreateRequest {
    pub name: String,
    pub weight_kg: f64,
    pub type_id: i32,
    pub cost_adjustment_usd: f64,
}

impl ParcelCreateRequest {
    pub fn validate(&self) -> Result<(), ParcelError> {
        if self.name.trim().is_empty() {
            return Err(ParcelError::validation("name", "must not be empty"));
        }
        if !(0.01..=100.0).contains(&self.weight_kg) {
            return Err(ParcelError::validation(
                "weight_kg",
                "must be between 0.01 and 100",
            ));
        }
        if !(1..=3).contains(&self.type_id) {
            return Err(ParcelError::validation("type_id", "must be between 1 and 3"));
        }
        if !(0.1..=1e6).contains(&self.cost_adjustment_usd) {
            return Err(ParcelError::validation(
                "cost_adjustment_usd",
                "must be between 0.1 and 1000000",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParcelCreatedResponse {
    pub parcel_id: String,
    pub message: String,
}

/// Detail body shared by the detail and list endpoints.
///
/// `delivery_price_rub` is a number when calculated and the literal
/// "Не рассчитано" otherwise; cached entries without the field deserialize
/// as not-calculated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParcelDetailResponse {
    pub parcel_id: String,
    pub name: String,
    pub weight_kg: f64,
    pub type_id: i32,
    pub cost_adjustment_usd: f64,
    #[serde(default)]
    pub delivery_price_rub: DeliveryPrice,
}

impl From<ParcelDetail> for ParcelDetailResponse {
    fn from(detail: ParcelDetail) -> Self {
        Self {
            parcel_id: detail.parcel_id,
            name: detail.name,
            weight_kg: detail.weight_kg,
            type_id: detail.type_id,
            cost_adjustment_usd: detail.cost_adjustment_usd,
            delivery_price_rub: DeliveryPrice::from_option(detail.delivery_price_rub),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParcelListResponse {
    pub items: Vec<ParcelDetailResponse>,
    pub total: i64,
}

/// Query string of `GET /v1/parcels/all`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListParcelsParams {
    pub type_id: Option<i32>,

    #[serde(default = "default_has_delivery_price")]
    pub has_delivery_price: bool,

    #[serde(default = "default_limit")]
    pub limit: i64,

    #[serde(default)]
    pub offset: i64,
}

impl ListParcelsParams {
    pub fn validate(&self) -> Result<(), ParcelError> {
        if self.limit < 1 {
            return Err(ParcelError::validation("limit", "must be >= 1"));
        }
        if self.offset < 0 {
            return Err(ParcelError::validation("offset", "must be >= 0"));
        }
        Ok(())
    }
}

fn default_has_delivery_price() -> bool {
    true
}

fn default_limit() -> i64 {
    20
}

/// Body of `POST /v1/parcels/{id}/bind-company`.
#[derive(Debug, Clone, Deserialize)]
pub struct BindCompanyRequest {
    pub company_id: i32,
}

impl BindCompanyRequest {
    pub fn validate(&self) -> Result<(), ParcelError> {
        if self.company_id < 1 {
            return Err(ParcelError::validation("company_id", "must be >= 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindCompanyResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_request() -> ParcelCreateRequest {
        ParcelCreateRequest {
            name: "Box".to_string(),
            weight_kg: 2.0,
            type_id: 1,
            cost_adjustment_usd: 10.0,
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn weight_bounds_are_enforced() {
        let mut req = valid_request();
        req.weight_kg = 0.009;
        assert!(req.validate().is_err());
        req.weight_kg = 100.01;
        assert!(req.validate().is_err());
        req.weight_kg = 0.01;
        assert!(req.validate().is_ok());
        req.weight_kg = 100.0;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn type_id_bounds_are_enforced() {
        let mut req = valid_request();
        req.type_id = 0;
        assert!(req.validate().is_err());
        req.type_id = 4;
        assert!(req.validate().is_err());
    }

    #[test]
    fn cost_bounds_are_enforced() {
        let mut req = valid_request();
        req.cost_adjustment_usd = 0.05;
        assert!(req.validate().is_err());
        req.cost_adjustment_usd = 1e6 + 1.0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn detail_response_emits_literal_for_missing_price() {
        let response = ParcelDetailResponse {
            parcel_id: "p-1".to_string(),
            name: "Box".to_string(),
            weight_kg: 2.0,
            type_id: 1,
            cost_adjustment_usd: 10.0,
            delivery_price_rub: DeliveryPrice::NotCalculated,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["delivery_price_rub"], json!("Не рассчитано"));
    }

    #[test]
    fn cached_payload_without_price_field_deserializes() {
        // Shape written by the create endpoint: the registration payload.
        let cached = json!({
            "parcel_id": "p-1",
            "session_id": "s-1",
            "name": "Box",
            "weight_kg": 2.0,
            "type_id": 1,
            "cost_adjustment_usd": 10.0
        });
        let response: ParcelDetailResponse = serde_json::from_value(cached).unwrap();
        assert_eq!(response.delivery_price_rub, DeliveryPrice::NotCalculated);
    }

    #[test]
    fn list_params_defaults() {
        let params: ListParcelsParams = serde_json::from_value(json!({})).unwrap();
        assert!(params.has_delivery_price);
        assert_eq!(params.limit, 20);
        assert_eq!(params.offset, 0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn list_params_bounds() {
        let params: ListParcelsParams =
            serde_json::from_value(json!({"limit": 0})).unwrap();
        assert!(params.validate().is_err());

        let params: ListParcelsParams =
            serde_json::from_value(json!({"offset": -1})).unwrap();
        assert!(params.validate().is_err());
    }

    #[test]
    fn bind_request_requires_positive_company() {
        assert!(BindCompanyRequest { company_id: 0 }.validate().is_err());
        assert!(BindCompanyRequest { company_id: 1 }.validate().is_ok());
    }
}
