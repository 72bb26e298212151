//! Delivery calculation strategies.

use chrono::Utc;
use serde_json::Value as JsonValue;
use tracing::{info, warn};

use crate::adapters::postgres::{NewParcel, UnitOfWork};
use crate::domain::{delivery_price, ParcelError, RegisteredParcelPayload};
use crate::ports::CalculationAudit;

use super::dispatcher::WorkerContext;

/// Handles `parcel.registered`: price the parcel and insert the durable row.
///
/// Insertion is id-idempotent: a parcel that already exists (publisher
/// duplicate, concurrent redelivery) is skipped without touching the row or
/// the audit document. A missing USD rate is tolerated; the parcel lands
/// with a null price for a later recalculation pass.
pub async fn handle_parcel_registered(
    ctx: &WorkerContext,
    payload: Option<JsonValue>,
) -> Result<(), ParcelError> {
    let Some(payload) = payload else {
        warn!("empty payload in parcel.registered event");
        return Ok(());
    };

    let data: RegisteredParcelPayload = serde_json::from_value(payload)
        .map_err(|e| ParcelError::validation("payload", format!("malformed payload: {}", e)))?;

    let rate = ctx.currency.get_usd_rate().await;
    if rate.is_none() {
        warn!(parcel_id = %data.parcel_id, "USD rate unavailable, inserting without price");
    }
    let price = rate.map(|r| delivery_price(data.weight_kg, data.cost_adjustment_usd, r));

    let mut uow = UnitOfWork::begin(&ctx.pool).await?;

    if uow.parcels().find_by_id(&data.parcel_id).await?.is_some() {
        info!(parcel_id = %data.parcel_id, "parcel already exists, skipping insert");
        uow.rollback().await?;
        return Ok(());
    }

    let insert = uow
        .parcels()
        .insert(&NewParcel {
            id: data.parcel_id.clone(),
            session_id: data.session_id.clone(),
            name: data.name.clone(),
            weight_kg: data.weight_kg,
            type_id: data.type_id,
            cost_adjustment_usd: data.cost_adjustment_usd,
            delivery_price_rub: price,
        })
        .await;

    match insert {
        Ok(()) => uow.commit().await?,
        // A concurrent delivery won the insert race between our existence
        // check and the write; same outcome as the skip above.
        Err(ParcelError::ParcelAlreadyExists) => {
            info!(parcel_id = %data.parcel_id, "parcel inserted concurrently, skipping");
            uow.rollback().await?;
            return Ok(());
        }
        Err(e) => return Err(e),
    }

    info!(parcel_id = %data.parcel_id, price = ?price, "inserted new parcel");

    if let Some(price) = price {
        ctx.audit
            .upsert(&CalculationAudit {
                parcel_id: data.parcel_id.clone(),
                type_id: data.type_id,
                session_id: data.session_id.clone(),
                calculated_price: price,
                calculated_at: Utc::now(),
                recalculated_at: None,
            })
            .await?;
        info!(parcel_id = %data.parcel_id, "logged calculation audit");
    }

    Ok(())
}

/// Handles `parcel.recalculate`: price every parcel whose delivery price is
/// still null.
///
/// Without a USD rate the pass aborts entirely rather than updating a subset.
/// Updates guard on `delivery_price_rub IS NULL`, so an already-priced row is
/// never overwritten, and the whole scan commits once at the end.
pub async fn handle_parcel_recalculate(ctx: &WorkerContext) -> Result<(), ParcelError> {
    let Some(rate) = ctx.currency.get_usd_rate().await else {
        warn!("USD rate unavailable, aborting recalculation");
        return Ok(());
    };

    let mut uow = UnitOfWork::begin(&ctx.pool).await?;

    let parcels = uow.parcels().list_unpriced().await?;
    if parcels.is_empty() {
        info!("no parcels pending recalculation");
        uow.rollback().await?;
        return Ok(());
    }

    info!(count = parcels.len(), "recalculating delivery prices");

    let now = Utc::now();
    let mut updated = 0usize;

    for parcel in &parcels {
        let price = delivery_price(parcel.weight_kg, parcel.cost_adjustment_usd, rate);
        if uow.parcels().set_delivery_price(&parcel.id, price).await? {
            updated += 1;
        }

        ctx.audit
            .upsert(&CalculationAudit {
                parcel_id: parcel.id.clone(),
                type_id: parcel.type_id,
                session_id: parcel.session_id.clone(),
                calculated_price: price,
                calculated_at: now,
                recalculated_at: Some(now),
            })
            .await?;
    }

    uow.commit().await?;
    info!(updated, "recalculated parcels");

    Ok(())
}
