use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    error::Result,
    handlers::{
        AppState,
        extract::{JsonBody, Path},
    },
    models::{
        MessageResponse,
        shipping::{ShippingCreated, ShippingPayload, ShippingUpdate},
    },
};

/// Create shipment handler
pub async fn create_shipment(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ShippingPayload>,
) -> Result<impl IntoResponse> {
    let shipping_id = state.shipping_store.create_shipment(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ShippingCreated {
            success: true,
            shipping_id,
        }),
    ))
}

/// Get all shipments handler
pub async fn get_all_shipments(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let shipments = state.shipping_store.get_all_shipments().await?;
    Ok((StatusCode::OK, Json(shipments)))
}

/// Delete shipment handler
pub async fn delete_shipment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.shipping_store.delete_shipment(id).await?;
    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Shipment deleted successfully")),
    ))
}

/// Partial shipment update handler
pub async fn update_shipment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(update): JsonBody<ShippingUpdate>,
) -> Result<impl IntoResponse> {
    state.shipping_store.update_shipment(id, update).await?;
    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Shipment updated successfully")),
    ))
}
