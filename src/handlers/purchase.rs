use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    error::Result,
    handlers::{
        AppState,
        extract::{JsonBody, Path},
    },
    models::purchase::{PurchaseCreated, PurchaseDeleted, PurchasePayload},
};

/// Create purchase handler
pub async fn create_purchase(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<PurchasePayload>,
) -> Result<impl IntoResponse> {
    let purchase_id = state.purchase_store.create_purchase(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(PurchaseCreated {
            success: true,
            purchase_id,
        }),
    ))
}

/// Get all purchases handler
pub async fn get_all_purchases(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let purchases = state.purchase_store.get_all_purchases().await?;
    Ok((StatusCode::OK, Json(purchases)))
}

/// Delete purchase handler, restoring its stock
pub async fn delete_purchase(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let restored_items = state.purchase_store.delete_purchase(id).await?;
    Ok((
        StatusCode::OK,
        Json(PurchaseDeleted {
            success: true,
            message: "Purchase deleted successfully".into(),
            restored_items,
        }),
    ))
}

/// Purchase line items handler
pub async fn get_purchase_details(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let details = state.purchase_store.get_purchase_details(id).await?;
    Ok((StatusCode::OK, Json(details)))
}
