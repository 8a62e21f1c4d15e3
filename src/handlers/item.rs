use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    error::{AppError, Result},
    handlers::{
        AppState,
        extract::{JsonBody, Path},
    },
    models::{
        MessageResponse,
        item::{InventoryPayload, ItemCreated, ItemPayload, StockLevel},
    },
};

/// Create item handler
pub async fn create_item(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ItemPayload>,
) -> Result<impl IntoResponse> {
    let id = state.item_store.create_item(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ItemCreated {
            message: "Item and inventory added successfully".into(),
            id,
        }),
    ))
}

/// Get all items handler
pub async fn get_all_items(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let items = state.item_store.get_all_items().await?;
    Ok((StatusCode::OK, Json(items)))
}

/// Update item handler
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<ItemPayload>,
) -> Result<impl IntoResponse> {
    state.item_store.update_item(id, payload).await?;
    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Item updated successfully")),
    ))
}

/// Delete item handler
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.item_store.delete_item(id).await?;
    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Item deleted successfully")),
    ))
}

/// Add stock handler
pub async fn set_inventory(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<InventoryPayload>,
) -> Result<impl IntoResponse> {
    state.item_store.set_inventory(payload).await?;
    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Inventory updated successfully")),
    ))
}

/// Current stock of a single item
pub async fn get_inventory(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let stock = state
        .item_store
        .get_stock(item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory not found".into()))?;
    Ok((StatusCode::OK, Json(StockLevel { item_id, stock })))
}

/// Zero stock handler
pub async fn zero_inventory(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.item_store.zero_inventory(item_id).await?;
    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Inventory cleared successfully")),
    ))
}

/// Items with current stock handler
pub async fn get_items_with_inventory(
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let rows = state.item_store.list_items_with_inventory().await?;
    Ok((StatusCode::OK, Json(rows)))
}
