use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database item model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}

/// Item joined with its inventory row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ItemWithStock {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub stock: i64,
}

/// Body of item create and update requests.
///
/// Every field is optional so that missing values surface as validation
/// errors rather than deserialization rejections.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
}

/// Body of the inventory update request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryPayload {
    pub item_id: Option<i64>,
    pub stock: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItemCreated {
    pub message: String,
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StockLevel {
    pub item_id: i64,
    pub stock: i64,
}
