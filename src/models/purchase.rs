use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::LineItem;

/// Database purchase model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Purchase {
    pub id: i64,
    pub customer_name: String,
    pub total_amount: f64,
    pub purchase_date: DateTime<Utc>,
}

/// One purchased line joined with its purchase and item
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PurchaseDetail {
    pub purchase_id: i64,
    pub customer_name: String,
    pub total_amount: f64,
    pub purchase_date: DateTime<Utc>,
    pub item_name: String,
    pub quantity: i64,
    pub price: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchasePayload {
    pub customer_name: Option<String>,
    pub items: Option<Vec<LineItem>>,
    pub total_amount: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PurchaseCreated {
    pub success: bool,
    #[serde(rename = "purchaseId")]
    pub purchase_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PurchaseDeleted {
    pub success: bool,
    pub message: String,
    #[serde(rename = "restoredItems")]
    pub restored_items: usize,
}
