use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strum::{AsRefStr, Display, EnumString};

use super::LineItem;
use crate::error::{self, AppError};

/// Shipment progress, stored as lowercase text
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    sqlx::Type,
    EnumString,
    Display,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ShippingStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
}

impl ShippingStatus {
    /// Parse a client-supplied status, rejecting unknown values as a bad request
    pub fn parse(value: &str) -> error::Result<Self> {
        Self::from_str(value.trim()).map_err(|_| {
            AppError::BadRequest(format!(
                "Invalid status '{value}', expected one of pending, processing, shipped, delivered"
            ))
        })
    }
}

/// Database shipping model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Shipping {
    pub id: i64,
    pub purchase_id: i64,
    pub shipping_date: DateTime<Utc>,
    pub shipping_address: Option<String>,
    pub status: ShippingStatus,
    pub tracking_number: Option<String>,
    pub shipping_provider: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShippingPayload {
    pub purchase_id: Option<i64>,
    pub shipping_date: Option<DateTime<Utc>>,
    pub shipping_address: Option<String>,
    pub status: Option<String>,
    pub tracking_number: Option<String>,
    pub shipping_provider: Option<String>,
    pub items: Option<Vec<LineItem>>,
}

/// Partial shipment update; only supplied fields are written
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShippingUpdate {
    pub status: Option<String>,
    pub tracking_number: Option<String>,
    pub shipping_provider: Option<String>,
}

impl ShippingUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.tracking_number.is_none() && self.shipping_provider.is_none()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShippingCreated {
    pub success: bool,
    pub shipping_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_statuses() {
        assert_eq!(ShippingStatus::parse("pending").unwrap(), ShippingStatus::Pending);
        assert_eq!(ShippingStatus::parse(" shipped ").unwrap(), ShippingStatus::Shipped);
        assert_eq!(ShippingStatus::Delivered.as_ref(), "delivered");
    }

    #[test]
    fn rejects_unknown_status() {
        let err = ShippingStatus::parse("lost").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
