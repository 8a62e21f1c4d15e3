pub mod item;
pub mod purchase;
pub mod shipping;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single (item, quantity) line of a purchase or shipment request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub item_id: i64,
    pub quantity: i64,
}

/// Generic acknowledgement body
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Sum requested quantities per item, so repeated ids are checked as one total
pub fn totals_by_item(lines: &[LineItem]) -> BTreeMap<i64, i64> {
    let mut totals = BTreeMap::new();
    for line in lines {
        let total = totals.entry(line.item_id).or_insert(0i64);
        *total = total.saturating_add(line.quantity);
    }
    totals
}
