//! Price point data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One receipt line item, as supplied by the caller after the owning
/// transaction was saved. Not persisted by this module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionItem {
    pub description: String,
    pub quantity: Option<f64>,
    pub total_value: f64,
}

/// A device-reported location reading. `recorded_at` is the capture
/// time; absent means the reading is live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationFix {
    pub lat: f64,
    pub lng: f64,
    pub recorded_at: Option<DateTime<Utc>>,
}

/// Request body for the derive endpoint
#[derive(Debug, Deserialize)]
pub struct DerivePricePointsRequest {
    pub store_name: String,
    pub category: Option<String>,
    pub items: Vec<TransactionItem>,
    pub location: Option<LocationFix>,
}

/// A single observed (product, store, price, location) sample
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct PricePoint {
    pub id: String,
    pub owner_id: String,
    pub store_name: String,
    pub product_name: String,
    pub unit_price: f64,
    pub lat: f64,
    pub lng: f64,
    pub category: String,
    pub created_at: Option<String>,
}
