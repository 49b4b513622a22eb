//! Price point derivation
//!
//! Runs after the owning transaction is already saved, so every exit
//! path here is quiet: skipped preconditions, an unavailable location,
//! and storage failures all log and return zero rows written. Nothing
//! propagates to the caller and nothing is rolled back.

use sqlx::SqlitePool;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::common::generate_price_point_id;
use crate::prices::location::{LocationSource, LOCATION_TIMEOUT};
use crate::prices::models::{DerivePricePointsRequest, PricePoint, TransactionItem};
use crate::services::GeoCoordinate;

/// Category applied when the transaction has none
pub const DEFAULT_CATEGORY: &str = "Outros";

/// Derive and persist price points for a saved transaction
///
/// Returns the number of rows written; zero covers every skip and
/// failure path.
pub async fn derive_price_points(
    pool: &SqlitePool,
    owner_id: &str,
    request: &DerivePricePointsRequest,
    location: &dyn LocationSource,
) -> usize {
    if request.items.is_empty() || request.store_name.trim().is_empty() {
        debug!("Price point derivation skipped: no items or store name");
        return 0;
    }

    let coordinate = match timeout(LOCATION_TIMEOUT, location.current_position()).await {
        Ok(Some(c)) => c,
        Ok(None) => {
            warn!(
                store_name = %request.store_name,
                "Location unavailable, skipping price point derivation"
            );
            return 0;
        }
        Err(_) => {
            warn!(
                store_name = %request.store_name,
                timeout_secs = LOCATION_TIMEOUT.as_secs(),
                "Location request timed out, skipping price point derivation"
            );
            return 0;
        }
    };

    let category = request
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CATEGORY);

    let points = build_price_points(
        owner_id,
        request.store_name.trim(),
        category,
        &request.items,
        coordinate,
    );

    if points.is_empty() {
        debug!("No valid line items to derive price points from");
        return 0;
    }

    match insert_batch(pool, &points).await {
        Ok(written) => {
            debug!(count = written, "Price points written");
            written
        }
        Err(e) => {
            // Best effort: the owning transaction is already saved and
            // must not observe this failure.
            warn!(
                error = %e,
                owner_id = %owner_id,
                store_name = %request.store_name,
                count = points.len(),
                "Failed to write price points, dropping batch"
            );
            0
        }
    }
}

/// Map valid line items to price point rows
///
/// An item qualifies with a non-blank description and a strictly
/// positive total; invalid items never block valid siblings. Absent or
/// non-positive quantity counts as 1.
pub fn build_price_points(
    owner_id: &str,
    store_name: &str,
    category: &str,
    items: &[TransactionItem],
    coordinate: GeoCoordinate,
) -> Vec<PricePoint> {
    items
        .iter()
        .filter(|item| !item.description.trim().is_empty() && item.total_value > 0.0)
        .map(|item| PricePoint {
            id: generate_price_point_id(),
            owner_id: owner_id.to_string(),
            store_name: store_name.to_string(),
            product_name: item.description.trim().to_string(),
            unit_price: item.total_value / effective_quantity(item),
            lat: coordinate.lat,
            lng: coordinate.lng,
            category: category.to_string(),
            created_at: None,
        })
        .collect()
}

fn effective_quantity(item: &TransactionItem) -> f64 {
    match item.quantity {
        Some(q) if q > 0.0 => q,
        _ => 1.0,
    }
}

/// Write the whole batch in one transaction
async fn insert_batch(pool: &SqlitePool, points: &[PricePoint]) -> Result<usize, sqlx::Error> {
    let mut tx = pool.begin().await?;

    for point in points {
        sqlx::query(
            r#"
            INSERT INTO price_points
                (id, owner_id, store_name, product_name, unit_price, lat, lng, category)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&point.id)
        .bind(&point.owner_id)
        .bind(&point.store_name)
        .bind(&point.product_name)
        .bind(point.unit_price)
        .bind(point.lat)
        .bind(point.lng)
        .bind(&point.category)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(points.len())
}
