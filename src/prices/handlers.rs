//! Price point handlers

use axum::extract::{Extension, Json};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::deriver;
use super::location::ReportedLocation;
use super::models::DerivePricePointsRequest;
use super::validators::DeriveRequestValidator;
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState, Validator};

/// POST /api/price-points
/// Derive price points from a saved transaction's line items
///
/// The owning transaction was already saved by the caller; this
/// endpoint answers success-shaped `{created: n}` on every silent-skip
/// path (no location, no valid items, storage failure) so that flow
/// never observes a failure from this best-effort step.
///
/// # Request Body
/// ```json
/// {
///   "store_name": "Mercado Central",
///   "category": "Mercado",
///   "items": [{"description": "Arroz", "quantity": 2, "total_value": 10.0}],
///   "location": {"lat": -23.5, "lng": -46.6, "recorded_at": "2026-01-01T12:00:00Z"}
/// }
/// ```
pub async fn create_price_points(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<DerivePricePointsRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = DeriveRequestValidator.validate(&request);
    if !validation.is_valid {
        return Err(validation.into());
    }

    debug!(
        owner_id = %authed.id,
        item_count = request.items.len(),
        has_location = request.location.is_some(),
        "Price point derivation requested"
    );

    let source = ReportedLocation::new(request.location.clone());
    let created = deriver::derive_price_points(&state.db, &authed.id, &request, &source).await;

    Ok(Json(serde_json::json!({ "created": created })))
}
