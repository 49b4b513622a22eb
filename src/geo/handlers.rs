//! Geocoding handlers

use axum::extract::{Extension, Json, Query};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState};

#[derive(Deserialize)]
pub struct GeocodeQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /api/geocode?q=Store Name, City
///
/// Always answers 200; `result` is null whenever the lookup fails
/// closed (short query, upstream error, no match).
pub async fn geocode(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _authed: AuthedUser,
    Query(params): Query<GeocodeQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let result = state.geocoder.forward(&params.q).await;

    Ok(Json(serde_json::json!({ "result": result })))
}
