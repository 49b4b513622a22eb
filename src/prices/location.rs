//! Device location seam
//!
//! Derivation needs a one-shot position reading. The trait keeps the
//! deriver independent of where the reading comes from: production
//! wraps the fix the client reported with the request, tests use
//! stubs.

use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;
use tracing::warn;

use crate::prices::models::LocationFix;
use crate::services::GeoCoordinate;

/// How long the deriver waits for a position before giving up
pub const LOCATION_TIMEOUT: Duration = Duration::from_secs(5);

/// A cached reading older than this is unusable
pub const LOCATION_MAX_AGE_SECS: i64 = 5 * 60;

/// One-shot "get current position" capability
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// `None` means denied, unavailable, or too stale; the caller
    /// treats all of those the same way.
    async fn current_position(&self) -> Option<GeoCoordinate>;
}

/// A client-reported reading, valid while younger than the max age
pub struct ReportedLocation {
    fix: Option<LocationFix>,
}

impl ReportedLocation {
    pub fn new(fix: Option<LocationFix>) -> Self {
        Self { fix }
    }
}

#[async_trait]
impl LocationSource for ReportedLocation {
    async fn current_position(&self) -> Option<GeoCoordinate> {
        let fix = self.fix.as_ref()?;

        if let Some(recorded_at) = fix.recorded_at {
            let age = Utc::now() - recorded_at;
            if age > chrono::Duration::seconds(LOCATION_MAX_AGE_SECS) {
                warn!(
                    age_secs = age.num_seconds(),
                    "Reported location is too stale to use"
                );
                return None;
            }
        }

        Some(GeoCoordinate {
            lat: fix.lat,
            lng: fix.lng,
        })
    }
}
