//! Tests for the prices module
//!
//! Covers the derivation contract end to end against in-memory
//! SQLite: silent-skip preconditions, location handling, item
//! filtering, unit price math, and swallow-on-storage-failure.

#[cfg(test)]
mod tests {
    use super::super::deriver::{build_price_points, derive_price_points, DEFAULT_CATEGORY};
    use super::super::location::LocationSource;
    use super::super::models::{DerivePricePointsRequest, LocationFix, PricePoint, TransactionItem};
    use crate::common::migrations::run_migrations;
    use crate::services::GeoCoordinate;
    use async_trait::async_trait;
    use chrono::Utc;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    struct FixedLocation(GeoCoordinate);

    #[async_trait]
    impl LocationSource for FixedLocation {
        async fn current_position(&self) -> Option<GeoCoordinate> {
            Some(self.0)
        }
    }

    struct NoLocation;

    #[async_trait]
    impl LocationSource for NoLocation {
        async fn current_position(&self) -> Option<GeoCoordinate> {
            None
        }
    }

    struct HangingLocation;

    #[async_trait]
    impl LocationSource for HangingLocation {
        async fn current_position(&self) -> Option<GeoCoordinate> {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            Some(GeoCoordinate { lat: 0.0, lng: 0.0 })
        }
    }

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    fn item(description: &str, quantity: Option<f64>, total_value: f64) -> TransactionItem {
        TransactionItem {
            description: description.to_string(),
            quantity,
            total_value,
        }
    }

    fn request(
        store_name: &str,
        category: Option<&str>,
        items: Vec<TransactionItem>,
    ) -> DerivePricePointsRequest {
        DerivePricePointsRequest {
            store_name: store_name.to_string(),
            category: category.map(str::to_string),
            items,
            location: None,
        }
    }

    fn test_coordinate() -> GeoCoordinate {
        GeoCoordinate {
            lat: -23.5,
            lng: -46.6,
        }
    }

    async fn stored_points(pool: &SqlitePool) -> Vec<PricePoint> {
        sqlx::query_as("SELECT * FROM price_points ORDER BY product_name")
            .fetch_all(pool)
            .await
            .unwrap()
    }

    // ---- build_price_points (pure mapping) ----

    #[test]
    fn test_unit_price_divides_by_quantity() {
        let points = build_price_points(
            "U_OWNER1",
            "Mercado Central",
            "Mercado",
            &[item("Arroz", Some(2.0), 10.0)],
            test_coordinate(),
        );

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].unit_price, 5.0);
        assert_eq!(points[0].product_name, "Arroz");
        assert_eq!(points[0].category, "Mercado");
        assert_eq!(points[0].lat, -23.5);
        assert_eq!(points[0].lng, -46.6);
    }

    #[test]
    fn test_absent_quantity_defaults_to_one() {
        let points = build_price_points(
            "U_OWNER1",
            "Padaria",
            DEFAULT_CATEGORY,
            &[item("Queijo", None, 45.90)],
            test_coordinate(),
        );

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].unit_price, 45.90);
    }

    #[test]
    fn test_zero_quantity_defaults_to_one() {
        let points = build_price_points(
            "U_OWNER1",
            "Padaria",
            DEFAULT_CATEGORY,
            &[item("Feijão", Some(0.0), 8.0)],
            test_coordinate(),
        );

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].unit_price, 8.0);
    }

    #[test]
    fn test_invalid_items_filtered_valid_siblings_kept() {
        let points = build_price_points(
            "U_OWNER1",
            "Mercado",
            DEFAULT_CATEGORY,
            &[
                item("", Some(1.0), 5.0),        // blank description
                item("   ", Some(1.0), 5.0),     // whitespace description
                item("Brinde", Some(1.0), 0.0),  // zero value
                item("Desconto", Some(1.0), -2.0), // negative value
                item("Arroz", Some(2.0), 10.0), // valid
            ],
            test_coordinate(),
        );

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].product_name, "Arroz");
    }

    // ---- derive_price_points (full path) ----

    #[tokio::test]
    async fn test_empty_items_writes_nothing() {
        let pool = setup_test_db().await;

        let created = derive_price_points(
            &pool,
            "U_OWNER1",
            &request("Mercado", None, vec![]),
            &FixedLocation(test_coordinate()),
        )
        .await;

        assert_eq!(created, 0);
        assert!(stored_points(&pool).await.is_empty());
    }

    #[tokio::test]
    async fn test_blank_store_name_writes_nothing() {
        let pool = setup_test_db().await;

        let created = derive_price_points(
            &pool,
            "U_OWNER1",
            &request("   ", None, vec![item("Arroz", Some(2.0), 10.0)]),
            &FixedLocation(test_coordinate()),
        )
        .await;

        assert_eq!(created, 0);
        assert!(stored_points(&pool).await.is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_location_writes_nothing() {
        let pool = setup_test_db().await;

        // Valid transaction, no location reading: the whole derivation
        // aborts with no partial writes and no error.
        let created = derive_price_points(
            &pool,
            "U_OWNER1",
            &request("Mercado", None, vec![item("Arroz", Some(2.0), 10.0)]),
            &NoLocation,
        )
        .await;

        assert_eq!(created, 0);
        assert!(stored_points(&pool).await.is_empty());
    }

    #[tokio::test]
    async fn test_location_timeout_writes_nothing() {
        let pool = setup_test_db().await;

        let created = derive_price_points(
            &pool,
            "U_OWNER1",
            &request("Mercado", None, vec![item("Arroz", Some(2.0), 10.0)]),
            &HangingLocation,
        )
        .await;

        assert_eq!(created, 0);
        assert!(stored_points(&pool).await.is_empty());
    }

    #[tokio::test]
    async fn test_derives_with_default_category() {
        let pool = setup_test_db().await;

        let created = derive_price_points(
            &pool,
            "U_OWNER1",
            &request("Mercado", None, vec![item("Feijão", Some(0.0), 8.0)]),
            &FixedLocation(test_coordinate()),
        )
        .await;

        assert_eq!(created, 1);
        let points = stored_points(&pool).await;
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].product_name, "Feijão");
        assert_eq!(points[0].unit_price, 8.0);
        assert_eq!(points[0].category, "Outros");
        assert_eq!(points[0].lat, -23.5);
        assert_eq!(points[0].lng, -46.6);
        assert_eq!(points[0].owner_id, "U_OWNER1");
    }

    #[tokio::test]
    async fn test_blank_category_falls_back_to_default() {
        let pool = setup_test_db().await;

        let created = derive_price_points(
            &pool,
            "U_OWNER1",
            &request("Mercado", Some("  "), vec![item("Arroz", None, 4.5)]),
            &FixedLocation(test_coordinate()),
        )
        .await;

        assert_eq!(created, 1);
        assert_eq!(stored_points(&pool).await[0].category, "Outros");
    }

    #[tokio::test]
    async fn test_batch_writes_all_valid_items() {
        let pool = setup_test_db().await;

        let created = derive_price_points(
            &pool,
            "U_OWNER1",
            &request(
                "Mercado",
                Some("Mercado"),
                vec![
                    item("Arroz", Some(2.0), 10.0),
                    item("", None, 3.0),
                    item("Feijão", None, 8.0),
                ],
            ),
            &FixedLocation(test_coordinate()),
        )
        .await;

        assert_eq!(created, 2);
        let points = stored_points(&pool).await;
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].product_name, "Arroz");
        assert_eq!(points[0].unit_price, 5.0);
        assert_eq!(points[1].product_name, "Feijão");
        assert_eq!(points[1].unit_price, 8.0);
    }

    #[tokio::test]
    async fn test_storage_failure_is_swallowed() {
        let pool = setup_test_db().await;
        sqlx::query("DROP TABLE price_points")
            .execute(&pool)
            .await
            .unwrap();

        // The insert fails, the deriver logs and reports zero writes.
        let created = derive_price_points(
            &pool,
            "U_OWNER1",
            &request("Mercado", None, vec![item("Arroz", Some(2.0), 10.0)]),
            &FixedLocation(test_coordinate()),
        )
        .await;

        assert_eq!(created, 0);
    }

    #[tokio::test]
    async fn test_stale_reported_fix_writes_nothing() {
        use super::super::location::ReportedLocation;

        let pool = setup_test_db().await;
        let source = ReportedLocation::new(Some(LocationFix {
            lat: -23.5,
            lng: -46.6,
            recorded_at: Some(Utc::now() - chrono::Duration::minutes(10)),
        }));

        let created = derive_price_points(
            &pool,
            "U_OWNER1",
            &request("Mercado", None, vec![item("Arroz", Some(2.0), 10.0)]),
            &source,
        )
        .await;

        assert_eq!(created, 0);
        assert!(stored_points(&pool).await.is_empty());
    }
}
