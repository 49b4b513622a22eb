// src/common/migrations.rs
//! Database schema management
//!
//! Tables are created on startup if they do not exist. There is no
//! migration history; the schema is additive and idempotent.

use sqlx::SqlitePool;
use tracing::info;

/// Create all tables and indexes
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    create_user_tables(pool).await?;
    create_price_tables(pool).await?;
    create_indexes(pool).await?;

    info!("Database migration completed");
    Ok(())
}

async fn create_user_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT,
            provider TEXT,
            provider_id TEXT,
            created_at TEXT DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    // One stored link per (email, provider); refresh tokens are
    // overwritten on every successful OAuth callback.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS account_links (
            user_email TEXT NOT NULL,
            provider TEXT NOT NULL,
            refresh_token TEXT NOT NULL,
            updated_at TEXT DEFAULT (datetime('now')),
            PRIMARY KEY (user_email, provider)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_price_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS price_points (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            store_name TEXT NOT NULL,
            product_name TEXT NOT NULL,
            unit_price REAL NOT NULL,
            lat REAL NOT NULL,
            lng REAL NOT NULL,
            category TEXT NOT NULL DEFAULT 'Outros',
            created_at TEXT DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let indexes = [
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_provider ON users(provider, provider_id)",
        "CREATE INDEX IF NOT EXISTS idx_price_points_owner ON price_points(owner_id)",
        "CREATE INDEX IF NOT EXISTS idx_price_points_store ON price_points(store_name)",
    ];

    for sql in indexes {
        sqlx::query(sql).execute(pool).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .unwrap();

        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        // Tables exist and are queryable
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM account_links")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 0);

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM price_points")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }
}
