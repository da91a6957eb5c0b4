use std::sync::Arc;

use palengke_core::config::{AppConfig, ConfigError, LoadOptions};
use palengke_core::insights::RecommendationEngine;
use palengke_db::{connect_with_settings, migrations, DbPool, SqlSignalStore};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub engine: RecommendationEngine,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let engine = RecommendationEngine::new(Arc::new(SqlSignalStore::new(db_pool.clone())));

    Ok(Application { config, db_pool, engine })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use palengke_core::config::{ConfigOverrides, LoadOptions};
    use palengke_core::domain::identity::Caller;
    use palengke_db::MarketplaceSeed;

    use crate::bootstrap::bootstrap;

    // Each test gets its own named in-memory database so shared-cache
    // state never leaks between concurrently running tests.
    fn memory_options(name: &str) -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some(format!("sqlite://{name}?mode=memory&cache=shared")),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_applies_migrations_and_exposes_signal_tables() {
        let app = bootstrap(memory_options("bootstrap-tables")).await.expect("bootstrap");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name IN \
             ('farmers', 'products', 'product_views', 'orders', 'order_items', 'feedback')",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("signal store tables present after bootstrap");
        assert_eq!(table_count, 6);

        app.db_pool.close().await;
    }

    #[tokio::test]
    async fn integration_smoke_covers_seed_and_engine_read_paths() {
        let app = bootstrap(memory_options("bootstrap-smoke")).await.expect("bootstrap");
        MarketplaceSeed::load(&app.db_pool).await.expect("seed");

        let insights = app
            .engine
            .market_insights(&Caller::farmer("user-ilog"))
            .await
            .expect("market insights over seeded store");
        assert_eq!(insights.farmer_id.0, "farmer-ilog");
        assert!(!insights.insights.is_empty());

        let preferences =
            app.engine.customer_preferences().await.expect("catalog preferences");
        assert!(!preferences.is_empty());

        let seasonal = app
            .engine
            .seasonal_recommendations(NaiveDate::from_ymd_opt(2026, 5, 20).expect("date"))
            .await
            .expect("seasonal recommendations");
        assert_eq!(seasonal.current_month, 5);

        app.db_pool.close().await;
    }

    #[tokio::test]
    async fn bootstrap_rejects_invalid_configuration() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("postgres://not-sqlite/market".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;
        assert!(result.is_err());
    }
}
