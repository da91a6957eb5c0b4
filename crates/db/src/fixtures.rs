//! Deterministic seed dataset and its verification contract.
//!
//! The seed gives every engine operation something to chew on: two
//! farmers, listings across three categories, views, orders in each
//! counted status, and feedback. `verify` re-checks the contract so a
//! drifted fixture fails loudly instead of silently skewing tests.

use sqlx::{Executor, Row};

use crate::connection::DbPool;

const SEED_FARMER_IDS: &[&str] = &["farmer-ilog", "farmer-bukid"];

const SEED_PRODUCT_IDS: &[&str] = &[
    "prod-kale",
    "prod-tomato",
    "prod-squash",
    "prod-mango",
    "prod-banana",
    "prod-rice",
];

const SEED_VIEW_COUNT: i64 = 6;
const SEED_ORDER_COUNT: i64 = 5;
const SEED_DELIVERED_ORDER_COUNT: i64 = 3;
const SEED_ORDER_ITEM_COUNT: i64 = 6;
const SEED_FEEDBACK_COUNT: i64 = 4;

#[derive(Debug)]
pub struct SeedResult {
    pub farmers_seeded: usize,
    pub products_seeded: usize,
}

#[derive(Debug)]
pub struct SeedCheck {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub checks: Vec<SeedCheck>,
}

impl VerificationResult {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|check| check.passed)
    }
}

pub struct MarketplaceSeed;

impl MarketplaceSeed {
    pub const SQL: &'static str = include_str!("../../../config/fixtures/marketplace_seed.sql");

    pub async fn load(pool: &DbPool) -> Result<SeedResult, sqlx::Error> {
        let mut tx = pool.begin().await?;
        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        Ok(SeedResult {
            farmers_seeded: SEED_FARMER_IDS.len(),
            products_seeded: SEED_PRODUCT_IDS.len(),
        })
    }

    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, sqlx::Error> {
        let mut checks = Vec::new();

        checks.push(
            count_check(
                pool,
                "farmers",
                "SELECT COUNT(*) AS n FROM farmers",
                SEED_FARMER_IDS.len() as i64,
            )
            .await?,
        );
        checks.push(
            count_check(
                pool,
                "products",
                "SELECT COUNT(*) AS n FROM products",
                SEED_PRODUCT_IDS.len() as i64,
            )
            .await?,
        );
        checks.push(
            count_check(
                pool,
                "product_views",
                "SELECT COUNT(*) AS n FROM product_views",
                SEED_VIEW_COUNT,
            )
            .await?,
        );
        checks.push(
            count_check(pool, "orders", "SELECT COUNT(*) AS n FROM orders", SEED_ORDER_COUNT)
                .await?,
        );
        checks.push(
            count_check(
                pool,
                "delivered orders",
                "SELECT COUNT(*) AS n FROM orders WHERE order_status = 'DELIVERED'",
                SEED_DELIVERED_ORDER_COUNT,
            )
            .await?,
        );
        checks.push(
            count_check(
                pool,
                "order_items",
                "SELECT COUNT(*) AS n FROM order_items",
                SEED_ORDER_ITEM_COUNT,
            )
            .await?,
        );
        checks.push(
            count_check(
                pool,
                "feedback",
                "SELECT COUNT(*) AS n FROM feedback",
                SEED_FEEDBACK_COUNT,
            )
            .await?,
        );

        // The view upsert key must hold in the fixture itself.
        let distinct_pairs = sqlx::query(
            "SELECT COUNT(*) AS n FROM
                (SELECT DISTINCT customer_id, product_id FROM product_views)",
        )
        .fetch_one(pool)
        .await?
        .get::<i64, _>("n");
        checks.push(SeedCheck {
            name: "view pairs unique",
            passed: distinct_pairs == SEED_VIEW_COUNT,
            detail: format!("{distinct_pairs} distinct pairs of {SEED_VIEW_COUNT} rows"),
        });

        Ok(VerificationResult { checks })
    }
}

async fn count_check(
    pool: &DbPool,
    name: &'static str,
    query: &str,
    expected: i64,
) -> Result<SeedCheck, sqlx::Error> {
    let actual = sqlx::query(query).fetch_one(pool).await?.get::<i64, _>("n");
    Ok(SeedCheck {
        name,
        passed: actual == expected,
        detail: format!("expected {expected}, found {actual}"),
    })
}

#[cfg(test)]
mod tests {
    use palengke_core::domain::farmer::FarmerId;
    use palengke_core::domain::identity::UserId;
    use palengke_core::store::SignalStore;

    use crate::store::SqlSignalStore;
    use crate::{connect_with_settings, migrations};

    use super::MarketplaceSeed;

    async fn seeded_pool() -> crate::DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        MarketplaceSeed::load(&pool).await.expect("seed");
        pool
    }

    #[tokio::test]
    async fn seed_loads_and_verifies() {
        let pool = seeded_pool().await;

        let result = MarketplaceSeed::verify(&pool).await.expect("verify");
        assert!(
            result.passed(),
            "failed checks: {:?}",
            result.checks.iter().filter(|check| !check.passed).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn seeded_store_serves_domain_rows() {
        let pool = seeded_pool().await;
        let store = SqlSignalStore::new(pool);

        let farmer = store
            .farmer_for_user(&UserId("user-ilog".to_string()))
            .await
            .expect("query")
            .expect("farmer");
        assert_eq!(farmer.id.0, "farmer-ilog");

        let products = store
            .products_for_farmer(&FarmerId("farmer-ilog".to_string()))
            .await
            .expect("products");
        assert_eq!(products.len(), 3);

        let available = store.available_products().await.expect("available");
        assert_eq!(available.len(), 5, "the unavailable squash listing is excluded");
    }
}
