//! Recommendation facade: composes store reads, aggregation, scoring, and
//! ranking per request. Every operation builds its own metrics snapshot;
//! nothing is cached or shared between invocations.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::domain::farmer::Farmer;
use crate::domain::identity::{Caller, CustomerId, Role};
use crate::domain::product::{Product, ProductId};
use crate::errors::EngineError;
use crate::store::SignalStore;

use super::sampler::{Sampler, ThreadRngSampler};
use super::types::*;
use super::{aggregator, ranker, scoring, EngineResult};
use super::{
    PREFERENCE_LIMIT, RECENTLY_VIEWED_LIMIT, SALES_TREND_WEEKS, SEASONAL_WINDOW_MONTHS,
    SIMILAR_PRODUCT_LIMIT, TRENDING_LIMIT, TRENDING_WINDOW_DAYS,
};

pub struct RecommendationEngine {
    store: Arc<dyn SignalStore>,
    sampler: Arc<dyn Sampler>,
}

impl RecommendationEngine {
    pub fn new(store: Arc<dyn SignalStore>) -> Self {
        Self { store, sampler: Arc::new(ThreadRngSampler) }
    }

    /// Replace the random source, e.g. with a seeded sampler in tests.
    pub fn with_sampler(store: Arc<dyn SignalStore>, sampler: Arc<dyn Sampler>) -> Self {
        Self { store, sampler }
    }

    /// Record that a customer opened a product detail page. Idempotent per
    /// (customer, product); repeat views only refresh the timestamp.
    pub async fn record_product_view(
        &self,
        caller: &Caller,
        product_id: &ProductId,
        viewed_at: DateTime<Utc>,
    ) -> EngineResult<()> {
        if caller.role != Role::Customer {
            return Err(EngineError::NotAuthorized(
                "only customers record product views".to_string(),
            ));
        }
        let customer = CustomerId(caller.user_id.0.clone());
        self.store.record_view(&customer, product_id, viewed_at).await?;
        Ok(())
    }

    /// Rank the caller's products by the market-insight demand score and
    /// join category-level market context (average price, competing
    /// farmers) from an independent aggregation keyed by category.
    pub async fn market_insights(&self, caller: &Caller) -> EngineResult<MarketInsightsReport> {
        let farmer = self.resolve_farmer(caller).await?;
        let products = self.store.products_for_farmer(&farmer.id).await?;
        let ids: Vec<ProductId> = products.iter().map(|product| product.id.clone()).collect();

        let (views, lines, feedback, catalog) = tokio::try_join!(
            self.store.views_for_products(&ids, None),
            self.store.order_lines_for_products(&ids),
            self.store.feedback_for_products(&ids),
            self.store.available_products(),
        )?;

        let metrics = aggregator::product_metrics(&products, &views, &lines, &feedback);
        let market = aggregator::category_metrics(&catalog);

        let insights: Vec<MarketInsight> = metrics
            .into_iter()
            .map(|entry| {
                let demand_score = scoring::insight_demand_score(&entry);
                let context = market.iter().find(|candidate| candidate.category == entry.category);
                MarketInsight {
                    demand_score,
                    market_avg_price: context.map(|c| c.avg_price),
                    market_competition: context.map(|c| c.farmer_count).unwrap_or(0),
                    metrics: entry,
                }
            })
            .collect();

        let insights = ranker::rank_by_score(
            insights,
            |insight| insight.demand_score,
            |insight| insight.metrics.product_id.0.as_str(),
            None,
        );

        Ok(MarketInsightsReport { farmer_id: farmer.id, insights })
    }

    /// Top (category, product) pairs by popularity across the catalog.
    /// Never-viewed pairs are excluded before scoring, not ranked at zero.
    pub async fn customer_preferences(&self) -> EngineResult<Vec<CategoryPreference>> {
        let catalog = self.store.available_products().await?;
        let ids: Vec<ProductId> = catalog.iter().map(|product| product.id.clone()).collect();

        let (views, lines, feedback) = tokio::try_join!(
            self.store.views_for_products(&ids, None),
            self.store.order_lines_for_products(&ids),
            self.store.feedback_for_products(&ids),
        )?;

        let preferences: Vec<CategoryPreference> =
            aggregator::product_metrics(&catalog, &views, &lines, &feedback)
                .into_iter()
                .filter(|metrics| metrics.distinct_viewer_count > 0)
                .map(|metrics| {
                    let popularity_score = scoring::popularity_score(&metrics);
                    CategoryPreference {
                        category: metrics.category,
                        product_id: metrics.product_id,
                        product_name: metrics.name,
                        unique_viewers: metrics.distinct_viewer_count,
                        total_purchases: metrics.purchase_count,
                        avg_rating: metrics.avg_rating,
                        popularity_score,
                    }
                })
                .collect();

        Ok(ranker::rank_by_score(
            preferences,
            |preference| preference.popularity_score,
            |preference| preference.product_id.0.as_str(),
            Some(PREFERENCE_LIMIT),
        ))
    }

    /// Listings harvested in the two-month window starting at the current
    /// month (December wraps into January), grouped by category and month.
    pub async fn seasonal_recommendations(&self, today: NaiveDate) -> EngineResult<SeasonalReport> {
        let catalog = self.store.available_products().await?;
        let range = aggregator::MonthRange::new(today.month(), SEASONAL_WINDOW_MONTHS);
        let groups = aggregator::seasonal_groups(&catalog, range);
        Ok(SeasonalReport { current_month: today.month(), groups })
    }

    /// Three independent lists for one customer, fetched concurrently: a
    /// failure in any sub-query fails the whole bundle.
    pub async fn personalized_recommendations(
        &self,
        caller: &Caller,
        now: DateTime<Utc>,
    ) -> EngineResult<PersonalizedBundle> {
        if caller.role != Role::Customer {
            return Err(EngineError::NotAuthorized(
                "personalized recommendations require the customer role".to_string(),
            ));
        }
        let customer = CustomerId(caller.user_id.0.clone());

        let (recently_viewed, similar_products, trending_products) = tokio::try_join!(
            self.recently_viewed(&customer),
            self.similar_products(&customer),
            self.trending_products(now),
        )?;

        Ok(PersonalizedBundle { recently_viewed, similar_products, trending_products })
    }

    /// Rank the caller's available products by demand score. The response
    /// carries the weight constants so consumers can audit the score.
    pub async fn demand_analysis(&self, caller: &Caller) -> EngineResult<DemandAnalysis> {
        let farmer = self.resolve_farmer(caller).await?;
        let products: Vec<Product> = self
            .store
            .products_for_farmer(&farmer.id)
            .await?
            .into_iter()
            .filter(|product| product.is_available())
            .collect();
        let ids: Vec<ProductId> = products.iter().map(|product| product.id.clone()).collect();

        let (views, lines) = tokio::try_join!(
            self.store.views_for_products(&ids, None),
            self.store.order_lines_for_products(&ids),
        )?;

        let entries: Vec<DemandEntry> =
            aggregator::product_metrics(&products, &views, &lines, &[])
                .into_iter()
                .map(|metrics| {
                    let demand_score = scoring::demand_score(
                        metrics.view_count,
                        metrics.purchase_count,
                        metrics.unmet_demand_count,
                    );
                    DemandEntry {
                        product_id: metrics.product_id,
                        name: metrics.name,
                        category: metrics.category,
                        view_count: metrics.view_count,
                        price_trend_indicator: scoring::price_trend_indicator(
                            metrics.purchase_count,
                        ),
                        unmet_demand_count: metrics.unmet_demand_count,
                        demand_score,
                    }
                })
                .collect();

        let entries = ranker::rank_by_score(
            entries,
            |entry| entry.demand_score,
            |entry| entry.product_id.0.as_str(),
            None,
        );

        Ok(DemandAnalysis { entries, weights: scoring::DEMAND_WEIGHTS })
    }

    /// Composite performance score with level and improvement
    /// recommendations for the calling farmer.
    pub async fn performance_metrics(
        &self,
        caller: &Caller,
        now: DateTime<Utc>,
    ) -> EngineResult<PerformanceReport> {
        let farmer = self.resolve_farmer(caller).await?;

        let (orders, products) = tokio::try_join!(
            self.store.orders_for_farmer(&farmer.id),
            self.store.products_for_farmer(&farmer.id),
        )?;
        let ids: Vec<ProductId> = products.iter().map(|product| product.id.clone()).collect();
        let feedback = self.store.feedback_for_products(&ids).await?;

        let weekly_sales = aggregator::weekly_sales(&orders, now, SALES_TREND_WEEKS);
        let factors = PerformanceFactors {
            fulfillment_rate: aggregator::fulfillment_rate(&orders),
            avg_rating: aggregator::review_summary(&feedback).average,
            avg_response_hours: aggregator::avg_response_hours(&orders),
            sales_growth_pct: aggregator::sales_growth_pct(&weekly_sales),
        };

        let score = scoring::performance_score(&factors);
        Ok(PerformanceReport {
            factors,
            score,
            level: scoring::performance_level(score),
            recommendations: scoring::performance_recommendations(&factors),
            weekly_sales,
        })
    }

    /// Daily and per-product DELIVERED rollups over the requested period.
    pub async fn sales_report(
        &self,
        caller: &Caller,
        period: ReportPeriod,
        now: DateTime<Utc>,
    ) -> EngineResult<SalesReport> {
        let farmer = self.resolve_farmer(caller).await?;
        let products = self.store.products_for_farmer(&farmer.id).await?;
        let ids: Vec<ProductId> = products.iter().map(|product| product.id.clone()).collect();
        let since = now - Duration::days(period.window_days());

        let (orders, lines, feedback) = tokio::try_join!(
            self.store.orders_for_farmer(&farmer.id),
            self.store.order_lines_for_products(&ids),
            self.store.feedback_for_products(&ids),
        )?;

        let daily = aggregator::daily_sales(&orders, &lines, since);
        let product_performance = aggregator::product_sales(&products, &lines, &feedback, since);
        let summary = SalesSummary {
            total_sales: daily.iter().map(|day| day.total_sales).sum(),
            total_orders: daily.iter().map(|day| day.order_count).sum(),
            total_items_sold: product_performance.iter().map(|row| row.quantity_sold).sum(),
        };

        Ok(SalesReport { period, daily, product_performance, summary })
    }

    /// Rating statistics over the feedback left for the caller's products.
    pub async fn review_summary(&self, caller: &Caller) -> EngineResult<ReviewSummary> {
        let farmer = self.resolve_farmer(caller).await?;
        let products = self.store.products_for_farmer(&farmer.id).await?;
        let ids: Vec<ProductId> = products.iter().map(|product| product.id.clone()).collect();
        let feedback = self.store.feedback_for_products(&ids).await?;
        Ok(aggregator::review_summary(&feedback))
    }

    async fn resolve_farmer(&self, caller: &Caller) -> EngineResult<Farmer> {
        if caller.role != Role::Farmer {
            return Err(EngineError::NotAuthorized(
                "farmer role required for this operation".to_string(),
            ));
        }
        self.store
            .farmer_for_user(&caller.user_id)
            .await?
            .ok_or_else(|| EngineError::not_found("farmer profile", caller.user_id.0.clone()))
    }

    async fn recently_viewed(&self, customer: &CustomerId) -> EngineResult<Vec<ViewedProduct>> {
        let mut views = self.store.views_for_customer(customer).await?;
        views.sort_by(|a, b| {
            b.viewed_at.cmp(&a.viewed_at).then_with(|| a.product_id.cmp(&b.product_id))
        });
        views.truncate(RECENTLY_VIEWED_LIMIT);

        let ids: Vec<ProductId> = views.iter().map(|view| view.product_id.clone()).collect();
        let products = self.store.products_by_ids(&ids).await?;

        Ok(views
            .into_iter()
            .filter_map(|view| {
                products.iter().find(|product| product.id == view.product_id).map(|product| {
                    ViewedProduct { product: product.clone(), viewed_at: view.viewed_at }
                })
            })
            .collect())
    }

    /// Uniform pick among available products sharing a category with
    /// something the customer viewed, excluding everything already viewed.
    /// Intentionally non-deterministic so repeat calls diversify.
    async fn similar_products(&self, customer: &CustomerId) -> EngineResult<Vec<Product>> {
        let views = self.store.views_for_customer(customer).await?;
        let viewed_ids: Vec<ProductId> =
            views.iter().map(|view| view.product_id.clone()).collect();

        let (viewed_products, catalog) = tokio::try_join!(
            self.store.products_by_ids(&viewed_ids),
            self.store.available_products(),
        )?;

        let viewed_set: HashSet<&ProductId> = viewed_ids.iter().collect();
        let categories: HashSet<&str> =
            viewed_products.iter().map(|product| product.category.as_str()).collect();

        let mut candidates: Vec<Product> = catalog
            .into_iter()
            .filter(|product| categories.contains(product.category.as_str()))
            .filter(|product| !viewed_set.contains(&product.id))
            .collect();
        // Fix the candidate order so a seeded sampler reproduces exactly,
        // whatever order the store returned.
        candidates.sort_by(|a, b| a.id.cmp(&b.id));

        let picked = self.sampler.pick(candidates.len(), SIMILAR_PRODUCT_LIMIT);
        Ok(picked.into_iter().map(|index| candidates[index].clone()).collect())
    }

    async fn trending_products(&self, now: DateTime<Utc>) -> EngineResult<Vec<TrendingProduct>> {
        let catalog = self.store.available_products().await?;
        let ids: Vec<ProductId> = catalog.iter().map(|product| product.id.clone()).collect();
        let since = now - Duration::days(TRENDING_WINDOW_DAYS);

        let (views, lines) = tokio::try_join!(
            self.store.views_for_products(&ids, Some(since)),
            self.store.order_lines_for_products(&ids),
        )?;

        let counts = aggregator::trending_counts(&views, &lines, since);
        let trending: Vec<TrendingProduct> = catalog
            .into_iter()
            .filter_map(|product| {
                let (view_count, purchase_count) =
                    counts.get(&product.id).copied().unwrap_or((0, 0));
                if view_count == 0 {
                    return None;
                }
                let trending_score = scoring::trending_score(view_count, purchase_count);
                Some(TrendingProduct { product, view_count, purchase_count, trending_score })
            })
            .collect();

        Ok(ranker::rank_by_score(
            trending,
            |entry| entry.trending_score,
            |entry| entry.product.id.0.as_str(),
            Some(TRENDING_LIMIT),
        ))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    use crate::domain::farmer::FarmerId;
    use crate::domain::feedback::{Feedback, FeedbackId};
    use crate::domain::identity::UserId;
    use crate::domain::order::{Order, OrderId, OrderItem, OrderItemId, OrderStatus};
    use crate::domain::product::ProductStatus;
    use crate::store::InMemorySignalStore;

    use super::super::SeededSampler;
    use super::*;

    fn at(value: &str) -> DateTime<Utc> {
        value.parse().expect("timestamp")
    }

    fn farmer(id: &str, user: &str) -> Farmer {
        Farmer {
            id: FarmerId(id.to_string()),
            user_id: UserId(user.to_string()),
            farm_name: format!("Farm {id}"),
        }
    }

    fn listing(id: &str, farmer: &str, category: &str, price: i64) -> Product {
        Product {
            id: ProductId(id.to_string()),
            farmer_id: FarmerId(farmer.to_string()),
            name: format!("Product {id}"),
            category: category.to_string(),
            price: Decimal::from(price),
            quantity: 10,
            harvest_date: None,
            status: ProductStatus::Available,
        }
    }

    fn order(
        id: &str,
        farmer: &str,
        status: OrderStatus,
        total: i64,
        order_date: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Order {
        Order {
            id: OrderId(id.to_string()),
            farmer_id: FarmerId(farmer.to_string()),
            status,
            total_amount: Decimal::from(total),
            order_date,
            updated_at,
        }
    }

    fn item(id: &str, order_id: &str, product: &str, quantity: u32, price: i64) -> OrderItem {
        OrderItem {
            id: OrderItemId(id.to_string()),
            order_id: OrderId(order_id.to_string()),
            product_id: ProductId(product.to_string()),
            quantity,
            price: Decimal::from(price),
        }
    }

    fn stars(id: &str, product: &str, customer: &str, rating: u8) -> Feedback {
        Feedback {
            id: FeedbackId(id.to_string()),
            product_id: ProductId(product.to_string()),
            customer_id: CustomerId(customer.to_string()),
            rating,
            comment: None,
            created_at: at("2026-05-01T00:00:00Z"),
        }
    }

    fn engine(store: Arc<InMemorySignalStore>) -> RecommendationEngine {
        RecommendationEngine::with_sampler(store, Arc::new(SeededSampler::new(42)))
    }

    async fn seeded_store() -> Arc<InMemorySignalStore> {
        let store = Arc::new(InMemorySignalStore::default());
        store.insert_farmer(farmer("farmer-1", "user-farmer-1")).await;
        store.insert_farmer(farmer("farmer-2", "user-farmer-2")).await;

        store.insert_product(listing("prod-kale", "farmer-1", "vegetables", 80)).await;
        store.insert_product(listing("prod-tomato", "farmer-1", "vegetables", 60)).await;
        store.insert_product(listing("prod-mango", "farmer-2", "fruits", 120)).await;
        store.insert_product(listing("prod-okra", "farmer-2", "vegetables", 50)).await;

        let now = at("2026-05-20T12:00:00Z");
        for (customer, product, days_ago) in [
            ("cust-1", "prod-kale", 1),
            ("cust-2", "prod-kale", 2),
            ("cust-3", "prod-kale", 3),
            ("cust-1", "prod-tomato", 4),
            ("cust-2", "prod-mango", 1),
        ] {
            store
                .record_view(
                    &CustomerId(customer.to_string()),
                    &ProductId(product.to_string()),
                    now - Duration::days(days_ago),
                )
                .await
                .expect("seed view");
        }

        store
            .insert_order(order(
                "ord-1",
                "farmer-1",
                OrderStatus::Delivered,
                160,
                at("2026-05-18T08:00:00Z"),
                Some(at("2026-05-18T14:00:00Z")),
            ))
            .await;
        store
            .insert_order(order(
                "ord-2",
                "farmer-1",
                OrderStatus::Pending,
                60,
                at("2026-05-19T08:00:00Z"),
                None,
            ))
            .await;
        store
            .insert_order(order(
                "ord-3",
                "farmer-1",
                OrderStatus::Delivered,
                80,
                at("2026-05-11T08:00:00Z"),
                Some(at("2026-05-11T12:00:00Z")),
            ))
            .await;
        store.insert_order_item(item("item-1", "ord-1", "prod-kale", 2, 80)).await;
        store.insert_order_item(item("item-2", "ord-2", "prod-tomato", 1, 60)).await;
        store.insert_order_item(item("item-3", "ord-3", "prod-kale", 1, 80)).await;

        store.insert_feedback(stars("fb-1", "prod-kale", "cust-1", 5)).await;
        store.insert_feedback(stars("fb-2", "prod-kale", "cust-2", 4)).await;

        store
    }

    #[tokio::test]
    async fn market_insights_rank_by_insight_demand_and_join_category_context() {
        let store = seeded_store().await;
        let report = engine(store)
            .market_insights(&Caller::farmer("user-farmer-1"))
            .await
            .expect("insights");

        assert_eq!(report.farmer_id.0, "farmer-1");
        assert_eq!(report.insights.len(), 2);

        let top = &report.insights[0];
        assert_eq!(top.metrics.product_id.0, "prod-kale");
        // 0.3*3 views + 0.4*2 delivered + 0.2*4.5 rating + 0.1*0 unmet = 2.6
        assert_eq!(top.demand_score, 2.6);
        // vegetables category: kale, tomato (farmer-1) and okra (farmer-2).
        assert_eq!(top.market_competition, 2);
        assert_eq!(
            top.market_avg_price,
            Some((Decimal::from(80 + 60 + 50) / Decimal::from(3)).round_dp(2))
        );

        let second = &report.insights[1];
        assert_eq!(second.metrics.product_id.0, "prod-tomato");
        // 0.3*1 view + 0.4*0 + 0.2*0 + 0.1*1 pending = 0.4
        assert_eq!(second.demand_score, 0.4);
    }

    #[tokio::test]
    async fn market_insights_require_farmer_role_and_profile() {
        let store = seeded_store().await;
        let engine = engine(store);

        let denied = engine.market_insights(&Caller::customer("cust-1")).await;
        assert!(matches!(denied, Err(EngineError::NotAuthorized(_))));

        let missing = engine.market_insights(&Caller::farmer("user-without-farm")).await;
        assert!(matches!(missing, Err(EngineError::NotFound { entity: "farmer profile", .. })));
    }

    #[tokio::test]
    async fn customer_preferences_exclude_never_viewed_products() {
        let store = seeded_store().await;
        let preferences = engine(store).customer_preferences().await.expect("preferences");

        // prod-okra has zero viewers: absent from the ranking, not zero.
        assert!(preferences.iter().all(|row| row.product_id.0 != "prod-okra"));
        assert!(preferences.len() <= PREFERENCE_LIMIT);

        let top = &preferences[0];
        assert_eq!(top.product_id.0, "prod-kale");
        // 0.4*3 viewers + 0.5*2 purchases + 0.1*4.5 rating = 2.65
        assert_eq!(top.popularity_score, 2.65);
        assert!(preferences.windows(2).all(|pair| pair[0].popularity_score
            >= pair[1].popularity_score));
    }

    #[tokio::test]
    async fn personalized_bundle_has_three_independent_lists() {
        let store = seeded_store().await;
        let caller = Caller::customer("cust-1");
        let bundle = engine(store)
            .personalized_recommendations(&caller, at("2026-05-20T12:00:00Z"))
            .await
            .expect("bundle");

        // cust-1 viewed kale then tomato; newest first.
        assert_eq!(bundle.recently_viewed.len(), 2);
        assert_eq!(bundle.recently_viewed[0].product.id.0, "prod-kale");
        assert_eq!(bundle.recently_viewed[1].product.id.0, "prod-tomato");

        // Similar products share a viewed category but are never viewed.
        let viewed: HashSet<&str> = ["prod-kale", "prod-tomato"].into_iter().collect();
        assert!(!bundle.similar_products.is_empty());
        for product in &bundle.similar_products {
            assert!(!viewed.contains(product.id.0.as_str()));
            assert_eq!(product.category, "vegetables");
        }

        // Trending requires an in-window view.
        assert!(!bundle.trending_products.is_empty());
        assert!(bundle.trending_products.iter().all(|entry| entry.view_count > 0));
        assert!(bundle
            .trending_products
            .windows(2)
            .all(|pair| pair[0].trending_score >= pair[1].trending_score));
    }

    #[tokio::test]
    async fn personalized_requires_customer_role() {
        let store = seeded_store().await;
        let denied = engine(store)
            .personalized_recommendations(&Caller::farmer("user-farmer-1"), Utc::now())
            .await;
        assert!(matches!(denied, Err(EngineError::NotAuthorized(_))));
    }

    #[tokio::test]
    async fn similar_products_sampling_is_reproducible_with_a_seed() {
        let store = seeded_store().await;
        let caller = Caller::customer("cust-1");
        let now = at("2026-05-20T12:00:00Z");

        let first = RecommendationEngine::with_sampler(
            store.clone(),
            Arc::new(SeededSampler::new(9)),
        )
        .personalized_recommendations(&caller, now)
        .await
        .expect("first");
        let second = RecommendationEngine::with_sampler(
            store.clone(),
            Arc::new(SeededSampler::new(9)),
        )
        .personalized_recommendations(&caller, now)
        .await
        .expect("second");

        assert_eq!(first.similar_products, second.similar_products);
    }

    #[tokio::test]
    async fn demand_analysis_echoes_weights_and_ranks_descending() {
        let store = seeded_store().await;
        let analysis = engine(store)
            .demand_analysis(&Caller::farmer("user-farmer-1"))
            .await
            .expect("analysis");

        assert_eq!(analysis.weights, scoring::DEMAND_WEIGHTS);
        assert_eq!(analysis.entries.len(), 2);

        let kale = &analysis.entries[0];
        assert_eq!(kale.product_id.0, "prod-kale");
        // 0.4*3 views + 0.3*1.0 trend + 0.3*0 unmet = 1.5
        assert_eq!(kale.demand_score, 1.5);
        assert_eq!(kale.price_trend_indicator, 1.0);

        let tomato = &analysis.entries[1];
        // 0.4*1 view + 0.3*0.5 trend + 0.3*1 pending = 0.85
        assert_eq!(tomato.demand_score, 0.85);
        assert_eq!(tomato.price_trend_indicator, 0.5);
    }

    #[tokio::test]
    async fn zero_signal_catalog_yields_zero_demand_scores() {
        let store = Arc::new(InMemorySignalStore::default());
        store.insert_farmer(farmer("farmer-9", "user-farmer-9")).await;
        store.insert_product(listing("prod-idle", "farmer-9", "herbs", 30)).await;

        let analysis = engine(store)
            .demand_analysis(&Caller::farmer("user-farmer-9"))
            .await
            .expect("analysis");
        assert_eq!(analysis.entries.len(), 1);
        assert_eq!(analysis.entries[0].demand_score, 0.0);
    }

    #[tokio::test]
    async fn performance_metrics_compose_factors_level_and_recommendations() {
        let store = seeded_store().await;
        let report = engine(store)
            .performance_metrics(&Caller::farmer("user-farmer-1"), at("2026-05-20T12:00:00Z"))
            .await
            .expect("report");

        // 2 of 3 orders delivered.
        assert!((report.factors.fulfillment_rate - 66.666_666).abs() < 0.001);
        assert_eq!(report.factors.avg_rating, 4.5);
        // ord-1 responded in 6h, ord-3 in 4h.
        assert_eq!(report.factors.avg_response_hours, 5.0);
        // Week of May 18: 220; week of May 11: 80 -> +175%.
        assert_eq!(report.factors.sales_growth_pct, 175.0);

        assert_eq!(report.score, scoring::performance_score(&report.factors));
        assert_eq!(report.level, scoring::performance_level(report.score));
        // Fulfillment below 90 fires; growth is positive so that check
        // stays quiet.
        assert!(report.recommendations.iter().any(|r| r.area == "Order Fulfillment"));
        assert!(report.recommendations.iter().all(|r| r.area != "Sales Growth"));
        assert_eq!(report.weekly_sales.len(), 2);
    }

    #[tokio::test]
    async fn performance_metrics_default_to_zero_without_history() {
        let store = Arc::new(InMemorySignalStore::default());
        store.insert_farmer(farmer("farmer-9", "user-farmer-9")).await;

        let report = engine(store)
            .performance_metrics(&Caller::farmer("user-farmer-9"), Utc::now())
            .await
            .expect("report");
        assert_eq!(report.factors.fulfillment_rate, 0.0);
        assert_eq!(report.factors.avg_rating, 0.0);
        assert_eq!(report.factors.avg_response_hours, 0.0);
        assert_eq!(report.factors.sales_growth_pct, 0.0);
        // 0.2 * (24 - 0) responsiveness is the only non-zero factor.
        assert_eq!(report.score, 4.8);
        assert_eq!(report.level, PerformanceLevel::Poor);
    }

    #[tokio::test]
    async fn seasonal_window_wraps_december_into_january() {
        let store = Arc::new(InMemorySignalStore::default());
        store.insert_farmer(farmer("farmer-1", "user-farmer-1")).await;

        let mut december = listing("prod-dec", "farmer-1", "fruits", 100);
        december.harvest_date = NaiveDate::from_ymd_opt(2026, 12, 15);
        let mut january = listing("prod-jan", "farmer-1", "fruits", 100);
        january.harvest_date = NaiveDate::from_ymd_opt(2027, 1, 10);
        let mut march = listing("prod-mar", "farmer-1", "fruits", 100);
        march.harvest_date = NaiveDate::from_ymd_opt(2027, 3, 1);
        store.insert_product(december).await;
        store.insert_product(january).await;
        store.insert_product(march).await;

        let report = engine(store)
            .seasonal_recommendations(NaiveDate::from_ymd_opt(2026, 12, 3).expect("date"))
            .await
            .expect("seasonal");

        assert_eq!(report.current_month, 12);
        let months: Vec<u32> = report.groups.iter().map(|group| group.harvest_month).collect();
        assert!(months.contains(&12));
        assert!(months.contains(&1));
        assert!(!months.contains(&3));
    }

    #[tokio::test]
    async fn sales_report_rolls_up_delivered_orders_only() {
        let store = seeded_store().await;
        let report = engine(store)
            .sales_report(
                &Caller::farmer("user-farmer-1"),
                ReportPeriod::Monthly,
                at("2026-05-20T12:00:00Z"),
            )
            .await
            .expect("report");

        assert_eq!(report.period, ReportPeriod::Monthly);
        assert_eq!(report.daily.len(), 2);
        assert_eq!(report.summary.total_orders, 2);
        assert_eq!(report.summary.total_sales, Decimal::from(240));
        // Only kale sold through delivered orders: 2 + 1 units.
        assert_eq!(report.product_performance.len(), 1);
        assert_eq!(report.product_performance[0].product_id.0, "prod-kale");
        assert_eq!(report.summary.total_items_sold, 3);
    }

    #[tokio::test]
    async fn review_summary_counts_distribution_for_farmer_products() {
        let store = seeded_store().await;
        let summary = engine(store)
            .review_summary(&Caller::farmer("user-farmer-1"))
            .await
            .expect("summary");
        assert_eq!(summary.total, 2);
        assert_eq!(summary.average, 4.5);
        assert_eq!(summary.distribution, [0, 0, 0, 1, 1]);
    }

    #[tokio::test]
    async fn record_product_view_requires_customer_role_and_upserts() {
        let store = seeded_store().await;
        let engine = engine(store.clone());
        let product = ProductId("prod-okra".to_string());

        let denied = engine
            .record_product_view(&Caller::farmer("user-farmer-1"), &product, Utc::now())
            .await;
        assert!(matches!(denied, Err(EngineError::NotAuthorized(_))));

        let caller = Caller::customer("cust-9");
        let before = store.view_count().await;
        engine
            .record_product_view(&caller, &product, at("2026-05-20T10:00:00Z"))
            .await
            .expect("first view");
        engine
            .record_product_view(&caller, &product, at("2026-05-20T11:00:00Z"))
            .await
            .expect("second view");
        assert_eq!(store.view_count().await, before + 1);
    }

    #[test]
    fn timestamps_parse_in_test_helpers() {
        assert_eq!(at("2026-05-20T12:00:00Z"), Utc.with_ymd_and_hms(2026, 5, 20, 12, 0, 0).unwrap());
    }
}
