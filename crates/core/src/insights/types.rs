//! Metric and result types for the market-intelligence engine.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::farmer::FarmerId;
use crate::domain::product::{Product, ProductId};

use super::scoring::DemandWeights;

/// Per-product signal aggregate. Built fresh for each request from the
/// Signal Store and never mutated afterwards; scoring reads it only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductMetrics {
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    pub view_count: u64,
    pub distinct_viewer_count: u64,
    pub purchase_count: u64,
    pub avg_rating: f64,
    pub unmet_demand_count: u64,
    pub revenue: Decimal,
    pub harvest_month: Option<u32>,
}

/// Category-level aggregate over AVAILABLE listings, computed independently
/// of any per-product aggregation and joined by category key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryMetrics {
    pub category: String,
    pub avg_price: Decimal,
    pub listing_count: u64,
    pub farmer_count: u64,
}

/// One row of the farmer-facing market insight ranking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketInsight {
    pub metrics: ProductMetrics,
    pub demand_score: f64,
    /// Category average price across the whole market, when the category
    /// has any available listings.
    pub market_avg_price: Option<Decimal>,
    /// Distinct farmers selling in the same category.
    pub market_competition: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketInsightsReport {
    pub farmer_id: FarmerId,
    pub insights: Vec<MarketInsight>,
}

/// Catalog-wide (category, product) popularity row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryPreference {
    pub category: String,
    pub product_id: ProductId,
    pub product_name: String,
    pub unique_viewers: u64,
    pub total_purchases: u64,
    pub avg_rating: f64,
    pub popularity_score: f64,
}

/// Listings grouped by (category, harvest month) inside the active
/// seasonal window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeasonalGroup {
    pub category: String,
    pub harvest_month: u32,
    pub listing_count: u64,
    pub avg_price: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeasonalReport {
    pub current_month: u32,
    pub groups: Vec<SeasonalGroup>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewedProduct {
    pub product: Product,
    pub viewed_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendingProduct {
    pub product: Product,
    pub view_count: u64,
    pub purchase_count: u64,
    pub trending_score: f64,
}

/// The three personalized lists. They are fetched concurrently and carry
/// no ordering relationship to each other.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersonalizedBundle {
    pub recently_viewed: Vec<ViewedProduct>,
    pub similar_products: Vec<Product>,
    pub trending_products: Vec<TrendingProduct>,
}

/// One row of the demand analysis, exposing the raw factors the score was
/// formed from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DemandEntry {
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    pub view_count: u64,
    pub price_trend_indicator: f64,
    pub unmet_demand_count: u64,
    pub demand_score: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DemandAnalysis {
    pub entries: Vec<DemandEntry>,
    /// The weight constants used, echoed so consumers can audit the score.
    pub weights: DemandWeights,
}

/// Raw factor values feeding the composite performance score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerformanceFactors {
    /// Percentage of the farmer's orders with status DELIVERED.
    pub fulfillment_rate: f64,
    /// Mean feedback rating across the farmer's products, 0 when none.
    pub avg_rating: f64,
    /// Mean hours between order placement and last update over non-PENDING
    /// orders, 0 when none qualify.
    pub avg_response_hours: f64,
    /// Percent change between the two most recent weekly sales buckets.
    pub sales_growth_pct: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PerformanceLevel {
    Excellent,
    Good,
    Average,
    NeedsImprovement,
    Poor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationPriority {
    High,
    Medium,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceRecommendation {
    pub area: String,
    pub suggestion: String,
    pub priority: RecommendationPriority,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeeklySales {
    pub week_start: NaiveDate,
    pub total_sales: Decimal,
    pub order_count: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub factors: PerformanceFactors,
    pub score: f64,
    pub level: PerformanceLevel,
    pub recommendations: Vec<PerformanceRecommendation>,
    /// Most recent bucket first.
    pub weekly_sales: Vec<WeeklySales>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPeriod {
    Weekly,
    Monthly,
    Yearly,
}

impl ReportPeriod {
    pub fn window_days(&self) -> i64 {
        match self {
            ReportPeriod::Weekly => 7,
            ReportPeriod::Monthly => 30,
            ReportPeriod::Yearly => 365,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailySales {
    pub day: NaiveDate,
    pub order_count: u64,
    pub total_sales: Decimal,
    pub items_sold: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductSales {
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    pub quantity_sold: u64,
    pub revenue: Decimal,
    pub avg_rating: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub total_sales: Decimal,
    pub total_orders: u64,
    pub total_items_sold: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SalesReport {
    pub period: ReportPeriod,
    /// Per-day DELIVERED rollups, most recent day first.
    pub daily: Vec<DailySales>,
    /// Per-product DELIVERED rollups, highest revenue first.
    pub product_performance: Vec<ProductSales>,
    pub summary: SalesSummary,
}

/// Rating statistics over the feedback left for a farmer's products.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub total: u64,
    pub average: f64,
    /// Counts of 1..=5 star ratings, index 0 holding one-star.
    pub distribution: [u64; 5],
}
