//! Scoring formulas for the market-intelligence engine.
//!
//! Every score is a pure function of its metric inputs and a fixed weight
//! set; the same inputs always produce the same score. Final scores are
//! rounded to two decimal places, intermediates stay full precision.

use serde::{Deserialize, Serialize};

use super::types::{
    PerformanceFactors, PerformanceLevel, PerformanceRecommendation, ProductMetrics,
    RecommendationPriority,
};

/// Weights for the farmer-catalog demand score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DemandWeights {
    pub view_count: f64,
    pub price_trend: f64,
    pub unmet_demand: f64,
}

/// Weights for the richer market-insight demand score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InsightWeights {
    pub view_count: f64,
    pub purchase_count: f64,
    pub avg_rating: f64,
    pub unmet_demand: f64,
}

/// Weights for the catalog-wide popularity score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopularityWeights {
    pub distinct_viewers: f64,
    pub purchase_count: f64,
    pub avg_rating: f64,
}

/// Weights for the time-windowed trending score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendingWeights {
    pub view_count: f64,
    pub purchase_count: f64,
}

/// Weights for the 0-100 farmer performance composite.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerformanceWeights {
    pub fulfillment: f64,
    pub rating: f64,
    pub responsiveness: f64,
    pub growth: f64,
}

pub const DEMAND_WEIGHTS: DemandWeights =
    DemandWeights { view_count: 0.4, price_trend: 0.3, unmet_demand: 0.3 };

pub const INSIGHT_WEIGHTS: InsightWeights =
    InsightWeights { view_count: 0.3, purchase_count: 0.4, avg_rating: 0.2, unmet_demand: 0.1 };

pub const POPULARITY_WEIGHTS: PopularityWeights =
    PopularityWeights { distinct_viewers: 0.4, purchase_count: 0.5, avg_rating: 0.1 };

pub const TRENDING_WEIGHTS: TrendingWeights =
    TrendingWeights { view_count: 0.6, purchase_count: 0.4 };

pub const PERFORMANCE_WEIGHTS: PerformanceWeights =
    PerformanceWeights { fulfillment: 0.3, rating: 0.3, responsiveness: 0.2, growth: 0.2 };

/// Round a final score to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Coarse purchase-based proxy: 1.0 once a product has sold at least once,
/// 0.5 otherwise. Not a real price trend.
pub fn price_trend_indicator(purchase_count: u64) -> f64 {
    if purchase_count > 0 {
        1.0
    } else {
        0.5
    }
}

/// Demand score for ranking a farmer's own catalog. A product with no
/// signals at all scores 0; the 0.5 trend floor only applies once any
/// signal exists.
pub fn demand_score(view_count: u64, purchase_count: u64, unmet_demand_count: u64) -> f64 {
    if view_count == 0 && purchase_count == 0 && unmet_demand_count == 0 {
        return 0.0;
    }
    let w = DEMAND_WEIGHTS;
    round2(
        view_count as f64 * w.view_count
            + price_trend_indicator(purchase_count) * w.price_trend
            + unmet_demand_count as f64 * w.unmet_demand,
    )
}

/// Richer farmer-facing demand score used by market insights.
pub fn insight_demand_score(metrics: &ProductMetrics) -> f64 {
    let w = INSIGHT_WEIGHTS;
    round2(
        metrics.view_count as f64 * w.view_count
            + metrics.purchase_count as f64 * w.purchase_count
            + metrics.avg_rating * w.avg_rating
            + metrics.unmet_demand_count as f64 * w.unmet_demand,
    )
}

/// Catalog-wide popularity score. Callers must exclude zero-viewer
/// entities before scoring; a never-viewed item has no popularity rank.
pub fn popularity_score(metrics: &ProductMetrics) -> f64 {
    let w = POPULARITY_WEIGHTS;
    round2(
        metrics.distinct_viewer_count as f64 * w.distinct_viewers
            + metrics.purchase_count as f64 * w.purchase_count
            + metrics.avg_rating * w.avg_rating,
    )
}

/// Trending score over window-restricted view and purchase counts.
pub fn trending_score(view_count: u64, purchase_count: u64) -> f64 {
    let w = TRENDING_WEIGHTS;
    round2(view_count as f64 * w.view_count + purchase_count as f64 * w.purchase_count)
}

/// Composite 0-100 farmer performance score. The rating factor converts
/// the 5-star scale to 100 points; responsiveness caps at 24 hours so
/// slower-than-a-day farmers all bottom out at zero for that factor.
pub fn performance_score(factors: &PerformanceFactors) -> f64 {
    let w = PERFORMANCE_WEIGHTS;
    round2(
        factors.fulfillment_rate * w.fulfillment
            + factors.avg_rating * 20.0 * w.rating
            + (24.0 - factors.avg_response_hours.min(24.0)) * w.responsiveness
            + factors.sales_growth_pct * w.growth,
    )
}

pub fn performance_level(score: f64) -> PerformanceLevel {
    if score >= 80.0 {
        PerformanceLevel::Excellent
    } else if score >= 70.0 {
        PerformanceLevel::Good
    } else if score >= 60.0 {
        PerformanceLevel::Average
    } else if score >= 50.0 {
        PerformanceLevel::NeedsImprovement
    } else {
        PerformanceLevel::Poor
    }
}

/// Independent improvement checks; zero, some, or all may fire.
pub fn performance_recommendations(
    factors: &PerformanceFactors,
) -> Vec<PerformanceRecommendation> {
    let mut recommendations = Vec::new();

    if factors.fulfillment_rate < 90.0 {
        recommendations.push(PerformanceRecommendation {
            area: "Order Fulfillment".to_string(),
            suggestion: "Improve delivery time and order accuracy".to_string(),
            priority: RecommendationPriority::High,
        });
    }

    if factors.avg_rating < 4.0 {
        recommendations.push(PerformanceRecommendation {
            area: "Customer Satisfaction".to_string(),
            suggestion: "Check feedback and improve product quality".to_string(),
            priority: RecommendationPriority::High,
        });
    }

    if factors.avg_response_hours > 12.0 {
        recommendations.push(PerformanceRecommendation {
            area: "Response Time".to_string(),
            suggestion: "Respond to orders and messages faster".to_string(),
            priority: RecommendationPriority::Medium,
        });
    }

    if factors.sales_growth_pct < 0.0 {
        recommendations.push(PerformanceRecommendation {
            area: "Sales Growth".to_string(),
            suggestion: "Consider promotional offers or new products".to_string(),
            priority: RecommendationPriority::Medium,
        });
    }

    recommendations
}
