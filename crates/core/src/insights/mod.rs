//! Market-intelligence and recommendation engine.
//!
//! Converts raw behavioral signals (views, orders, feedback, listing
//! metadata) into ranked outputs: demand scores, popularity, seasonal
//! suitability, personalized suggestions, and a composite seller
//! performance score. All scoring is deterministic weighted aggregation;
//! the only sanctioned randomness is similar-product sampling, behind an
//! injectable [`Sampler`].

pub mod aggregator;
mod engine;
mod ranker;
mod sampler;
pub mod scoring;
mod types;

pub use engine::RecommendationEngine;
pub use ranker::rank_by_score;
pub use sampler::{Sampler, SeededSampler, ThreadRngSampler};
pub use types::*;

use crate::errors::EngineError;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// View window for the trending list.
pub const TRENDING_WINDOW_DAYS: i64 = 7;

/// Weeks of history feeding the sales-growth factor.
pub const SALES_TREND_WEEKS: i64 = 12;

/// Months covered by the seasonal window, starting at the current month.
pub const SEASONAL_WINDOW_MONTHS: u32 = 2;

pub const RECENTLY_VIEWED_LIMIT: usize = 10;
pub const SIMILAR_PRODUCT_LIMIT: usize = 5;
pub const TRENDING_LIMIT: usize = 5;
pub const PREFERENCE_LIMIT: usize = 5;
