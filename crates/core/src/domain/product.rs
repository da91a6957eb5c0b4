use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::farmer::FarmerId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    Available,
    Unavailable,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Available => "AVAILABLE",
            ProductStatus::Unavailable => "UNAVAILABLE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "AVAILABLE" => Some(ProductStatus::Available),
            "UNAVAILABLE" => Some(ProductStatus::Unavailable),
            _ => None,
        }
    }
}

/// A marketplace listing. `harvest_date` is optional; seasonal matching
/// only considers listings that carry one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub farmer_id: FarmerId,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub quantity: u32,
    pub harvest_date: Option<NaiveDate>,
    pub status: ProductStatus,
}

impl Product {
    pub fn is_available(&self) -> bool {
        self.status == ProductStatus::Available
    }

    /// Calendar month (1-12) of the harvest date, when present.
    pub fn harvest_month(&self) -> Option<u32> {
        self.harvest_date.map(|date| date.month())
    }
}
