use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::farmer::FarmerId;
use super::product::ProductId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderItemId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    NoStock,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::NoStock => "NO_STOCK",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(OrderStatus::Pending),
            "CONFIRMED" => Some(OrderStatus::Confirmed),
            "NO_STOCK" => Some(OrderStatus::NoStock),
            "DELIVERED" => Some(OrderStatus::Delivered),
            "CANCELLED" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

/// Named set of order statuses an aggregation counts. Call sites must pick
/// one explicitly; realized sales and unmet demand must never share a set
/// by accident.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CountedStatuses(&'static [OrderStatus]);

impl CountedStatuses {
    /// Orders that completed: the only ones that count as sales.
    pub const REALIZED_SALES: Self = Self(&[OrderStatus::Delivered]);

    /// Orders stuck in non-fulfilled states: demand exceeding supply.
    pub const UNMET_DEMAND: Self = Self(&[OrderStatus::Pending, OrderStatus::NoStock]);

    pub fn contains(&self, status: OrderStatus) -> bool {
        self.0.contains(&status)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub farmer_id: FarmerId,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub order_date: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Decimal,
}

/// An order item joined with the parent order fields aggregations need.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item: OrderItem,
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
}
