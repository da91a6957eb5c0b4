//! Signal Store collaborator boundary.
//!
//! The engine reads raw behavioral signals (views, orders, feedback,
//! listings) through this trait and performs exactly one write: the
//! idempotent view upsert. Implementations own the persistence format;
//! the engine only sees domain values.

mod memory;

pub use memory::InMemorySignalStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::farmer::{Farmer, FarmerId};
use crate::domain::feedback::Feedback;
use crate::domain::identity::{CustomerId, UserId};
use crate::domain::order::{Order, OrderLine};
use crate::domain::product::{Product, ProductId};
use crate::domain::view::ViewEvent;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("signal store backend failure: {0}")]
    Backend(String),
    #[error("signal store returned a malformed record: {0}")]
    Decode(String),
}

#[async_trait]
pub trait SignalStore: Send + Sync {
    /// Resolve the farmer profile owned by a user, if any.
    async fn farmer_for_user(&self, user_id: &UserId) -> Result<Option<Farmer>, StoreError>;

    /// Every listing of one farmer, regardless of status.
    async fn products_for_farmer(
        &self,
        farmer_id: &FarmerId,
    ) -> Result<Vec<Product>, StoreError>;

    async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError>;

    /// All AVAILABLE listings across the marketplace.
    async fn available_products(&self) -> Result<Vec<Product>, StoreError>;

    /// View events for the given products, optionally restricted to
    /// `viewed_at >= since`.
    async fn views_for_products(
        &self,
        ids: &[ProductId],
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ViewEvent>, StoreError>;

    async fn views_for_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<ViewEvent>, StoreError>;

    async fn orders_for_farmer(&self, farmer_id: &FarmerId) -> Result<Vec<Order>, StoreError>;

    /// Order items for the given products, each joined with its parent
    /// order's status and date.
    async fn order_lines_for_products(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<OrderLine>, StoreError>;

    async fn feedback_for_products(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<Feedback>, StoreError>;

    /// Idempotent view recording keyed by (customer, product): concurrent
    /// recordings of the same pair must collapse to a single row holding
    /// the latest timestamp.
    async fn record_view(
        &self,
        customer_id: &CustomerId,
        product_id: &ProductId,
        viewed_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}
