use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::farmer::{Farmer, FarmerId};
use crate::domain::feedback::Feedback;
use crate::domain::identity::{CustomerId, UserId};
use crate::domain::order::{Order, OrderItem, OrderLine};
use crate::domain::product::{Product, ProductId};
use crate::domain::view::ViewEvent;

use super::{SignalStore, StoreError};

/// In-memory `SignalStore` mirroring the SQL store's semantics, including
/// the (customer, product) view upsert key. Used by engine tests and any
/// embedding that does not want a database.
#[derive(Default)]
pub struct InMemorySignalStore {
    farmers: RwLock<Vec<Farmer>>,
    products: RwLock<Vec<Product>>,
    views: RwLock<HashMap<(CustomerId, ProductId), ViewEvent>>,
    orders: RwLock<Vec<Order>>,
    items: RwLock<Vec<OrderItem>>,
    feedback: RwLock<Vec<Feedback>>,
}

impl InMemorySignalStore {
    pub async fn insert_farmer(&self, farmer: Farmer) {
        self.farmers.write().await.push(farmer);
    }

    pub async fn insert_product(&self, product: Product) {
        self.products.write().await.push(product);
    }

    pub async fn insert_order(&self, order: Order) {
        self.orders.write().await.push(order);
    }

    pub async fn insert_order_item(&self, item: OrderItem) {
        self.items.write().await.push(item);
    }

    pub async fn insert_feedback(&self, feedback: Feedback) {
        self.feedback.write().await.push(feedback);
    }

    pub async fn view_count(&self) -> usize {
        self.views.read().await.len()
    }
}

#[async_trait]
impl SignalStore for InMemorySignalStore {
    async fn farmer_for_user(&self, user_id: &UserId) -> Result<Option<Farmer>, StoreError> {
        let farmers = self.farmers.read().await;
        Ok(farmers.iter().find(|farmer| &farmer.user_id == user_id).cloned())
    }

    async fn products_for_farmer(
        &self,
        farmer_id: &FarmerId,
    ) -> Result<Vec<Product>, StoreError> {
        let products = self.products.read().await;
        Ok(products.iter().filter(|product| &product.farmer_id == farmer_id).cloned().collect())
    }

    async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError> {
        let products = self.products.read().await;
        Ok(products.iter().filter(|product| ids.contains(&product.id)).cloned().collect())
    }

    async fn available_products(&self) -> Result<Vec<Product>, StoreError> {
        let products = self.products.read().await;
        Ok(products.iter().filter(|product| product.is_available()).cloned().collect())
    }

    async fn views_for_products(
        &self,
        ids: &[ProductId],
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ViewEvent>, StoreError> {
        let views = self.views.read().await;
        Ok(views
            .values()
            .filter(|view| ids.contains(&view.product_id))
            .filter(|view| since.map_or(true, |cutoff| view.viewed_at >= cutoff))
            .cloned()
            .collect())
    }

    async fn views_for_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<ViewEvent>, StoreError> {
        let views = self.views.read().await;
        Ok(views.values().filter(|view| &view.customer_id == customer_id).cloned().collect())
    }

    async fn orders_for_farmer(&self, farmer_id: &FarmerId) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().await;
        Ok(orders.iter().filter(|order| &order.farmer_id == farmer_id).cloned().collect())
    }

    async fn order_lines_for_products(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<OrderLine>, StoreError> {
        let orders = self.orders.read().await;
        let items = self.items.read().await;

        let mut lines = Vec::new();
        for item in items.iter().filter(|item| ids.contains(&item.product_id)) {
            let parent = orders
                .iter()
                .find(|order| order.id == item.order_id)
                .ok_or_else(|| {
                    StoreError::Decode(format!("order item {} has no parent order", item.id.0))
                })?;
            lines.push(OrderLine {
                item: item.clone(),
                status: parent.status,
                order_date: parent.order_date,
            });
        }
        Ok(lines)
    }

    async fn feedback_for_products(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<Feedback>, StoreError> {
        let feedback = self.feedback.read().await;
        Ok(feedback.iter().filter(|entry| ids.contains(&entry.product_id)).cloned().collect())
    }

    async fn record_view(
        &self,
        customer_id: &CustomerId,
        product_id: &ProductId,
        viewed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut views = self.views.write().await;
        views.insert(
            (customer_id.clone(), product_id.clone()),
            ViewEvent {
                customer_id: customer_id.clone(),
                product_id: product_id.clone(),
                viewed_at,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    #[tokio::test]
    async fn record_view_is_idempotent_per_customer_product_pair() {
        let store = InMemorySignalStore::default();
        let customer = CustomerId("cust-1".to_string());
        let product = ProductId("prod-1".to_string());

        let first = Utc::now() - Duration::hours(2);
        let second = Utc::now();

        store.record_view(&customer, &product, first).await.expect("first view");
        store.record_view(&customer, &product, second).await.expect("second view");

        assert_eq!(store.view_count().await, 1);
        let views = store.views_for_customer(&customer).await.expect("views");
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].viewed_at, second);
    }

    #[tokio::test]
    async fn views_for_products_honors_the_window() {
        let store = InMemorySignalStore::default();
        let product = ProductId("prod-1".to_string());
        let now = Utc::now();

        store
            .record_view(&CustomerId("old".to_string()), &product, now - Duration::days(30))
            .await
            .expect("old view");
        store
            .record_view(&CustomerId("recent".to_string()), &product, now - Duration::days(2))
            .await
            .expect("recent view");

        let windowed = store
            .views_for_products(std::slice::from_ref(&product), Some(now - Duration::days(7)))
            .await
            .expect("windowed views");
        assert_eq!(windowed.len(), 1);
        assert_eq!(windowed[0].customer_id.0, "recent");

        let all = store
            .views_for_products(std::slice::from_ref(&product), None)
            .await
            .expect("all views");
        assert_eq!(all.len(), 2);
    }
}
