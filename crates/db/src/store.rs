//! SQL implementation of the engine's `SignalStore` boundary.
//!
//! Timestamps are stored as RFC 3339 text (always UTC, so lexicographic
//! comparison matches chronological order) and money as decimal text,
//! parsed on read. Filter lists are bound through `QueryBuilder`; no query
//! fragment is ever assembled from raw values.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};

use palengke_core::domain::farmer::{Farmer, FarmerId};
use palengke_core::domain::feedback::{Feedback, FeedbackId};
use palengke_core::domain::identity::{CustomerId, UserId};
use palengke_core::domain::order::{
    Order, OrderId, OrderItem, OrderItemId, OrderLine, OrderStatus,
};
use palengke_core::domain::product::{Product, ProductId, ProductStatus};
use palengke_core::domain::view::ViewEvent;
use palengke_core::store::{SignalStore, StoreError};

use crate::DbPool;

pub struct SqlSignalStore {
    pool: DbPool,
}

impl SqlSignalStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn backend(error: sqlx::Error) -> StoreError {
    StoreError::Backend(error.to_string())
}

fn column<'r, T>(row: &'r SqliteRow, name: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite>,
{
    row.try_get(name).map_err(|error| StoreError::Decode(format!("column `{name}`: {error}")))
}

fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|error| StoreError::Decode(format!("{field} `{value}`: {error}")))
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|error| StoreError::Decode(format!("{field} `{value}`: {error}")))
}

fn parse_decimal(field: &str, value: &str) -> Result<Decimal, StoreError> {
    Decimal::from_str(value)
        .map_err(|error| StoreError::Decode(format!("{field} `{value}`: {error}")))
}

fn parse_quantity(field: &str, value: i64) -> Result<u32, StoreError> {
    u32::try_from(value)
        .map_err(|_| StoreError::Decode(format!("{field} `{value}` is out of range")))
}

fn row_to_farmer(row: &SqliteRow) -> Result<Farmer, StoreError> {
    Ok(Farmer {
        id: FarmerId(column(row, "farmer_id")?),
        user_id: UserId(column(row, "user_id")?),
        farm_name: column(row, "farm_name")?,
    })
}

fn row_to_product(row: &SqliteRow) -> Result<Product, StoreError> {
    let price_text: String = column(row, "price")?;
    let status_text: String = column(row, "status")?;
    let quantity: i64 = column(row, "quantity")?;
    let harvest_date: Option<String> = column(row, "harvest_date")?;

    Ok(Product {
        id: ProductId(column(row, "product_id")?),
        farmer_id: FarmerId(column(row, "farmer_id")?),
        name: column(row, "product_name")?,
        category: column(row, "category")?,
        price: parse_decimal("price", &price_text)?,
        quantity: parse_quantity("quantity", quantity)?,
        harvest_date: harvest_date
            .map(|value| parse_date("harvest_date", &value))
            .transpose()?,
        status: ProductStatus::parse(&status_text)
            .ok_or_else(|| StoreError::Decode(format!("unknown product status `{status_text}`")))?,
    })
}

fn row_to_view(row: &SqliteRow) -> Result<ViewEvent, StoreError> {
    let viewed_at: String = column(row, "viewed_at")?;
    Ok(ViewEvent {
        customer_id: CustomerId(column(row, "customer_id")?),
        product_id: ProductId(column(row, "product_id")?),
        viewed_at: parse_timestamp("viewed_at", &viewed_at)?,
    })
}

fn row_to_order(row: &SqliteRow) -> Result<Order, StoreError> {
    let status_text: String = column(row, "order_status")?;
    let total_text: String = column(row, "total_amount")?;
    let order_date: String = column(row, "order_date")?;
    let updated_at: Option<String> = column(row, "updated_at")?;

    Ok(Order {
        id: OrderId(column(row, "order_id")?),
        farmer_id: FarmerId(column(row, "farmer_id")?),
        status: OrderStatus::parse(&status_text)
            .ok_or_else(|| StoreError::Decode(format!("unknown order status `{status_text}`")))?,
        total_amount: parse_decimal("total_amount", &total_text)?,
        order_date: parse_timestamp("order_date", &order_date)?,
        updated_at: updated_at
            .map(|value| parse_timestamp("updated_at", &value))
            .transpose()?,
    })
}

fn row_to_line(row: &SqliteRow) -> Result<OrderLine, StoreError> {
    let status_text: String = column(row, "order_status")?;
    let order_date: String = column(row, "order_date")?;
    let price_text: String = column(row, "price")?;
    let quantity: i64 = column(row, "quantity")?;

    Ok(OrderLine {
        item: OrderItem {
            id: OrderItemId(column(row, "order_item_id")?),
            order_id: OrderId(column(row, "order_id")?),
            product_id: ProductId(column(row, "product_id")?),
            quantity: parse_quantity("quantity", quantity)?,
            price: parse_decimal("price", &price_text)?,
        },
        status: OrderStatus::parse(&status_text)
            .ok_or_else(|| StoreError::Decode(format!("unknown order status `{status_text}`")))?,
        order_date: parse_timestamp("order_date", &order_date)?,
    })
}

fn row_to_feedback(row: &SqliteRow) -> Result<Feedback, StoreError> {
    let created_at: String = column(row, "created_at")?;
    let rating: i64 = column(row, "rating")?;
    let rating = u8::try_from(rating)
        .map_err(|_| StoreError::Decode(format!("rating `{rating}` is out of range")))?;

    Ok(Feedback {
        id: FeedbackId(column(row, "feedback_id")?),
        product_id: ProductId(column(row, "product_id")?),
        customer_id: CustomerId(column(row, "customer_id")?),
        rating,
        comment: column(row, "comment")?,
        created_at: parse_timestamp("created_at", &created_at)?,
    })
}

fn push_id_list<'args>(builder: &mut QueryBuilder<'args, Sqlite>, ids: &'args [ProductId]) {
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(id.0.as_str());
    }
}

#[async_trait]
impl SignalStore for SqlSignalStore {
    async fn farmer_for_user(&self, user_id: &UserId) -> Result<Option<Farmer>, StoreError> {
        let row = sqlx::query("SELECT farmer_id, user_id, farm_name FROM farmers WHERE user_id = ?")
            .bind(user_id.0.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.as_ref().map(row_to_farmer).transpose()
    }

    async fn products_for_farmer(
        &self,
        farmer_id: &FarmerId,
    ) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(
            "SELECT product_id, farmer_id, product_name, category, price, quantity,
                    harvest_date, status
             FROM products
             WHERE farmer_id = ?
             ORDER BY product_id",
        )
        .bind(farmer_id.0.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.iter().map(row_to_product).collect()
    }

    async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut builder = QueryBuilder::new(
            "SELECT product_id, farmer_id, product_name, category, price, quantity,
                    harvest_date, status
             FROM products
             WHERE product_id IN (",
        );
        push_id_list(&mut builder, ids);
        builder.push(") ORDER BY product_id");

        let rows = builder.build().fetch_all(&self.pool).await.map_err(backend)?;
        rows.iter().map(row_to_product).collect()
    }

    async fn available_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(
            "SELECT product_id, farmer_id, product_name, category, price, quantity,
                    harvest_date, status
             FROM products
             WHERE status = 'AVAILABLE'
             ORDER BY product_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.iter().map(row_to_product).collect()
    }

    async fn views_for_products(
        &self,
        ids: &[ProductId],
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ViewEvent>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut builder = QueryBuilder::new(
            "SELECT customer_id, product_id, viewed_at FROM product_views WHERE product_id IN (",
        );
        push_id_list(&mut builder, ids);
        builder.push(")");
        if let Some(cutoff) = since {
            builder.push(" AND viewed_at >= ");
            builder.push_bind(cutoff.to_rfc3339());
        }

        let rows = builder.build().fetch_all(&self.pool).await.map_err(backend)?;
        rows.iter().map(row_to_view).collect()
    }

    async fn views_for_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<ViewEvent>, StoreError> {
        let rows = sqlx::query(
            "SELECT customer_id, product_id, viewed_at
             FROM product_views
             WHERE customer_id = ?
             ORDER BY viewed_at DESC",
        )
        .bind(customer_id.0.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.iter().map(row_to_view).collect()
    }

    async fn orders_for_farmer(&self, farmer_id: &FarmerId) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query(
            "SELECT order_id, farmer_id, order_status, total_amount, order_date, updated_at
             FROM orders
             WHERE farmer_id = ?
             ORDER BY order_date DESC",
        )
        .bind(farmer_id.0.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.iter().map(row_to_order).collect()
    }

    async fn order_lines_for_products(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<OrderLine>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut builder = QueryBuilder::new(
            "SELECT oi.order_item_id, oi.order_id, oi.product_id, oi.quantity, oi.price,
                    o.order_status, o.order_date
             FROM order_items oi
             JOIN orders o ON oi.order_id = o.order_id
             WHERE oi.product_id IN (",
        );
        push_id_list(&mut builder, ids);
        builder.push(") ORDER BY oi.order_item_id");

        let rows = builder.build().fetch_all(&self.pool).await.map_err(backend)?;
        rows.iter().map(row_to_line).collect()
    }

    async fn feedback_for_products(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<Feedback>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut builder = QueryBuilder::new(
            "SELECT feedback_id, product_id, customer_id, rating, comment, created_at
             FROM feedback
             WHERE product_id IN (",
        );
        push_id_list(&mut builder, ids);
        builder.push(") ORDER BY created_at DESC");

        let rows = builder.build().fetch_all(&self.pool).await.map_err(backend)?;
        rows.iter().map(row_to_feedback).collect()
    }

    async fn record_view(
        &self,
        customer_id: &CustomerId,
        product_id: &ProductId,
        viewed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO product_views (customer_id, product_id, viewed_at)
             VALUES (?, ?, ?)
             ON CONFLICT (customer_id, product_id) DO UPDATE SET viewed_at = excluded.viewed_at",
        )
        .bind(customer_id.0.as_str())
        .bind(product_id.0.as_str())
        .bind(viewed_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }
}
