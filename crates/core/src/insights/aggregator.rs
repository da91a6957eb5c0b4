//! Signal aggregation: raw store rows in, per-entity metrics out.
//!
//! Pure functions over slices of domain rows. Entities with zero events
//! produce all-zero metrics; dropping them is the ranker's call, not ours.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Duration, NaiveDate, Utc, Weekday};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::domain::feedback::Feedback;
use crate::domain::identity::CustomerId;
use crate::domain::order::{CountedStatuses, Order, OrderLine, OrderStatus};
use crate::domain::product::{Product, ProductId};
use crate::domain::view::ViewEvent;

use super::types::{
    CategoryMetrics, DailySales, ProductMetrics, ProductSales, ReviewSummary, SeasonalGroup,
    WeeklySales,
};

/// Inclusive month range that wraps the year boundary: a range starting at
/// December with two months covers {12, 1}.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonthRange {
    start: u32,
    months: u32,
}

impl MonthRange {
    pub fn new(start: u32, months: u32) -> Self {
        debug_assert!((1..=12).contains(&start));
        Self { start, months: months.min(12) }
    }

    pub fn contains(&self, month: u32) -> bool {
        if !(1..=12).contains(&month) {
            return false;
        }
        (month + 12 - self.start) % 12 < self.months
    }

    pub fn start(&self) -> u32 {
        self.start
    }
}

/// Collapse raw view rows to the latest view per (customer, product) pair.
/// The store's upsert already guarantees this shape; aggregation tolerates
/// duplicates anyway so a misbehaving store cannot inflate counts.
pub fn latest_views(views: &[ViewEvent]) -> Vec<ViewEvent> {
    let mut latest: HashMap<(&CustomerId, &ProductId), &ViewEvent> = HashMap::new();
    for view in views {
        latest
            .entry((&view.customer_id, &view.product_id))
            .and_modify(|existing| {
                if view.viewed_at > existing.viewed_at {
                    *existing = view;
                }
            })
            .or_insert(view);
    }
    latest.into_values().cloned().collect()
}

/// Order items counted for a product under an explicit status set.
pub fn purchase_count(lines: &[OrderLine], product_id: &ProductId, counted: CountedStatuses) -> u64 {
    lines
        .iter()
        .filter(|line| &line.item.product_id == product_id && counted.contains(line.status))
        .count() as u64
}

/// Mean feedback rating for a product; 0 when no feedback exists, never
/// NaN, so callers need no missing-data branch.
pub fn avg_rating(feedback: &[Feedback], product_id: &ProductId) -> f64 {
    let ratings: Vec<u8> = feedback
        .iter()
        .filter(|entry| &entry.product_id == product_id)
        .map(|entry| entry.rating)
        .collect();
    if ratings.is_empty() {
        return 0.0;
    }
    ratings.iter().map(|rating| f64::from(*rating)).sum::<f64>() / ratings.len() as f64
}

/// Realized revenue for a product: quantity times price over DELIVERED
/// lines, optionally window-restricted.
pub fn revenue(
    lines: &[OrderLine],
    product_id: &ProductId,
    since: Option<DateTime<Utc>>,
) -> Decimal {
    lines
        .iter()
        .filter(|line| &line.item.product_id == product_id)
        .filter(|line| CountedStatuses::REALIZED_SALES.contains(line.status))
        .filter(|line| since.map_or(true, |cutoff| line.order_date >= cutoff))
        .map(|line| Decimal::from(line.item.quantity) * line.item.price)
        .sum()
}

/// One metrics record per product in scope, zero-filled where no signals
/// exist.
pub fn product_metrics(
    products: &[Product],
    views: &[ViewEvent],
    lines: &[OrderLine],
    feedback: &[Feedback],
) -> Vec<ProductMetrics> {
    let views = latest_views(views);

    products
        .iter()
        .map(|product| {
            let product_views: Vec<&ViewEvent> =
                views.iter().filter(|view| view.product_id == product.id).collect();
            let viewers: HashSet<&CustomerId> =
                product_views.iter().map(|view| &view.customer_id).collect();

            ProductMetrics {
                product_id: product.id.clone(),
                name: product.name.clone(),
                category: product.category.clone(),
                view_count: product_views.len() as u64,
                distinct_viewer_count: viewers.len() as u64,
                purchase_count: purchase_count(
                    lines,
                    &product.id,
                    CountedStatuses::REALIZED_SALES,
                ),
                avg_rating: avg_rating(feedback, &product.id),
                unmet_demand_count: purchase_count(
                    lines,
                    &product.id,
                    CountedStatuses::UNMET_DEMAND,
                ),
                revenue: revenue(lines, &product.id, None),
                harvest_month: product.harvest_month(),
            }
        })
        .collect()
}

/// Category aggregates over AVAILABLE listings only.
pub fn category_metrics(products: &[Product]) -> Vec<CategoryMetrics> {
    let mut grouped: BTreeMap<&str, (Decimal, u64, HashSet<&str>)> = BTreeMap::new();
    for product in products.iter().filter(|product| product.is_available()) {
        let entry = grouped.entry(product.category.as_str()).or_default();
        entry.0 += product.price;
        entry.1 += 1;
        entry.2.insert(product.farmer_id.0.as_str());
    }

    grouped
        .into_iter()
        .map(|(category, (price_sum, listing_count, farmers))| CategoryMetrics {
            category: category.to_string(),
            avg_price: (price_sum / Decimal::from(listing_count)).round_dp(2),
            listing_count,
            farmer_count: farmers.len() as u64,
        })
        .collect()
}

/// AVAILABLE listings with a harvest month inside the range, grouped by
/// (category, month), largest groups first.
pub fn seasonal_groups(products: &[Product], range: MonthRange) -> Vec<SeasonalGroup> {
    let mut grouped: BTreeMap<(&str, u32), (Decimal, u64)> = BTreeMap::new();
    for product in products.iter().filter(|product| product.is_available()) {
        let Some(month) = product.harvest_month() else { continue };
        if !range.contains(month) {
            continue;
        }
        let entry = grouped.entry((product.category.as_str(), month)).or_default();
        entry.0 += product.price;
        entry.1 += 1;
    }

    let mut groups: Vec<SeasonalGroup> = grouped
        .into_iter()
        .map(|((category, month), (price_sum, count))| SeasonalGroup {
            category: category.to_string(),
            harvest_month: month,
            listing_count: count,
            avg_price: (price_sum / Decimal::from(count)).round_dp(2),
        })
        .collect();

    // BTreeMap iteration already yields (category, month) ascending, which
    // the stable sort preserves for equal counts.
    groups.sort_by(|a, b| b.listing_count.cmp(&a.listing_count));
    groups
}

/// Percentage of a farmer's orders with status DELIVERED; 0 without orders.
pub fn fulfillment_rate(orders: &[Order]) -> f64 {
    if orders.is_empty() {
        return 0.0;
    }
    let delivered =
        orders.iter().filter(|order| order.status == OrderStatus::Delivered).count();
    delivered as f64 * 100.0 / orders.len() as f64
}

/// Mean hours between placement and last update over non-PENDING orders
/// that carry an update timestamp; 0 when none qualify.
pub fn avg_response_hours(orders: &[Order]) -> f64 {
    let elapsed: Vec<f64> = orders
        .iter()
        .filter(|order| order.status != OrderStatus::Pending)
        .filter_map(|order| {
            order
                .updated_at
                .map(|updated| (updated - order.order_date).num_seconds() as f64 / 3600.0)
        })
        .collect();
    if elapsed.is_empty() {
        return 0.0;
    }
    elapsed.iter().sum::<f64>() / elapsed.len() as f64
}

/// Weekly sales buckets (Monday-start weeks) over the trailing window,
/// most recent bucket first. Weeks without orders produce no bucket.
pub fn weekly_sales(orders: &[Order], now: DateTime<Utc>, weeks: i64) -> Vec<WeeklySales> {
    let cutoff = now - Duration::weeks(weeks);
    let mut grouped: BTreeMap<NaiveDate, (Decimal, u64)> = BTreeMap::new();
    for order in orders.iter().filter(|order| order.order_date >= cutoff) {
        let week_start = order.order_date.date_naive().week(Weekday::Mon).first_day();
        let entry = grouped.entry(week_start).or_default();
        entry.0 += order.total_amount;
        entry.1 += 1;
    }

    grouped
        .into_iter()
        .rev()
        .map(|(week_start, (total_sales, order_count))| WeeklySales {
            week_start,
            total_sales,
            order_count,
        })
        .collect()
}

/// Percent change between the two most recent weekly buckets. 0 with fewer
/// than two buckets or a zero prior bucket; never a division by zero.
pub fn sales_growth_pct(buckets: &[WeeklySales]) -> f64 {
    if buckets.len() < 2 {
        return 0.0;
    }
    let recent = buckets[0].total_sales.to_f64().unwrap_or(0.0);
    let previous = buckets[1].total_sales.to_f64().unwrap_or(0.0);
    if previous == 0.0 {
        return 0.0;
    }
    (recent - previous) / previous * 100.0
}

/// Per-day DELIVERED rollups inside the window, most recent day first.
pub fn daily_sales(
    orders: &[Order],
    lines: &[OrderLine],
    since: DateTime<Utc>,
) -> Vec<DailySales> {
    let mut items_per_order: HashMap<&str, u64> = HashMap::new();
    for line in lines {
        *items_per_order.entry(line.item.order_id.0.as_str()).or_default() +=
            u64::from(line.item.quantity);
    }

    let mut grouped: BTreeMap<NaiveDate, (u64, Decimal, u64)> = BTreeMap::new();
    for order in orders
        .iter()
        .filter(|order| order.status == OrderStatus::Delivered && order.order_date >= since)
    {
        let entry = grouped.entry(order.order_date.date_naive()).or_default();
        entry.0 += 1;
        entry.1 += order.total_amount;
        entry.2 += items_per_order.get(order.id.0.as_str()).copied().unwrap_or(0);
    }

    grouped
        .into_iter()
        .rev()
        .map(|(day, (order_count, total_sales, items_sold))| DailySales {
            day,
            order_count,
            total_sales,
            items_sold,
        })
        .collect()
}

/// Per-product DELIVERED rollups inside the window, highest revenue first.
/// Products with no in-window sales are omitted.
pub fn product_sales(
    products: &[Product],
    lines: &[OrderLine],
    feedback: &[Feedback],
    since: DateTime<Utc>,
) -> Vec<ProductSales> {
    let mut rows: Vec<ProductSales> = products
        .iter()
        .filter_map(|product| {
            let sold: Vec<&OrderLine> = lines
                .iter()
                .filter(|line| line.item.product_id == product.id)
                .filter(|line| CountedStatuses::REALIZED_SALES.contains(line.status))
                .filter(|line| line.order_date >= since)
                .collect();
            if sold.is_empty() {
                return None;
            }

            let quantity_sold = sold.iter().map(|line| u64::from(line.item.quantity)).sum();
            let revenue: Decimal = sold
                .iter()
                .map(|line| Decimal::from(line.item.quantity) * line.item.price)
                .sum();

            Some(ProductSales {
                product_id: product.id.clone(),
                name: product.name.clone(),
                category: product.category.clone(),
                quantity_sold,
                revenue,
                avg_rating: avg_rating(feedback, &product.id),
            })
        })
        .collect();

    rows.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.product_id.cmp(&b.product_id)));
    rows
}

/// Rating statistics over a feedback slice. Empty input yields a zeroed
/// summary, not an error.
pub fn review_summary(feedback: &[Feedback]) -> ReviewSummary {
    let mut distribution = [0u64; 5];
    let mut sum = 0u64;
    let mut total = 0u64;
    for entry in feedback {
        if !(1..=5).contains(&entry.rating) {
            continue;
        }
        distribution[usize::from(entry.rating) - 1] += 1;
        sum += u64::from(entry.rating);
        total += 1;
    }

    let average = if total == 0 { 0.0 } else { sum as f64 / total as f64 };
    ReviewSummary { total, average, distribution }
}

/// Deduplicated view and in-window purchase counts per product, for
/// trending. Purchases count order lines placed inside the window.
pub fn trending_counts(
    views: &[ViewEvent],
    lines: &[OrderLine],
    since: DateTime<Utc>,
) -> HashMap<ProductId, (u64, u64)> {
    let mut counts: HashMap<ProductId, (u64, u64)> = HashMap::new();
    for view in latest_views(views) {
        counts.entry(view.product_id).or_default().0 += 1;
    }
    for line in lines.iter().filter(|line| line.order_date >= since) {
        counts.entry(line.item.product_id.clone()).or_default().1 += 1;
    }
    counts
}
