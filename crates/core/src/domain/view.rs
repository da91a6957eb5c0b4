use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identity::CustomerId;
use super::product::ProductId;

/// Latest view of a product by a customer. At most one logical row exists
/// per (customer, product) pair; repeated views refresh `viewed_at`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewEvent {
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub viewed_at: DateTime<Utc>,
}
