use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identity::CustomerId;
use super::product::ProductId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedbackId(pub String);

/// Customer rating for a product, 1 to 5 stars.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: FeedbackId,
    pub product_id: ProductId,
    pub customer_id: CustomerId,
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}
