pub mod config;
pub mod domain;
pub mod errors;
pub mod insights;
pub mod store;

pub use domain::farmer::{Farmer, FarmerId};
pub use domain::feedback::{Feedback, FeedbackId};
pub use domain::identity::{Caller, CustomerId, Role, UserId};
pub use domain::order::{
    CountedStatuses, Order, OrderId, OrderItem, OrderItemId, OrderLine, OrderStatus,
};
pub use domain::product::{Product, ProductId, ProductStatus};
pub use domain::view::ViewEvent;
pub use errors::EngineError;
pub use insights::{EngineResult, RecommendationEngine};
pub use store::{InMemorySignalStore, SignalStore, StoreError};
