//! Shared value types used across the Pulso crates.

pub mod id;
pub mod pagination;
pub mod time;

pub use id::{ConsentId, InteractionId, ListenerId, NotificationId, SubscriptionId, UserId};
pub use pagination::{PageRequest, PageResponse};
pub use time::TimeOfDay;
