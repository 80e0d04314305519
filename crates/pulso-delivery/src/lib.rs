//! Push delivery: permission and subscription lifecycle, per-send
//! preference screening, and retried transport dispatch.
//!
//! [`DeliveryEngine`] owns the send path end to end; it talks to the
//! push transport only through the [`PushGateway`] trait, for which
//! this crate ships a remote function-invoke adapter and a scriptable
//! in-memory implementation. Preference reads and writes go through
//! [`PreferenceService`], which fans out change snapshots on the
//! [`PreferenceBus`].
//!
//! [`PushGateway`]: pulso_core::traits::push::PushGateway

pub mod bus;
pub mod engine;
pub mod gateway;
pub mod preferences;
pub mod retry;

pub use bus::{PreferenceBus, PreferenceSubscription};
pub use engine::{DeliveryEngine, SendDecision, SendReport, evaluate_send, next_allowed_time};
pub use gateway::{InvokeChannel, InvokeGateway, MemoryGateway};
pub use preferences::PreferenceService;
pub use retry::RetryPolicy;
