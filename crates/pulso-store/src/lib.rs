//! In-memory record store and the typed repositories built on top of it.
//!
//! The [`RecordStore`](pulso_core::traits::store::RecordStore) trait is the
//! persistence boundary; [`MemoryRecordStore`] is the single-node
//! implementation used in production deployments without an external
//! document store and in every test. The repositories translate JSON rows
//! into entities and own the table names.

pub mod memory;
pub mod repositories;
pub mod tables;

pub use memory::MemoryRecordStore;
pub use repositories::consent::ConsentRepository;
pub use repositories::interaction::InteractionRepository;
pub use repositories::notification::NotificationRepository;
pub use repositories::preference::PreferenceRepository;
pub use repositories::subscription::SubscriptionRepository;
