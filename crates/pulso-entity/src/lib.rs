//! # pulso-entity
//!
//! Domain entities for the Pulso notification engine. Every entity is a
//! plain serde struct persisted as a JSON row through the record-store
//! boundary; behavior beyond field access (state transitions, preference
//! merging, quiet-window math) lives next to the data it governs.

pub mod batch;
pub mod consent;
pub mod interaction;
pub mod notification;
pub mod preference;
pub mod subscription;

pub use batch::{Batch, BatchId, BatchItem, BatchPriority};
pub use consent::{ConsentInput, ConsentRecord};
pub use interaction::{InteractionEvent, InteractionKind};
pub use notification::{Notification, NotificationDraft, NotificationStatus, NotificationType};
pub use preference::{Preferences, PreferencesPatch, QuietHours};
pub use subscription::PushSubscription;
