//! Collaborator traits defined in `pulso-core` and implemented by other crates.

pub mod push;
pub mod store;

pub use push::{
    PermissionState, PushGateway, PushMessage, SubscriptionHandle, SubscriptionKeys,
    TransportError,
};
pub use store::RecordStore;
