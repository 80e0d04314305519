//! Push gateway implementations.

pub mod invoke;
pub mod memory;

pub use invoke::{InvokeChannel, InvokeGateway};
pub use memory::MemoryGateway;
