//! Typed repositories over the record store.
//!
//! Each repository owns one logical table: it serializes entities to JSON
//! rows on the way in, deserializes on the way out, and maps failures to
//! `Storage`/`Serialization` errors. Nothing above this layer touches raw
//! rows.

pub mod consent;
pub mod interaction;
pub mod notification;
pub mod preference;
pub mod subscription;
