//! Record store trait for the external persistence boundary.

use async_trait::async_trait;
use serde_json::Value;

use crate::result::AppResult;

/// Key/record store boundary.
///
/// The engine persists every entity as a JSON row in a named logical table
/// and never assumes anything about the backing engine beyond these
/// primitives. The in-memory implementation in `pulso-store` backs
/// single-node deployments and tests; a document-store adapter satisfies
/// the same contract in production.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// Fetch a single row by table and key.
    async fn get(&self, table: &str, key: &str) -> AppResult<Option<Value>>;

    /// Insert or replace a row.
    async fn put(&self, table: &str, key: &str, record: Value) -> AppResult<()>;

    /// Delete a row by key. Returns `true` if a row was removed.
    async fn delete(&self, table: &str, key: &str) -> AppResult<bool>;

    /// Fetch every row in a table.
    async fn list(&self, table: &str) -> AppResult<Vec<Value>>;

    /// Fetch rows whose top-level `field` equals `value`.
    async fn find_by(&self, table: &str, field: &str, value: &Value) -> AppResult<Vec<Value>>;

    /// Delete rows whose top-level `field` equals `value`. Returns the
    /// number of rows removed.
    async fn delete_by(&self, table: &str, field: &str, value: &Value) -> AppResult<u64>;

    /// Count rows in a table.
    async fn count(&self, table: &str) -> AppResult<u64>;
}
