use async_trait::async_trait;

use super::Result;

/// The legacy async key-value store contract.
///
/// This is the persistence substrate the app used before the durable store
/// was introduced: opaque string values under string keys. The migration
/// runner reads from it and, once finished, removes the migrated keys.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Gets a value by key, or `None` if the key was never set.
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Sets a value, replacing any existing one.
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Removes a value. Removing a missing key is not an error.
    async fn remove_item(&self, key: &str) -> Result<()>;

    /// Removes several keys in one batch. Missing keys are skipped.
    async fn multi_remove(&self, keys: &[&str]) -> Result<()>;
}
