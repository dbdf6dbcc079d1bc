use async_trait::async_trait;

use crate::habits::{HabitTemplate, ProfileUpdate, UserProfile, VacationPeriod};

use super::Result;

/// Generic collection access shared by every entity repository.
///
/// The persistence middleware treats each entity collection as a single
/// replaceable blob, so the operations here are whole-collection operations.
#[async_trait]
pub trait CollectionRepository<T>: Send + Sync {
    /// Gets every record in the collection.
    ///
    /// With `include_archived` set, soft-deleted records are returned too.
    /// The state container needs them: archived records may still be
    /// referenced by habits on screen.
    async fn get_all(&self, include_archived: bool) -> Result<Vec<T>>;

    /// Replaces the entire collection with `items`.
    async fn sync_all(&self, items: &[T]) -> Result<()>;

    /// Deletes every record in the collection.
    async fn delete_all(&self) -> Result<()>;
}

/// Repository for habit template operations.
#[async_trait]
pub trait TemplateRepository: CollectionRepository<HabitTemplate> {
    /// Creates a single template.
    async fn create_template(&self, template: &HabitTemplate) -> Result<()>;
}

/// Repository for vacation-mode interval history.
#[async_trait]
pub trait VacationRepository: CollectionRepository<VacationPeriod> {
    /// Appends one interval to the history.
    async fn append_period(&self, period: &VacationPeriod) -> Result<()>;
}

/// Repository for the single user profile row.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Gets the stored profile. Returns an empty profile if none was saved.
    async fn get_profile(&self) -> Result<UserProfile>;

    /// Applies a partial update. Fields that are `None` in the update are
    /// left untouched, never overwritten with an empty value.
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<()>;
}

/// Repository for string key/value metadata rows (flags, markers).
#[async_trait]
pub trait MetadataRepository: Send + Sync {
    /// Gets a metadata value by key.
    async fn get_value(&self, key: &str) -> Result<Option<String>>;

    /// Sets a metadata value, replacing any existing one.
    async fn set_value(&self, key: &str, value: &str) -> Result<()>;

    /// Deletes a metadata value. Deleting a missing key is not an error.
    async fn delete_value(&self, key: &str) -> Result<()>;
}

/// One-time setup of the durable store's schema.
///
/// Implementations must be idempotent: callers layer their own guards on top,
/// but a second `initialize` call must also be safe on its own.
#[async_trait]
pub trait DatabaseInitializer: Send + Sync {
    async fn initialize(&self) -> Result<()>;
}

/// The string-blob storage contract the persistence middleware consumes.
///
/// These methods are deliberately infallible: the middleware calls them on
/// every hydration and state change, and a storage failure must degrade to
/// "no persisted data" instead of surfacing on the hot path. Implementations
/// absorb and log their own errors.
#[async_trait]
pub trait StateStorage: Send + Sync {
    /// Returns the JSON-serialized storage envelope for `name`, or `None` if
    /// the implementation has nothing to serve under that name.
    async fn get_item(&self, name: &str) -> Option<String>;

    /// Persists the JSON-serialized storage envelope in `value`.
    async fn set_item(&self, name: &str, value: &str);

    /// Removes everything persisted under `name`.
    async fn remove_item(&self, name: &str);
}
