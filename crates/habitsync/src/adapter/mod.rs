//! Storage adapter bridging a durable-store repository to the persistence
//! middleware.
//!
//! The state container's persistence middleware only understands a
//! three-method string-blob contract ([`StateStorage`]). This module adapts
//! any [`CollectionRepository`] to that contract: reads fetch the whole
//! collection (archived records included) and wrap it in the storage
//! envelope; writes decode the envelope and replace the collection.
//!
//! Failure policy: the middleware calls these methods on every hydration and
//! state change, so nothing here is allowed to propagate an error. Reads
//! degrade to the empty-state envelope; writes and removals are logged and
//! dropped.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::OnceCell;

use habitsync_core::envelope::{decode_envelope, empty_envelope, encode_envelope};
use habitsync_core::storage::{CollectionRepository, DatabaseInitializer, Result, StateStorage};

/// Collection key used when none is configured.
pub const DEFAULT_STATE_NAME: &str = "items";

/// Adapts a [`CollectionRepository`] to the middleware's [`StateStorage`]
/// contract.
///
/// Each adapter instance owns its own initialization guard: the injected
/// initializer runs at most once per instance, on first access, and
/// concurrent callers await the in-flight attempt instead of starting a
/// second one. A failed attempt leaves the guard unset, so the next access
/// retries.
pub struct StorageAdapter<T> {
    repository: Arc<dyn CollectionRepository<T>>,
    initializer: Arc<dyn DatabaseInitializer>,
    state_name: String,
    init: OnceCell<()>,
}

impl<T> StorageAdapter<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Creates an adapter with the default collection key (`"items"`).
    pub fn new(
        repository: Arc<dyn CollectionRepository<T>>,
        initializer: Arc<dyn DatabaseInitializer>,
    ) -> Self {
        Self {
            repository,
            initializer,
            state_name: DEFAULT_STATE_NAME.to_string(),
            init: OnceCell::new(),
        }
    }

    /// Sets the collection key this adapter serves.
    pub fn with_state_name(mut self, state_name: impl Into<String>) -> Self {
        self.state_name = state_name.into();
        self
    }

    /// The collection key this adapter serves.
    pub fn state_name(&self) -> &str {
        &self.state_name
    }

    /// Runs the injected initializer at most once for this instance.
    ///
    /// `OnceCell::get_or_try_init` gives the single-flight behavior the
    /// contract requires: one caller runs the initializer, concurrent
    /// callers wait for it, and an error leaves the cell empty so a later
    /// call can retry.
    async fn ensure_initialized(&self) -> Result<()> {
        self.init
            .get_or_try_init(|| async { self.initializer.initialize().await })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl<T> StateStorage for StorageAdapter<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// The `name` the middleware passes is an opaque persistence key; the
    /// adapter serves its configured collection regardless.
    async fn get_item(&self, _name: &str) -> Option<String> {
        if let Err(e) = self.ensure_initialized().await {
            tracing::warn!(
                state_name = %self.state_name,
                error = %e,
                "storage initialization failed, serving empty state"
            );
            return Some(empty_envelope(&self.state_name));
        }

        let items = match self.repository.get_all(true).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(
                    state_name = %self.state_name,
                    error = %e,
                    "failed to read collection, serving empty state"
                );
                return Some(empty_envelope(&self.state_name));
            }
        };

        match encode_envelope(&self.state_name, &items) {
            Ok(json) => Some(json),
            Err(e) => {
                tracing::warn!(
                    state_name = %self.state_name,
                    error = %e,
                    "failed to encode envelope, serving empty state"
                );
                Some(empty_envelope(&self.state_name))
            }
        }
    }

    async fn set_item(&self, _name: &str, value: &str) {
        if let Err(e) = self.ensure_initialized().await {
            tracing::warn!(
                state_name = %self.state_name,
                error = %e,
                "storage initialization failed, dropping write"
            );
            return;
        }

        let items: Vec<T> = match decode_envelope(&self.state_name, value) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(
                    state_name = %self.state_name,
                    error = %e,
                    "dropping write with unusable envelope"
                );
                return;
            }
        };

        if let Err(e) = self.repository.sync_all(&items).await {
            tracing::warn!(
                state_name = %self.state_name,
                error = %e,
                "failed to persist collection"
            );
        }
    }

    async fn remove_item(&self, _name: &str) {
        if let Err(e) = self.ensure_initialized().await {
            tracing::warn!(
                state_name = %self.state_name,
                error = %e,
                "storage initialization failed, dropping removal"
            );
            return;
        }

        if let Err(e) = self.repository.delete_all().await {
            tracing::warn!(
                state_name = %self.state_name,
                error = %e,
                "failed to clear collection"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use habitsync_core::habits::HabitTemplate;
    use habitsync_core::storage::{CollectionRepository, RepositoryError};

    use crate::storage::InMemoryRepository;

    use super::*;

    /// Initializer double that counts invocations and can fail on demand.
    struct CountingInitializer {
        calls: AtomicUsize,
        failures: AtomicUsize,
    }

    impl CountingInitializer {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                failures: AtomicUsize::new(0),
            }
        }

        fn failing_times(n: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                failures: AtomicUsize::new(n),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DatabaseInitializer for CountingInitializer {
        async fn initialize(&self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            // Yield so concurrent callers pile up on the in-flight attempt.
            tokio::time::sleep(Duration::from_millis(5)).await;
            if self.failures.load(Ordering::SeqCst) > 0 {
                self.failures.fetch_sub(1, Ordering::SeqCst);
                return Err(RepositoryError::ConnectionFailed("setup failed".to_string()));
            }
            Ok(())
        }
    }

    /// Repository double that fails every operation.
    struct FailingRepository;

    #[async_trait]
    impl CollectionRepository<HabitTemplate> for FailingRepository {
        async fn get_all(&self, _include_archived: bool) -> Result<Vec<HabitTemplate>> {
            Err(RepositoryError::QueryFailed("boom".to_string()))
        }

        async fn sync_all(&self, _items: &[HabitTemplate]) -> Result<()> {
            Err(RepositoryError::QueryFailed("boom".to_string()))
        }

        async fn delete_all(&self) -> Result<()> {
            Err(RepositoryError::QueryFailed("boom".to_string()))
        }
    }

    /// Repository double that records how often sync_all was called.
    #[derive(Default)]
    struct RecordingRepository {
        sync_calls: AtomicUsize,
    }

    #[async_trait]
    impl CollectionRepository<HabitTemplate> for RecordingRepository {
        async fn get_all(&self, _include_archived: bool) -> Result<Vec<HabitTemplate>> {
            Ok(Vec::new())
        }

        async fn sync_all(&self, _items: &[HabitTemplate]) -> Result<()> {
            self.sync_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn delete_all(&self) -> Result<()> {
            Ok(())
        }
    }

    fn adapter_with(
        repository: Arc<dyn CollectionRepository<HabitTemplate>>,
        initializer: Arc<dyn DatabaseInitializer>,
    ) -> StorageAdapter<HabitTemplate> {
        StorageAdapter::new(repository, initializer)
    }

    #[tokio::test]
    async fn test_get_item_on_empty_store_is_exact_empty_envelope() {
        let repo = Arc::new(InMemoryRepository::new());
        let adapter = StorageAdapter::<HabitTemplate>::new(repo.clone(), repo)
            .with_state_name("habits");

        let value = adapter.get_item("anything").await;

        assert_eq!(
            value.as_deref(),
            Some(r#"{"state":{"habits":[],"isHydrated":false},"version":1}"#)
        );
    }

    #[tokio::test]
    async fn test_get_item_never_fails_on_broken_repository() {
        let initializer = Arc::new(CountingInitializer::new());
        let adapter = adapter_with(Arc::new(FailingRepository), initializer)
            .with_state_name("habits");

        let value = adapter.get_item("habits-storage").await;

        assert_eq!(
            value.as_deref(),
            Some(r#"{"state":{"habits":[],"isHydrated":false},"version":1}"#)
        );
    }

    #[tokio::test]
    async fn test_concurrent_access_initializes_once() {
        let initializer = Arc::new(CountingInitializer::new());
        let repo = Arc::new(InMemoryRepository::new());
        let adapter = Arc::new(adapter_with(repo, initializer.clone()));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let adapter = adapter.clone();
            handles.push(tokio::spawn(async move {
                adapter.get_item("items").await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(initializer.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_initialization_retries_on_next_access() {
        let initializer = Arc::new(CountingInitializer::failing_times(1));
        let repo = Arc::new(InMemoryRepository::new());
        let adapter = adapter_with(repo.clone(), initializer.clone());

        // First access fails initialization and degrades to empty state.
        let first = adapter.get_item("items").await;
        assert_eq!(first.as_deref(), Some(empty_envelope("items").as_str()));
        assert_eq!(initializer.calls(), 1);

        // Second access retries and succeeds.
        adapter
            .set_item(
                "items",
                r#"{"state":{"items":[]},"version":1}"#,
            )
            .await;
        assert_eq!(initializer.calls(), 2);

        // Initialized for good now; no further attempts.
        adapter.get_item("items").await;
        assert_eq!(initializer.calls(), 2);
    }

    #[tokio::test]
    async fn test_set_item_ignores_missing_collection() {
        let repo = Arc::new(RecordingRepository::default());
        let initializer = Arc::new(CountingInitializer::new());
        let adapter = adapter_with(repo.clone(), initializer);

        adapter
            .set_item("items", r#"{"state":{"other":[]},"version":1}"#)
            .await;

        assert_eq!(repo.sync_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_set_item_ignores_non_array_collection() {
        let repo = Arc::new(RecordingRepository::default());
        let initializer = Arc::new(CountingInitializer::new());
        let adapter = adapter_with(repo.clone(), initializer);

        adapter
            .set_item("items", r#"{"state":{"items":"nope"},"version":1}"#)
            .await;
        adapter.set_item("items", "not json at all").await;

        assert_eq!(repo.sync_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_set_item_round_trips_through_repository() {
        let repo = Arc::new(InMemoryRepository::new());
        let adapter = StorageAdapter::<HabitTemplate>::new(repo.clone(), repo.clone())
            .with_state_name("templates");

        let template = HabitTemplate::new("tpl-1", "Morning run");
        let envelope = encode_envelope("templates", std::slice::from_ref(&template)).unwrap();
        adapter.set_item("templates-storage", &envelope).await;

        let value = adapter.get_item("templates-storage").await.unwrap();
        let decoded: Vec<HabitTemplate> = decode_envelope("templates", &value).unwrap();
        assert_eq!(decoded, vec![template]);
    }

    #[tokio::test]
    async fn test_remove_item_clears_collection() {
        let repo = Arc::new(InMemoryRepository::new());
        let adapter = StorageAdapter::<HabitTemplate>::new(repo.clone(), repo.clone());

        repo.sync_all(&[HabitTemplate::new("tpl-1", "A")])
            .await
            .unwrap();
        adapter.remove_item("items").await;

        let left: Vec<HabitTemplate> = repo.get_all(true).await.unwrap();
        assert!(left.is_empty());
    }

    #[tokio::test]
    async fn test_get_item_includes_archived_records() {
        let repo = Arc::new(InMemoryRepository::new());
        let adapter = StorageAdapter::<HabitTemplate>::new(repo.clone(), repo.clone());

        let mut archived = HabitTemplate::new("tpl-1", "Old");
        archived.archived = true;
        repo.sync_all(std::slice::from_ref(&archived)).await.unwrap();

        let value = adapter.get_item("items").await.unwrap();
        let decoded: Vec<HabitTemplate> = decode_envelope("items", &value).unwrap();
        assert_eq!(decoded, vec![archived]);
    }
}
