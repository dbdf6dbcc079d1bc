//! In-memory repository implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use habitsync_core::habits::{HabitTemplate, ProfileUpdate, UserProfile, VacationPeriod};
use habitsync_core::storage::{
    CollectionRepository, DatabaseInitializer, MetadataRepository, ProfileRepository,
    RepositoryError, Result, TemplateRepository, VacationRepository,
};

/// In-memory storage backend for testing.
///
/// Uses Vecs and HashMaps wrapped in `Arc<RwLock<_>>` for thread-safe access.
/// Data is not persisted and will be lost when the repository is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    templates: Arc<RwLock<Vec<HabitTemplate>>>,
    vacation_periods: Arc<RwLock<Vec<VacationPeriod>>>,
    profile: Arc<RwLock<UserProfile>>,
    metadata: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DatabaseInitializer for InMemoryRepository {
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl CollectionRepository<HabitTemplate> for InMemoryRepository {
    async fn get_all(&self, include_archived: bool) -> Result<Vec<HabitTemplate>> {
        let templates = self.templates.read().await;
        Ok(templates
            .iter()
            .filter(|t| include_archived || !t.archived)
            .cloned()
            .collect())
    }

    async fn sync_all(&self, items: &[HabitTemplate]) -> Result<()> {
        let mut templates = self.templates.write().await;
        *templates = items.to_vec();
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        let mut templates = self.templates.write().await;
        templates.clear();
        Ok(())
    }
}

#[async_trait]
impl TemplateRepository for InMemoryRepository {
    async fn create_template(&self, template: &HabitTemplate) -> Result<()> {
        let mut templates = self.templates.write().await;
        if templates.iter().any(|t| t.id == template.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "HabitTemplate",
                id: template.id.clone(),
            });
        }
        templates.push(template.clone());
        Ok(())
    }
}

#[async_trait]
impl CollectionRepository<VacationPeriod> for InMemoryRepository {
    async fn get_all(&self, _include_archived: bool) -> Result<Vec<VacationPeriod>> {
        let periods = self.vacation_periods.read().await;
        Ok(periods.clone())
    }

    async fn sync_all(&self, items: &[VacationPeriod]) -> Result<()> {
        let mut periods = self.vacation_periods.write().await;
        *periods = items.to_vec();
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        let mut periods = self.vacation_periods.write().await;
        periods.clear();
        Ok(())
    }
}

#[async_trait]
impl VacationRepository for InMemoryRepository {
    async fn append_period(&self, period: &VacationPeriod) -> Result<()> {
        let mut periods = self.vacation_periods.write().await;
        periods.push(period.clone());
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn get_profile(&self) -> Result<UserProfile> {
        let profile = self.profile.read().await;
        Ok(profile.clone())
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<()> {
        let mut profile = self.profile.write().await;
        if let Some(name) = &update.name {
            profile.name = Some(name.clone());
        }
        if let Some(email) = &update.email {
            profile.email = Some(email.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl MetadataRepository for InMemoryRepository {
    async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let metadata = self.metadata.read().await;
        Ok(metadata.get(key).cloned())
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<()> {
        let mut metadata = self.metadata.write().await;
        metadata.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete_value(&self, key: &str) -> Result<()> {
        let mut metadata = self.metadata.write().await;
        metadata.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_update_profile_leaves_missing_fields_untouched() {
        let repo = InMemoryRepository::new();
        repo.update_profile(&ProfileUpdate {
            name: Some("Ada".to_string()),
            email: None,
        })
        .await
        .unwrap();
        repo.update_profile(&ProfileUpdate {
            name: None,
            email: Some("ada@example.com".to_string()),
        })
        .await
        .unwrap();

        let profile = repo.get_profile().await.unwrap();
        assert_eq!(profile.name.as_deref(), Some("Ada"));
        assert_eq!(profile.email.as_deref(), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn test_create_template_rejects_duplicate_id() {
        let repo = InMemoryRepository::new();
        repo.create_template(&HabitTemplate::new("tpl-1", "A"))
            .await
            .unwrap();

        let err = repo
            .create_template(&HabitTemplate::new("tpl-1", "B"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyExists { .. }));
    }
}
