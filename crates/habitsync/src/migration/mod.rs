//! One-time migration from the legacy key-value store to the durable store.
//!
//! Earlier app versions kept everything in the device's async key-value
//! storage. [`MigrationRunner`] moves the three user-owned categories -
//! templates, vacation history, profile - into the durable repositories,
//! exactly once per installation. The three categories migrate
//! independently and sequentially: one failing category is logged and
//! zeroed without touching the others, and the sequential order keeps log
//! attribution per category unambiguous.
//!
//! Completion is marked in both stores (`migration_v1_complete = "true"`),
//! but only the legacy flag gates the run. The redundant durable flag is a
//! crash-resilience measure; see `reset` for the only operation that clears
//! them.

mod legacy;

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use habitsync_core::habits::ProfileUpdate;
use habitsync_core::kv::{KeyValueStore, KvError};
use habitsync_core::storage::{
    MetadataRepository, ProfileRepository, RepositoryError, TemplateRepository, VacationRepository,
    MIGRATION_FLAG_KEY,
};

pub use legacy::{
    normalize_template, normalize_vacation_period, LegacyTemplate, LegacyVacationPeriod,
};

/// Legacy store key holding the JSON array of templates.
pub const LEGACY_TEMPLATES_KEY: &str = "user_templates";
/// Legacy store key holding the JSON array of vacation intervals.
pub const LEGACY_VACATIONS_KEY: &str = "vacation_periods";
/// Legacy store key holding the user's name as a plain string.
pub const LEGACY_NAME_KEY: &str = "user_name";
/// Legacy store key holding the user's email as a plain string.
pub const LEGACY_EMAIL_KEY: &str = "user_email";

/// Errors that can occur while migrating a category.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MigrationError {
    #[error("Legacy store error: {0}")]
    Legacy(#[from] KvError),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Corrupt legacy payload: {0}")]
    LegacyPayload(String),
}

/// Outcome of a [`MigrationRunner::run`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationResult {
    /// False only when completion could not be marked; per-category
    /// failures degrade to zero counts instead.
    pub success: bool,
    pub templates_count: usize,
    pub vacation_count: usize,
    pub profile_migrated: bool,
    pub error: Option<String>,
}

impl MigrationResult {
    /// The no-work result returned when the flag shows migration already ran.
    fn already_complete() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }
}

/// Moves legacy key-value data into the durable store, exactly once.
///
/// The completion check consults only the legacy store's flag, mirroring
/// the system this replaces. If the legacy store is wiped externally while
/// durable data survives, a rerun would insert duplicate templates; that
/// gap is documented in DESIGN.md rather than papered over here.
pub struct MigrationRunner {
    legacy: Arc<dyn KeyValueStore>,
    templates: Arc<dyn TemplateRepository>,
    vacations: Arc<dyn VacationRepository>,
    profile: Arc<dyn ProfileRepository>,
    metadata: Arc<dyn MetadataRepository>,
}

impl MigrationRunner {
    /// Creates a runner over individual repository handles.
    pub fn new(
        legacy: Arc<dyn KeyValueStore>,
        templates: Arc<dyn TemplateRepository>,
        vacations: Arc<dyn VacationRepository>,
        profile: Arc<dyn ProfileRepository>,
        metadata: Arc<dyn MetadataRepository>,
    ) -> Self {
        Self {
            legacy,
            templates,
            vacations,
            profile,
            metadata,
        }
    }

    /// Creates a runner over one repository implementing every trait, which
    /// is how the concrete backends are wired in practice.
    pub fn with_repository<R>(legacy: Arc<dyn KeyValueStore>, repository: Arc<R>) -> Self
    where
        R: TemplateRepository
            + VacationRepository
            + ProfileRepository
            + MetadataRepository
            + 'static,
    {
        Self::new(
            legacy,
            repository.clone(),
            repository.clone(),
            repository.clone(),
            repository,
        )
    }

    /// Runs the migration if the legacy completion flag is unset.
    ///
    /// Callers must run this before the storage adapters serve their first
    /// hydration read, so freshly migrated records are visible to it. That
    /// ordering is the application entry point's responsibility.
    pub async fn run(&self) -> MigrationResult {
        match self.legacy.get_item(MIGRATION_FLAG_KEY).await {
            Ok(Some(flag)) if flag == "true" => {
                tracing::debug!("migration already complete, nothing to do");
                return MigrationResult::already_complete();
            }
            Ok(_) => {}
            Err(e) => {
                // An unreadable flag is treated as "pending": re-running is
                // recoverable, silently skipping the migration is not.
                tracing::warn!(error = %e, "could not read migration flag, assuming pending");
            }
        }

        tracing::info!("starting legacy data migration");

        let templates_count = match self.migrate_templates().await {
            Ok(count) => count,
            Err(e) => {
                tracing::error!(error = %e, "template migration failed");
                0
            }
        };
        let vacation_count = match self.migrate_vacation_periods().await {
            Ok(count) => count,
            Err(e) => {
                tracing::error!(error = %e, "vacation history migration failed");
                0
            }
        };
        let profile_migrated = match self.migrate_profile().await {
            Ok(migrated) => migrated,
            Err(e) => {
                tracing::error!(error = %e, "profile migration failed");
                false
            }
        };

        let mut result = MigrationResult {
            success: true,
            templates_count,
            vacation_count,
            profile_migrated,
            error: None,
        };

        if let Err(e) = self.mark_complete().await {
            // Without the marker the migration would repeat on every start,
            // so this is the one failure that escalates.
            tracing::error!(error = %e, "failed to mark migration complete");
            result.success = false;
            result.error = Some(e.to_string());
            return result;
        }

        self.cleanup_legacy().await;

        tracing::info!(
            templates = result.templates_count,
            vacation_periods = result.vacation_count,
            profile = result.profile_migrated,
            "legacy data migration finished"
        );
        result
    }

    /// Clears the completion flag in both stores so migration can run again.
    ///
    /// Test/debug only. Idempotent; missing flags are not an error.
    pub async fn reset(&self) -> Result<(), MigrationError> {
        self.legacy.remove_item(MIGRATION_FLAG_KEY).await?;
        self.metadata.delete_value(MIGRATION_FLAG_KEY).await?;
        Ok(())
    }

    async fn migrate_templates(&self) -> Result<usize, MigrationError> {
        let Some(raw) = self.legacy.get_item(LEGACY_TEMPLATES_KEY).await? else {
            return Ok(0);
        };
        let records: Vec<LegacyTemplate> =
            serde_json::from_str(&raw).map_err(|e| MigrationError::LegacyPayload(e.to_string()))?;

        // Built-in templates ship with every version of the app; only
        // user-authored ones move.
        let user_templates: Vec<LegacyTemplate> =
            records.into_iter().filter(|t| !t.is_default).collect();
        if user_templates.is_empty() {
            return Ok(0);
        }

        let mut migrated = 0;
        for record in user_templates {
            let Some(template) = normalize_template(record) else {
                tracing::warn!("skipping legacy template without id or name");
                continue;
            };
            match self.templates.create_template(&template).await {
                Ok(()) => migrated += 1,
                Err(e) => {
                    tracing::warn!(template_id = %template.id, error = %e, "failed to migrate template");
                }
            }
        }
        Ok(migrated)
    }

    async fn migrate_vacation_periods(&self) -> Result<usize, MigrationError> {
        let Some(raw) = self.legacy.get_item(LEGACY_VACATIONS_KEY).await? else {
            return Ok(0);
        };
        let records: Vec<LegacyVacationPeriod> =
            serde_json::from_str(&raw).map_err(|e| MigrationError::LegacyPayload(e.to_string()))?;
        if records.is_empty() {
            return Ok(0);
        }

        let mut inserted = 0;
        for record in records {
            let Some(period) = normalize_vacation_period(record, Uuid::new_v4().to_string())
            else {
                tracing::warn!("skipping legacy vacation interval without start date");
                continue;
            };
            self.vacations.append_period(&period).await?;
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn migrate_profile(&self) -> Result<bool, MigrationError> {
        let name = self.legacy.get_item(LEGACY_NAME_KEY).await?;
        let email = self.legacy.get_item(LEGACY_EMAIL_KEY).await?;
        if name.is_none() && email.is_none() {
            return Ok(false);
        }

        self.profile
            .update_profile(&ProfileUpdate { name, email })
            .await?;
        Ok(true)
    }

    /// Marks completion redundantly: if either store is later reset, the
    /// surviving flag still blocks duplicate re-migration work.
    async fn mark_complete(&self) -> Result<(), MigrationError> {
        self.legacy.set_item(MIGRATION_FLAG_KEY, "true").await?;
        self.metadata.set_value(MIGRATION_FLAG_KEY, "true").await?;
        Ok(())
    }

    /// Removes the migrated legacy keys. Best effort: stale keys are
    /// harmless once the flag is set.
    async fn cleanup_legacy(&self) {
        let keys = [
            LEGACY_TEMPLATES_KEY,
            LEGACY_VACATIONS_KEY,
            LEGACY_NAME_KEY,
            LEGACY_EMAIL_KEY,
        ];
        if let Err(e) = self.legacy.multi_remove(&keys).await {
            tracing::warn!(error = %e, "failed to remove migrated legacy keys");
        }
    }
}
