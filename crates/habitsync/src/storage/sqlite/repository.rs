//! SQLite repository implementation.
//!
//! Implements the repository traits from `habitsync_core::storage` using
//! SQLite via `tokio-rusqlite`.

use async_trait::async_trait;
use tokio_rusqlite::Connection;

use habitsync_core::habits::{HabitTemplate, ProfileUpdate, UserProfile, VacationPeriod};
use habitsync_core::storage::{
    CollectionRepository, DatabaseInitializer, MetadataRepository, ProfileRepository,
    RepositoryError, Result, TemplateRepository, VacationRepository,
};

use super::conversions::{
    format_datetime, list_to_json, row_to_profile, row_to_template, row_to_vacation_period,
};
use super::error::{map_tokio_rusqlite_error, map_tokio_rusqlite_error_with_id};
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// Helper to wrap non-SQLite errors (JSON column encoding) for closures.
fn other_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Other(Box::new(e))
}

fn insert_template_tx(conn: &rusqlite::Connection, template: &HabitTemplate) -> tokio_rusqlite::Result<()> {
    conn.execute(
        schema::INSERT_TEMPLATE,
        rusqlite::params![
            template.id,
            template.name,
            template.version,
            template.description,
            list_to_json(&template.tags).map_err(other_err)?,
            template.kind,
            template.difficulty,
            template.duration,
            list_to_json(&template.benefits).map_err(other_err)?,
            list_to_json(&template.outcomes).map_err(other_err)?,
            list_to_json(&template.timeline).map_err(other_err)?,
            template.emoji,
            template.color,
            list_to_json(&template.habits).map_err(other_err)?,
            template.is_default,
            template.archived,
            format_datetime(&template.created_at),
        ],
    )
    .map_err(wrap_err)?;
    Ok(())
}

fn insert_vacation_period_tx(
    conn: &rusqlite::Connection,
    period: &VacationPeriod,
) -> tokio_rusqlite::Result<()> {
    conn.execute(
        schema::INSERT_VACATION_PERIOD,
        rusqlite::params![
            period.id,
            format_datetime(&period.start_date),
            period.end_date.as_ref().map(format_datetime),
        ],
    )
    .map_err(wrap_err)?;
    Ok(())
}

/// SQLite-based repository implementation.
///
/// Provides async access to SQLite storage for every entity the persistence
/// layer owns. The connection is opened eagerly but the schema is not: call
/// [`DatabaseInitializer::initialize`] (or go through the storage adapter,
/// which does it lazily) before the first query.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Opens a file-based database, creating the file if needed.
    pub async fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Ok(Self { conn })
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing - data is lost when the connection is dropped.
    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Ok(Self { conn })
    }
}

#[async_trait]
impl DatabaseInitializer for SqliteRepository {
    async fn initialize(&self) -> Result<()> {
        self.conn
            .call(|conn| {
                conn.execute_batch(schema::CREATE_TABLES).map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }
}

// ============================================================================
// Template repository
// ============================================================================

#[async_trait]
impl CollectionRepository<HabitTemplate> for SqliteRepository {
    async fn get_all(&self, include_archived: bool) -> Result<Vec<HabitTemplate>> {
        let query = if include_archived {
            schema::SELECT_TEMPLATES
        } else {
            schema::SELECT_ACTIVE_TEMPLATES
        };

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(query).map_err(wrap_err)?;
                let rows = stmt.query_map([], row_to_template).map_err(wrap_err)?;

                let mut templates = Vec::new();
                for row_result in rows {
                    templates.push(row_result.map_err(wrap_err)?);
                }
                Ok(templates)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "HabitTemplate"))
    }

    async fn sync_all(&self, items: &[HabitTemplate]) -> Result<()> {
        let items = items.to_vec();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                tx.execute(schema::DELETE_TEMPLATES, []).map_err(wrap_err)?;
                for template in &items {
                    insert_template_tx(&tx, template)?;
                }
                tx.commit().map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "HabitTemplate"))
    }

    async fn delete_all(&self) -> Result<()> {
        self.conn
            .call(|conn| {
                conn.execute(schema::DELETE_TEMPLATES, []).map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "HabitTemplate"))
    }
}

#[async_trait]
impl TemplateRepository for SqliteRepository {
    async fn create_template(&self, template: &HabitTemplate) -> Result<()> {
        let template = template.clone();
        let template_id = template.id.clone();

        self.conn
            .call(move |conn| insert_template_tx(conn, &template))
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "HabitTemplate", template_id))
    }
}

// ============================================================================
// Vacation repository
// ============================================================================

#[async_trait]
impl CollectionRepository<VacationPeriod> for SqliteRepository {
    /// Vacation periods have no soft-delete flag; `include_archived` is
    /// accepted for interface uniformity and ignored.
    async fn get_all(&self, _include_archived: bool) -> Result<Vec<VacationPeriod>> {
        self.conn
            .call(|conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_VACATION_PERIODS)
                    .map_err(wrap_err)?;
                let rows = stmt
                    .query_map([], row_to_vacation_period)
                    .map_err(wrap_err)?;

                let mut periods = Vec::new();
                for row_result in rows {
                    periods.push(row_result.map_err(wrap_err)?);
                }
                Ok(periods)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "VacationPeriod"))
    }

    async fn sync_all(&self, items: &[VacationPeriod]) -> Result<()> {
        let items = items.to_vec();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                tx.execute(schema::DELETE_VACATION_PERIODS, [])
                    .map_err(wrap_err)?;
                for period in &items {
                    insert_vacation_period_tx(&tx, period)?;
                }
                tx.commit().map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "VacationPeriod"))
    }

    async fn delete_all(&self) -> Result<()> {
        self.conn
            .call(|conn| {
                conn.execute(schema::DELETE_VACATION_PERIODS, [])
                    .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "VacationPeriod"))
    }
}

#[async_trait]
impl VacationRepository for SqliteRepository {
    async fn append_period(&self, period: &VacationPeriod) -> Result<()> {
        let period = period.clone();
        let period_id = period.id.clone();

        self.conn
            .call(move |conn| insert_vacation_period_tx(conn, &period))
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "VacationPeriod", period_id))
    }
}

// ============================================================================
// Profile repository
// ============================================================================

#[async_trait]
impl ProfileRepository for SqliteRepository {
    async fn get_profile(&self) -> Result<UserProfile> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(schema::SELECT_PROFILE).map_err(wrap_err)?;
                match stmt.query_row([], row_to_profile) {
                    Ok(profile) => Ok(profile),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(UserProfile::default()),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "UserProfile"))
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<()> {
        let name = update.name.clone();
        let email = update.email.clone();

        self.conn
            .call(move |conn| {
                conn.execute(schema::UPSERT_PROFILE, rusqlite::params![name, email])
                    .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "UserProfile"))
    }
}

// ============================================================================
// Metadata repository
// ============================================================================

#[async_trait]
impl MetadataRepository for SqliteRepository {
    async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_METADATA).map_err(wrap_err)?;
                match stmt.query_row([&key], |row| row.get::<_, String>(0)) {
                    Ok(value) => Ok(Some(value)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Metadata"))
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<()> {
        let key = key.to_string();
        let value = value.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(schema::UPSERT_METADATA, rusqlite::params![key, value])
                    .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Metadata"))
    }

    async fn delete_value(&self, key: &str) -> Result<()> {
        let key = key.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(schema::DELETE_METADATA, [&key])
                    .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Metadata"))
    }
}
