mod error;
mod traits;

pub use error::{RepositoryError, Result};
pub use traits::{
    CollectionRepository, DatabaseInitializer, MetadataRepository, ProfileRepository, StateStorage,
    TemplateRepository, VacationRepository,
};

/// Durable-store metadata key marking the one-time legacy migration as done.
pub const MIGRATION_FLAG_KEY: &str = "migration_v1_complete";
