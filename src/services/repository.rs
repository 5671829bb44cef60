use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Grant, Match, Profile};

/// Errors raised by storage backends
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("SQLx error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Storage abstraction for profiles, the grant catalog and match records
///
/// Constructed once at startup and shared by the matching service and the
/// packet generator. Implementations own identity and timestamp assignment.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn create_profile(&self, profile: Profile) -> Result<Profile, RepositoryError>;

    async fn get_profile(&self, id: &str) -> Result<Option<Profile>, RepositoryError>;

    /// Up to `limit` profiles, oldest first
    async fn list_profiles(&self, limit: usize) -> Result<Vec<Profile>, RepositoryError>;

    /// Full-record replacement; fails with `NotFound` when absent
    async fn update_profile(&self, id: &str, profile: Profile) -> Result<Profile, RepositoryError>;

    /// Stored matches for the profile are left in place
    async fn delete_profile(&self, id: &str) -> Result<bool, RepositoryError>;

    async fn create_grant(&self, grant: Grant) -> Result<Grant, RepositoryError>;

    async fn get_grant(&self, id: &str) -> Result<Option<Grant>, RepositoryError>;

    /// Up to `limit` grants in catalog (insertion) order
    async fn list_grants(&self, limit: usize) -> Result<Vec<Grant>, RepositoryError>;

    /// Full-record replacement that keeps the grant's catalog position
    async fn update_grant(&self, id: &str, grant: Grant) -> Result<Grant, RepositoryError>;

    async fn delete_grant(&self, id: &str) -> Result<bool, RepositoryError>;

    /// Persist a match, assigning its identity and creation timestamp
    async fn create_match(&self, m: Match) -> Result<Match, RepositoryError>;

    async fn get_match(&self, id: &str) -> Result<Option<Match>, RepositoryError>;

    async fn list_matches_by_profile(
        &self,
        profile_id: &str,
        limit: usize,
    ) -> Result<Vec<Match>, RepositoryError>;

    /// Returns whether a record was removed
    async fn delete_match(&self, id: &str) -> Result<bool, RepositoryError>;

    /// Returns the number of records removed
    async fn delete_matches_by_profile(&self, profile_id: &str) -> Result<u64, RepositoryError>;

    async fn health_check(&self) -> Result<bool, RepositoryError>;
}

/// Generate a new record identity
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
