use chrono::Utc;
use std::sync::Arc;

use super::repository::Repository;
use crate::core::Matcher;
use crate::error::ServiceError;
use crate::models::MatchResult;

/// Grants beyond this many are never considered for matching
pub const DEFAULT_CATALOG_LIMIT: usize = 1000;

/// Default number of matches returned per request
pub const DEFAULT_MATCH_LIMIT: usize = 5;

/// Orchestrates scoring across the catalog and persists the results
///
/// Each call reads a fresh snapshot from the repository. The read, score and
/// write steps are not atomic; concurrent calls for one profile may interleave.
#[derive(Clone)]
pub struct MatchingService {
    repository: Arc<dyn Repository>,
    matcher: Matcher,
    catalog_limit: usize,
}

impl MatchingService {
    pub fn new(repository: Arc<dyn Repository>, matcher: Matcher) -> Self {
        Self {
            repository,
            matcher,
            catalog_limit: DEFAULT_CATALOG_LIMIT,
        }
    }

    pub fn with_catalog_limit(mut self, catalog_limit: usize) -> Self {
        self.catalog_limit = catalog_limit;
        self
    }

    /// Score the catalog for a profile, persist the top `limit` matches and
    /// return them paired with their grants
    ///
    /// Writes new match records on every call.
    pub async fn find_matches(
        &self,
        profile_id: &str,
        limit: usize,
    ) -> Result<Vec<MatchResult>, ServiceError> {
        let profile = self
            .repository
            .get_profile(profile_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Profile {} not found", profile_id)))?;

        let grants = self.repository.list_grants(self.catalog_limit).await?;
        let total_grants = grants.len();

        let ranked = self.matcher.rank(&profile, grants, limit, Utc::now());

        tracing::debug!(
            "Profile {} is eligible for {} of {} grants (limit {})",
            profile_id,
            ranked.len(),
            total_grants,
            limit
        );

        let mut results = Vec::with_capacity(ranked.len());
        for ranked_grant in ranked {
            let saved = self.repository.create_match(ranked_grant.candidate).await?;
            results.push(MatchResult {
                match_: saved,
                grant: ranked_grant.grant,
            });
        }

        tracing::info!(
            "Returning {} matches for profile {} (from {} grants)",
            results.len(),
            profile_id,
            total_grants
        );

        Ok(results)
    }

    /// Delete every stored match for the profile, then run [`find_matches`]
    ///
    /// A failure after the delete leaves the profile with no matches until
    /// the next successful refresh.
    ///
    /// [`find_matches`]: MatchingService::find_matches
    pub async fn refresh_matches(
        &self,
        profile_id: &str,
        limit: usize,
    ) -> Result<Vec<MatchResult>, ServiceError> {
        if self.repository.get_profile(profile_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!(
                "Profile {} not found",
                profile_id
            )));
        }

        let removed = self.repository.delete_matches_by_profile(profile_id).await?;
        tracing::info!("Removed {} stale matches for profile {}", removed, profile_id);

        self.find_matches(profile_id, limit).await
    }
}
