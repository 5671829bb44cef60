use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;

use super::repository::{new_id, Repository, RepositoryError};
use crate::models::{Grant, Match, Profile};

#[derive(Default)]
struct Store {
    profiles: HashMap<String, Profile>,
    /// Insertion order doubles as catalog order
    grants: Vec<Grant>,
    matches: Vec<Match>,
}

/// Process-local repository backed by in-memory collections
///
/// Used by tests and by `database.backend = "memory"` for local runs.
/// Data does not survive a restart.
#[derive(Default)]
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Store>, RepositoryError> {
        self.store
            .read()
            .map_err(|_| RepositoryError::Corrupt("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Store>, RepositoryError> {
        self.store
            .write()
            .map_err(|_| RepositoryError::Corrupt("store lock poisoned".to_string()))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn create_profile(&self, mut profile: Profile) -> Result<Profile, RepositoryError> {
        let now = Utc::now();
        let id = new_id();
        profile.id = Some(id.clone());
        profile.created_at = Some(now);
        profile.updated_at = Some(now);

        self.write()?.profiles.insert(id, profile.clone());
        Ok(profile)
    }

    async fn get_profile(&self, id: &str) -> Result<Option<Profile>, RepositoryError> {
        Ok(self.read()?.profiles.get(id).cloned())
    }

    async fn list_profiles(&self, limit: usize) -> Result<Vec<Profile>, RepositoryError> {
        let mut profiles: Vec<Profile> = self.read()?.profiles.values().cloned().collect();
        profiles.sort_by_key(|p| p.created_at);
        profiles.truncate(limit);
        Ok(profiles)
    }

    async fn update_profile(
        &self,
        id: &str,
        mut profile: Profile,
    ) -> Result<Profile, RepositoryError> {
        let mut store = self.write()?;
        let existing = store
            .profiles
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(format!("profile {}", id)))?;

        profile.id = Some(id.to_string());
        profile.created_at = existing.created_at;
        profile.updated_at = Some(Utc::now());
        *existing = profile.clone();

        Ok(profile)
    }

    async fn delete_profile(&self, id: &str) -> Result<bool, RepositoryError> {
        Ok(self.write()?.profiles.remove(id).is_some())
    }

    async fn create_grant(&self, mut grant: Grant) -> Result<Grant, RepositoryError> {
        let now = Utc::now();
        grant.id = Some(new_id());
        grant.created_at = Some(now);
        grant.updated_at = Some(now);

        self.write()?.grants.push(grant.clone());
        Ok(grant)
    }

    async fn get_grant(&self, id: &str) -> Result<Option<Grant>, RepositoryError> {
        Ok(self
            .read()?
            .grants
            .iter()
            .find(|g| g.id.as_deref() == Some(id))
            .cloned())
    }

    async fn list_grants(&self, limit: usize) -> Result<Vec<Grant>, RepositoryError> {
        Ok(self.read()?.grants.iter().take(limit).cloned().collect())
    }

    async fn update_grant(&self, id: &str, mut grant: Grant) -> Result<Grant, RepositoryError> {
        let mut store = self.write()?;
        let existing = store
            .grants
            .iter_mut()
            .find(|g| g.id.as_deref() == Some(id))
            .ok_or_else(|| RepositoryError::NotFound(format!("grant {}", id)))?;

        grant.id = Some(id.to_string());
        grant.created_at = existing.created_at;
        grant.updated_at = Some(Utc::now());
        *existing = grant.clone();

        Ok(grant)
    }

    async fn delete_grant(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut store = self.write()?;
        let before = store.grants.len();
        store.grants.retain(|g| g.id.as_deref() != Some(id));
        Ok(store.grants.len() < before)
    }

    async fn create_match(&self, mut m: Match) -> Result<Match, RepositoryError> {
        m.id = Some(new_id());
        m.created_at = Some(Utc::now());

        self.write()?.matches.push(m.clone());
        Ok(m)
    }

    async fn get_match(&self, id: &str) -> Result<Option<Match>, RepositoryError> {
        Ok(self
            .read()?
            .matches
            .iter()
            .find(|m| m.id.as_deref() == Some(id))
            .cloned())
    }

    async fn list_matches_by_profile(
        &self,
        profile_id: &str,
        limit: usize,
    ) -> Result<Vec<Match>, RepositoryError> {
        Ok(self
            .read()?
            .matches
            .iter()
            .rev()
            .filter(|m| m.profile_id == profile_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn delete_match(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut store = self.write()?;
        let before = store.matches.len();
        store.matches.retain(|m| m.id.as_deref() != Some(id));
        Ok(store.matches.len() < before)
    }

    async fn delete_matches_by_profile(&self, profile_id: &str) -> Result<u64, RepositoryError> {
        let mut store = self.write()?;
        let before = store.matches.len();
        store.matches.retain(|m| m.profile_id != profile_id);
        let removed = (before - store.matches.len()) as u64;

        tracing::debug!("Deleted {} matches for profile {}", removed, profile_id);
        Ok(removed)
    }

    async fn health_check(&self) -> Result<bool, RepositoryError> {
        self.read().map(|_| true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IncomeLevel;

    fn profile() -> Profile {
        Profile {
            id: None,
            name: "Test".to_string(),
            email: "test@example.com".to_string(),
            persona: "student".to_string(),
            region: "Oregon".to_string(),
            gpa: None,
            is_minority: false,
            has_disability: false,
            income_level: IncomeLevel::High,
            created_at: None,
            updated_at: None,
        }
    }

    fn grant(title: &str) -> Grant {
        Grant {
            id: None,
            title: title.to_string(),
            description: "Test grant".to_string(),
            amount: 500.0,
            deadline: "2099-01-01".to_string(),
            eligible_personas: vec![],
            eligible_regions: vec![],
            min_gpa: None,
            requires_minority: false,
            requires_disability: false,
            income_requirements: vec![],
            organization: "Org".to_string(),
            url: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_profile_roundtrip_and_replace() {
        let repo = InMemoryRepository::new();
        let created = repo.create_profile(profile()).await.unwrap();
        let id = created.id.clone().unwrap();

        let mut replacement = profile();
        replacement.region = "Nevada".to_string();
        let updated = repo.update_profile(&id, replacement).await.unwrap();

        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(repo.get_profile(&id).await.unwrap().unwrap().region, "Nevada");
        assert!(matches!(
            repo.update_profile("missing", profile()).await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_and_delete_profiles() {
        let repo = InMemoryRepository::new();
        let first = repo.create_profile(profile()).await.unwrap();
        let second = repo.create_profile(profile()).await.unwrap();

        let listed = repo.list_profiles(10).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].created_at <= listed[1].created_at);
        assert_eq!(repo.list_profiles(1).await.unwrap().len(), 1);

        assert!(repo.delete_profile(first.id()).await.unwrap());
        assert!(!repo.delete_profile(first.id()).await.unwrap());
        assert!(repo.get_profile(first.id()).await.unwrap().is_none());

        let remaining = repo.list_profiles(10).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, second.id);
    }

    #[tokio::test]
    async fn test_grant_update_keeps_catalog_order() {
        let repo = InMemoryRepository::new();
        let mut ids = Vec::new();
        for title in ["A", "B", "C"] {
            let created = repo.create_grant(grant(title)).await.unwrap();
            ids.push(created.id.unwrap());
        }

        let original = repo.get_grant(&ids[1]).await.unwrap().unwrap();
        let updated = repo.update_grant(&ids[1], grant("B2")).await.unwrap();
        assert_eq!(updated.id.as_deref(), Some(ids[1].as_str()));
        assert_eq!(updated.created_at, original.created_at);

        let titles: Vec<String> = repo
            .list_grants(10)
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.title)
            .collect();
        assert_eq!(titles, vec!["A", "B2", "C"]);

        assert!(matches!(
            repo.update_grant("missing", grant("X")).await,
            Err(RepositoryError::NotFound(_))
        ));

        assert!(repo.delete_grant(&ids[0]).await.unwrap());
        assert!(!repo.delete_grant(&ids[0]).await.unwrap());
        assert_eq!(repo.list_grants(10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_match_lifecycle() {
        let repo = InMemoryRepository::new();
        let a = repo
            .create_match(Match::new("p1", "g1", 100.0, "ok".to_string()))
            .await
            .unwrap();
        repo.create_match(Match::new("p1", "g2", 100.0, "ok".to_string()))
            .await
            .unwrap();
        repo.create_match(Match::new("p2", "g1", 100.0, "ok".to_string()))
            .await
            .unwrap();

        assert!(a.id.is_some() && a.created_at.is_some());
        assert_eq!(repo.list_matches_by_profile("p1", 100).await.unwrap().len(), 2);
        assert_eq!(repo.list_matches_by_profile("p1", 1).await.unwrap().len(), 1);

        assert!(repo.delete_match(a.id.as_deref().unwrap()).await.unwrap());
        assert_eq!(repo.delete_matches_by_profile("p1").await.unwrap(), 1);
        assert_eq!(repo.delete_matches_by_profile("p1").await.unwrap(), 0);
        assert_eq!(repo.list_matches_by_profile("p2", 100).await.unwrap().len(), 1);
    }
}
