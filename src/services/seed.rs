use std::path::Path;

use super::files::ensure_bare_filename;
use super::repository::Repository;
use crate::error::ServiceError;
use crate::models::Grant;

/// Load grants from a JSON array file into the catalog
///
/// Returns the number of grants inserted. Grants are inserted in file order,
/// which becomes their catalog order.
pub async fn load_seed_data<P: AsRef<Path>>(
    repository: &dyn Repository,
    path: P,
) -> Result<usize, ServiceError> {
    let path = path.as_ref();

    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ServiceError::NotFound(format!(
                "Seed file not found: {}",
                path.display()
            )));
        }
        Err(e) => return Err(e.into()),
    };

    let grants: Vec<Grant> = serde_json::from_str(&raw)
        .map_err(|e| ServiceError::Validation(format!("Invalid seed file: {}", e)))?;

    let mut count = 0;
    for grant in grants {
        repository.create_grant(grant).await?;
        count += 1;
    }

    tracing::info!("Loaded {} grants from {}", count, path.display());
    Ok(count)
}

/// Load a named seed file from `dir`
///
/// Only bare file names are accepted, so a caller cannot reach files outside
/// the seed directory.
pub async fn load_seed_file<D: AsRef<Path>>(
    repository: &dyn Repository,
    dir: D,
    name: &str,
) -> Result<usize, ServiceError> {
    ensure_bare_filename(name)?;
    load_seed_data(repository, dir.as_ref().join(name)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryRepository;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_seed_data() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"title": "A", "description": "a", "amount": 100, "deadline": "2099-01-01", "organization": "Org"}},
                {{"title": "B", "description": "b", "amount": 200, "deadline": "2099-01-01", "organization": "Org",
                  "income_requirements": ["low"]}}
            ]"#
        )
        .unwrap();

        let repo = InMemoryRepository::new();
        let count = load_seed_data(&repo, file.path()).await.unwrap();

        assert_eq!(count, 2);
        let titles: Vec<String> = repo
            .list_grants(10)
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.title)
            .collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_missing_seed_file() {
        let repo = InMemoryRepository::new();
        let result = load_seed_data(&repo, "does/not/exist.json").await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_seed_file_stays_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("grants.json"),
            r#"[{"title": "A", "description": "a", "amount": 100, "deadline": "2099-01-01", "organization": "Org"}]"#,
        )
        .unwrap();

        let repo = InMemoryRepository::new();
        assert_eq!(load_seed_file(&repo, dir.path(), "grants.json").await.unwrap(), 1);

        for name in ["/etc/passwd", "../x.json", "a/b.json"] {
            assert!(matches!(
                load_seed_file(&repo, dir.path(), name).await,
                Err(ServiceError::Validation(_))
            ));
        }
        assert_eq!(repo.list_grants(10).await.unwrap().len(), 1);
    }
}
