use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::document::PacketDocument;
use super::PacketFormat;
use crate::error::ServiceError;
use crate::services::files::ensure_bare_filename;
use crate::services::Repository;

/// File name for a packet: `grant_packet_{profile_id}_{YYYYMMDD_HHMMSS}.{ext}`
pub fn packet_filename(profile_id: &str, at: DateTime<Utc>, format: PacketFormat) -> String {
    format!(
        "grant_packet_{}_{}.{}",
        profile_id,
        at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Renders application packets into an output directory
#[derive(Clone)]
pub struct PacketGenerator {
    repository: Arc<dyn Repository>,
    output_dir: PathBuf,
}

impl PacketGenerator {
    pub fn new(repository: Arc<dyn Repository>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            repository,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render a packet for a profile and the given grants, returning the
    /// path of the written file
    ///
    /// Grant ids that do not resolve are skipped. The directory is created
    /// on first write.
    pub async fn generate_packet(
        &self,
        profile_id: &str,
        grant_ids: &[String],
        format: &str,
    ) -> Result<PathBuf, ServiceError> {
        self.generate_packet_at(profile_id, grant_ids, format, Utc::now())
            .await
    }

    pub async fn generate_packet_at(
        &self,
        profile_id: &str,
        grant_ids: &[String],
        format: &str,
        generated_at: DateTime<Utc>,
    ) -> Result<PathBuf, ServiceError> {
        let format: PacketFormat = format.parse().map_err(ServiceError::Validation)?;

        let profile = self
            .repository
            .get_profile(profile_id)
            .await?
            .ok_or_else(|| ServiceError::Validation(format!("Profile {} not found", profile_id)))?;

        let mut grants = Vec::with_capacity(grant_ids.len());
        for grant_id in grant_ids {
            match self.repository.get_grant(grant_id).await? {
                Some(grant) => grants.push(grant),
                None => tracing::warn!("Skipping unknown grant {} in packet", grant_id),
            }
        }

        if grants.is_empty() {
            return Err(ServiceError::Validation("No valid grants found".to_string()));
        }

        let document = PacketDocument::build(&profile, &grants, generated_at);
        let bytes = format.render(&document)?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self
            .output_dir
            .join(packet_filename(profile_id, generated_at, format));
        tokio::fs::write(&path, &bytes).await?;

        tracing::info!(
            "Generated {} packet with {} grants for profile {}: {}",
            format,
            grants.len(),
            profile_id,
            path.display()
        );

        Ok(path)
    }

    /// Resolve a bare packet file name inside the output directory
    pub fn resolve_download(&self, filename: &str) -> Result<(PathBuf, PacketFormat), ServiceError> {
        ensure_bare_filename(filename)?;

        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let format: PacketFormat = extension.parse().map_err(ServiceError::Validation)?;

        let path = self.output_dir.join(filename);
        if !path.is_file() {
            return Err(ServiceError::NotFound(format!("File {} not found", filename)));
        }

        Ok((path, format))
    }
}
