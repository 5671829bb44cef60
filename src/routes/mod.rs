// Route exports
pub mod catalog;
pub mod matches;
pub mod packets;

use actix_web::web;
use std::sync::Arc;

use crate::config::{MatchingSettings, SeedSettings};
use crate::error::ServiceError;
use crate::packets::PacketGenerator;
use crate::services::{MatchingService, Repository};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn Repository>,
    pub matching: MatchingService,
    pub packets: PacketGenerator,
    pub limits: MatchingSettings,
    pub seed: SeedSettings,
}

impl AppState {
    /// Apply default, cap and zero check to a requested match limit
    pub fn match_limit(&self, requested: Option<usize>) -> Result<usize, ServiceError> {
        self.limits
            .resolve_limit(requested)
            .map_err(ServiceError::Validation)
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure)
            .configure(catalog::configure)
            .configure(packets::configure),
    );
}
