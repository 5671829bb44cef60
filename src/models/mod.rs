// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{GatePoints, Grant, IncomeLevel, Match, MatchResult, Profile};
pub use requests::{DownloadQuery, ListQuery, MatchLimitQuery, PacketRequest, SeedQuery};
pub use responses::{ErrorResponse, HealthResponse, PacketResponse, SeedResponse};
