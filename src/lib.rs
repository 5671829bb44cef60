//! Grant Match - eligibility matching and application packets for grant seekers
//!
//! This library scores applicant profiles against a grant catalog through a
//! fixed sequence of eligibility gates, ranks the eligible grants, and renders
//! application packets as PDF or DOCX.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod packets;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{calculate_match_score, Gate, GateOutcome, Matcher, RankedGrant};
pub use error::ServiceError;
pub use models::{GatePoints, Grant, IncomeLevel, Match, MatchResult, Profile};
pub use packets::{PacketDocument, PacketFormat, PacketGenerator};
pub use services::{InMemoryRepository, MatchingService, PostgresRepository, Repository};
