// Core algorithm exports
pub mod eligibility;
pub mod matcher;
pub mod scoring;

pub use eligibility::{Gate, GateOutcome};
pub use matcher::{Matcher, RankedGrant};
pub use scoring::{
    calculate_match_score, deadline_status, format_decimal, parse_deadline, DeadlineStatus,
};
