use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::core::eligibility::{Gate, GateOutcome};
use crate::models::{GatePoints, Grant, Profile};

/// Deadlines closer than this many days get an urgency note
pub const URGENT_DEADLINE_DAYS: i64 = 30;

/// Temporal status of a grant deadline relative to a reference instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineStatus {
    Passed,
    Approaching { days: i64 },
    Open,
    /// Deadline string could not be parsed; no temporal check applies
    Unparsed,
}

/// Calculate a match score (0-100) and explanation for a grant
///
/// Gates are evaluated in [`Gate::ORDER`]. The first failing gate ends the
/// evaluation with a zero score and only that gate's reason; clauses from
/// earlier gates are discarded. A passed deadline rejects an otherwise
/// eligible grant. An unparsable deadline is never a reason for rejection.
pub fn calculate_match_score(
    profile: &Profile,
    grant: &Grant,
    points: &GatePoints,
    now: DateTime<Utc>,
) -> (f64, String) {
    let mut score = 0.0;
    let mut reasons = Vec::with_capacity(Gate::ORDER.len() + 1);

    for gate in Gate::ORDER {
        match gate.evaluate(profile, grant, points) {
            GateOutcome::Pass { points, reason } => {
                score += points;
                reasons.push(reason);
            }
            GateOutcome::Fail { reason } => return (0.0, reason),
        }
    }

    match deadline_status(&grant.deadline, now) {
        DeadlineStatus::Passed => return (0.0, "This grant deadline has passed".to_string()),
        DeadlineStatus::Approaching { days } => {
            reasons.push(format!("Deadline is approaching ({} days)", days));
        }
        DeadlineStatus::Open | DeadlineStatus::Unparsed => {
            reasons.push(format!("Deadline: {}", grant.deadline));
        }
    }

    let explanation = format!(
        "Match score: {}/100. {}.",
        format_decimal(score),
        reasons.join("; ")
    );

    (score, explanation)
}

/// Render a float with at least one fractional digit, e.g. `100.0`, `3.85`
pub fn format_decimal(value: f64) -> String {
    format!("{:?}", value)
}

/// Classify a raw deadline string against `now`
pub fn deadline_status(raw: &str, now: DateTime<Utc>) -> DeadlineStatus {
    let Some(deadline) = parse_deadline(raw) else {
        return DeadlineStatus::Unparsed;
    };

    if deadline < now {
        return DeadlineStatus::Passed;
    }

    let days = (deadline - now).num_days();
    if days < URGENT_DEADLINE_DAYS {
        DeadlineStatus::Approaching { days }
    } else {
        DeadlineStatus::Open
    }
}

/// Parse an ISO-8601 deadline
///
/// Accepts RFC 3339 timestamps, naive timestamps (taken as UTC) and plain
/// dates (midnight UTC).
pub fn parse_deadline(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IncomeLevel;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    fn create_test_profile() -> Profile {
        Profile {
            id: Some("p1".to_string()),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            persona: "student".to_string(),
            region: "California".to_string(),
            gpa: Some(3.8),
            is_minority: false,
            has_disability: false,
            income_level: IncomeLevel::Medium,
            created_at: None,
            updated_at: None,
        }
    }

    fn create_test_grant(deadline: &str) -> Grant {
        Grant {
            id: Some("g1".to_string()),
            title: "STEM Grant".to_string(),
            description: "For STEM students".to_string(),
            amount: 5000.0,
            deadline: deadline.to_string(),
            eligible_personas: vec!["student".to_string()],
            eligible_regions: vec!["California".to_string()],
            min_gpa: Some(3.5),
            requires_minority: false,
            requires_disability: false,
            income_requirements: vec![IncomeLevel::Low, IncomeLevel::Medium],
            organization: "Tech Foundation".to_string(),
            url: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_full_eligibility_scores_hundred() {
        let (score, explanation) = calculate_match_score(
            &create_test_profile(),
            &create_test_grant("2099-12-31"),
            &GatePoints::default(),
            now(),
        );

        assert_eq!(score, 100.0);
        assert_eq!(
            explanation,
            "Match score: 100.0/100. Your student persona is eligible; \
             Your region (California) is eligible; \
             Your GPA (3.8) meets the minimum requirement (3.5); \
             No minority status requirement; No disability status requirement; \
             Your income level (medium) is eligible; Deadline: 2099-12-31."
        );
    }

    #[test]
    fn test_format_decimal_keeps_fraction() {
        assert_eq!(format_decimal(100.0), "100.0");
        assert_eq!(format_decimal(3.0), "3.0");
        assert_eq!(format_decimal(3.85), "3.85");
        assert_eq!(format_decimal(0.0), "0.0");
    }

    #[test]
    fn test_gpa_rejection_is_sole_reason() {
        let mut grant = create_test_grant("2099-12-31");
        grant.min_gpa = Some(3.9);

        let (score, explanation) =
            calculate_match_score(&create_test_profile(), &grant, &GatePoints::default(), now());

        assert_eq!(score, 0.0);
        assert_eq!(explanation, "Your GPA does not meet the minimum requirement of 3.9");
    }

    #[test]
    fn test_persona_failure_wins_over_region_failure() {
        let mut grant = create_test_grant("2099-12-31");
        grant.eligible_personas = vec!["researcher".to_string()];
        grant.eligible_regions = vec!["Texas".to_string()];

        let (score, explanation) =
            calculate_match_score(&create_test_profile(), &grant, &GatePoints::default(), now());

        assert_eq!(score, 0.0);
        assert_eq!(explanation, "Your persona does not match the eligibility criteria");
    }

    #[test]
    fn test_passed_deadline_rejects() {
        let (score, explanation) = calculate_match_score(
            &create_test_profile(),
            &create_test_grant("2020-01-01"),
            &GatePoints::default(),
            now(),
        );

        assert_eq!(score, 0.0);
        assert_eq!(explanation, "This grant deadline has passed");
    }

    #[test]
    fn test_approaching_deadline_note() {
        let deadline = (now() + Duration::days(10)).to_rfc3339();
        let (score, explanation) = calculate_match_score(
            &create_test_profile(),
            &create_test_grant(&deadline),
            &GatePoints::default(),
            now(),
        );

        assert_eq!(score, 100.0);
        assert!(explanation.ends_with("Deadline is approaching (10 days)."), "{}", explanation);
    }

    #[test]
    fn test_unparsable_deadline_is_not_rejected() {
        let (score, explanation) = calculate_match_score(
            &create_test_profile(),
            &create_test_grant("rolling admissions"),
            &GatePoints::default(),
            now(),
        );

        assert_eq!(score, 100.0);
        assert!(explanation.ends_with("Deadline: rolling admissions."));
    }

    #[test]
    fn test_deadline_parsing_formats() {
        assert!(parse_deadline("2026-12-31").is_some());
        assert!(parse_deadline("2026-12-31T23:59:59Z").is_some());
        assert!(parse_deadline("2026-12-31T23:59:59+02:00").is_some());
        assert!(parse_deadline("2026-12-31T23:59:59").is_some());
        assert!(parse_deadline("31/12/2026").is_none());
    }

    #[test]
    fn test_deadline_status() {
        assert_eq!(deadline_status("2026-05-31", now()), DeadlineStatus::Passed);
        assert_eq!(
            deadline_status("2026-06-02", now()),
            DeadlineStatus::Approaching { days: 0 }
        );
        assert_eq!(deadline_status("2027-01-01", now()), DeadlineStatus::Open);
        assert_eq!(deadline_status("soon", now()), DeadlineStatus::Unparsed);
    }
}
