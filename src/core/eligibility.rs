use crate::core::scoring::format_decimal;
use crate::models::{GatePoints, Grant, Profile};

/// Result of evaluating a single eligibility gate
#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    /// Requirement met (or absent); contributes points and a clause
    Pass { points: f64, reason: String },
    /// Requirement unmet; overrides the whole evaluation
    Fail { reason: String },
}

impl GateOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, GateOutcome::Pass { .. })
    }
}

/// One eligibility dimension of the scoring sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Persona,
    Region,
    Gpa,
    Minority,
    Disability,
    Income,
}

impl Gate {
    /// Evaluation order. The first failing gate determines the rejection reason.
    pub const ORDER: [Gate; 6] = [
        Gate::Persona,
        Gate::Region,
        Gate::Gpa,
        Gate::Minority,
        Gate::Disability,
        Gate::Income,
    ];

    pub fn points(&self, points: &GatePoints) -> f64 {
        match self {
            Gate::Persona => points.persona,
            Gate::Region => points.region,
            Gate::Gpa => points.gpa,
            Gate::Minority => points.minority,
            Gate::Disability => points.disability,
            Gate::Income => points.income,
        }
    }

    /// Evaluate this gate for a profile against a grant
    pub fn evaluate(&self, profile: &Profile, grant: &Grant, points: &GatePoints) -> GateOutcome {
        let pass = |reason: String| GateOutcome::Pass {
            points: self.points(points),
            reason,
        };
        let fail = |reason: String| GateOutcome::Fail { reason };

        match self {
            Gate::Persona => {
                if allows(&grant.eligible_personas, &profile.persona) {
                    pass(format!("Your {} persona is eligible", profile.persona))
                } else {
                    fail("Your persona does not match the eligibility criteria".to_string())
                }
            }
            Gate::Region => {
                if allows(&grant.eligible_regions, &profile.region) {
                    pass(format!("Your region ({}) is eligible", profile.region))
                } else {
                    fail(format!(
                        "Your region ({}) is not eligible for this grant",
                        profile.region
                    ))
                }
            }
            Gate::Gpa => match (grant.min_gpa, profile.gpa) {
                (None, _) => pass("No GPA requirement".to_string()),
                (Some(min), Some(gpa)) if gpa >= min => pass(format!(
                    "Your GPA ({}) meets the minimum requirement ({})",
                    format_decimal(gpa),
                    format_decimal(min)
                )),
                (Some(min), _) => fail(format!(
                    "Your GPA does not meet the minimum requirement of {}",
                    format_decimal(min)
                )),
            },
            Gate::Minority => {
                if !grant.requires_minority {
                    pass("No minority status requirement".to_string())
                } else if profile.is_minority {
                    pass("You meet the minority status requirement".to_string())
                } else {
                    fail("This grant requires minority status".to_string())
                }
            }
            Gate::Disability => {
                if !grant.requires_disability {
                    pass("No disability status requirement".to_string())
                } else if profile.has_disability {
                    pass("You meet the disability status requirement".to_string())
                } else {
                    fail("This grant requires disability status".to_string())
                }
            }
            Gate::Income => {
                if grant.income_requirements.is_empty()
                    || grant.income_requirements.contains(&profile.income_level)
                {
                    pass(format!(
                        "Your income level ({}) is eligible",
                        profile.income_level
                    ))
                } else {
                    fail(format!(
                        "Your income level ({}) is not eligible",
                        profile.income_level
                    ))
                }
            }
        }
    }
}

/// An empty restriction set admits everyone
#[inline]
fn allows(eligible: &[String], value: &str) -> bool {
    eligible.is_empty() || eligible.iter().any(|v| v == value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IncomeLevel;

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

    fn create_test_grant() -> Grant {
        Grant {
            id: Some("g1".to_string()),
            title: "STEM Grant".to_string(),
            description: "For STEM students".to_string(),
            amount: 5000.0,
            deadline: "2099-12-31".to_string(),
            eligible_personas: vec![],
            eligible_regions: vec![],
            min_gpa: None,
            requires_minority: false,
            requires_disability: false,
            income_requirements: vec![],
            organization: "Tech Foundation".to_string(),
            url: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_unrestricted_grant_passes_every_gate() {
        let profile = create_test_profile();
        let grant = create_test_grant();
        let points = GatePoints::default();

        for gate in Gate::ORDER {
            assert!(gate.evaluate(&profile, &grant, &points).is_pass(), "{:?}", gate);
        }
    }

    #[test]
    fn test_persona_gate_fail() {
        let profile = create_test_profile();
        let mut grant = create_test_grant();
        grant.eligible_personas = vec!["researcher".to_string()];

        let outcome = Gate::Persona.evaluate(&profile, &grant, &GatePoints::default());
        assert_eq!(
            outcome,
            GateOutcome::Fail {
                reason: "Your persona does not match the eligibility criteria".to_string()
            }
        );
    }

    #[test]
    fn test_gpa_tie_meets_minimum() {
        let profile = create_test_profile();
        let mut grant = create_test_grant();
        grant.min_gpa = Some(3.8);

        let outcome = Gate::Gpa.evaluate(&profile, &grant, &GatePoints::default());
        assert_eq!(
            outcome,
            GateOutcome::Pass {
                points: 20.0,
                reason: "Your GPA (3.8) meets the minimum requirement (3.8)".to_string()
            }
        );
    }

    #[test]
    fn test_gpa_missing_fails_when_required() {
        let mut profile = create_test_profile();
        profile.gpa = None;
        let mut grant = create_test_grant();
        grant.min_gpa = Some(2.0);

        assert!(!Gate::Gpa.evaluate(&profile, &grant, &GatePoints::default()).is_pass());
    }

    #[test]
    fn test_gpa_missing_passes_without_requirement() {
        let mut profile = create_test_profile();
        profile.gpa = None;
        let grant = create_test_grant();

        assert!(Gate::Gpa.evaluate(&profile, &grant, &GatePoints::default()).is_pass());
    }

    #[test]
    fn test_status_gates() {
        let mut profile = create_test_profile();
        let mut grant = create_test_grant();
        grant.requires_minority = true;
        grant.requires_disability = true;
        let points = GatePoints::default();

        assert!(!Gate::Minority.evaluate(&profile, &grant, &points).is_pass());
        assert!(!Gate::Disability.evaluate(&profile, &grant, &points).is_pass());

        profile.is_minority = true;
        profile.has_disability = true;

        assert!(Gate::Minority.evaluate(&profile, &grant, &points).is_pass());
        assert!(Gate::Disability.evaluate(&profile, &grant, &points).is_pass());
    }

    #[test]
    fn test_income_gate() {
        let profile = create_test_profile();
        let mut grant = create_test_grant();
        grant.income_requirements = vec![IncomeLevel::Low];

        let outcome = Gate::Income.evaluate(&profile, &grant, &GatePoints::default());
        assert_eq!(
            outcome,
            GateOutcome::Fail {
                reason: "Your income level (medium) is not eligible".to_string()
            }
        );
    }
}
