use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Closed set of applicant income brackets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomeLevel {
    Low,
    Medium,
    High,
}

impl IncomeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncomeLevel::Low => "low",
            IncomeLevel::Medium => "medium",
            IncomeLevel::High => "high",
        }
    }
}

impl fmt::Display for IncomeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncomeLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(IncomeLevel::Low),
            "medium" => Ok(IncomeLevel::Medium),
            "high" => Ok(IncomeLevel::High),
            other => Err(format!("unknown income level: {}", other)),
        }
    }
}

/// Applicant eligibility profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Profile {
    #[serde(default)]
    pub id: Option<String>,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    /// e.g. "student", "researcher", "entrepreneur"
    #[validate(length(min = 1))]
    pub persona: String,
    pub region: String,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 4.0))]
    pub gpa: Option<f64>,
    #[serde(default)]
    pub is_minority: bool,
    #[serde(default)]
    pub has_disability: bool,
    pub income_level: IncomeLevel,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Profile {
    /// Identity as a string slice, empty for records not yet stored
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }
}

/// Funding offer in the catalog
///
/// An empty eligibility set on any dimension means the grant is unrestricted
/// on that dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Grant {
    #[serde(default)]
    pub id: Option<String>,
    #[validate(length(min = 1))]
    pub title: String,
    pub description: String,
    #[validate(range(min = 0.0))]
    pub amount: f64,
    /// ISO-8601 date string, kept verbatim
    pub deadline: String,
    #[serde(default)]
    pub eligible_personas: Vec<String>,
    #[serde(default)]
    pub eligible_regions: Vec<String>,
    #[serde(default)]
    pub min_gpa: Option<f64>,
    #[serde(default)]
    pub requires_minority: bool,
    #[serde(default)]
    pub requires_disability: bool,
    #[serde(default)]
    pub income_requirements: Vec<IncomeLevel>,
    pub organization: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Grant {
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }
}

/// Scored pairing of a profile and a grant
///
/// Matches are derived data: they can be deleted and recomputed at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    #[serde(default)]
    pub id: Option<String>,
    pub profile_id: String,
    pub grant_id: String,
    /// 0-100
    pub score: f64,
    pub explanation: String,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Match {
    /// Build an unsaved match; the repository assigns id and timestamp
    pub fn new(profile_id: &str, grant_id: &str, score: f64, explanation: String) -> Self {
        Self {
            id: None,
            profile_id: profile_id.to_string(),
            grant_id: grant_id.to_string(),
            score,
            explanation,
            created_at: None,
        }
    }
}

/// Presentation view pairing a stored match with its grant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "match")]
    pub match_: Match,
    pub grant: Grant,
}

/// Points awarded by each eligibility gate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GatePoints {
    pub persona: f64,
    pub region: f64,
    pub gpa: f64,
    pub minority: f64,
    pub disability: f64,
    pub income: f64,
}

impl GatePoints {
    pub fn total(&self) -> f64 {
        self.persona + self.region + self.gpa + self.minority + self.disability + self.income
    }
}

impl Default for GatePoints {
    fn default() -> Self {
        Self {
            persona: 20.0,
            region: 15.0,
            gpa: 20.0,
            minority: 15.0,
            disability: 15.0,
            income: 15.0,
        }
    }
}
