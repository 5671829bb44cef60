use chrono::{DateTime, Utc};

use crate::core::format_decimal;
use crate::models::{Grant, IncomeLevel, Profile};

pub const PACKET_TITLE: &str = "Grant Application Packet";

/// A structural element of a packet
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    /// Level 1 is a section heading, level 2 a grant entry heading
    Heading { level: u8, text: String },
    /// A bold label followed by a value, e.g. "Name: Ada"
    Field { label: String, value: String },
    /// A bold label on its own line
    Label(String),
    Bullet(String),
    Spacer,
    PageBreak,
    Footer(String),
}

/// Format-neutral packet content
#[derive(Debug, Clone, PartialEq)]
pub struct PacketDocument {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl PacketDocument {
    /// Build the packet for a profile and grants, keeping grant input order
    pub fn build(profile: &Profile, grants: &[Grant], generated_at: DateTime<Utc>) -> Self {
        let mut blocks = vec![
            Block::Title(PACKET_TITLE.to_string()),
            Block::Spacer,
            Block::Heading {
                level: 1,
                text: "Applicant Information".to_string(),
            },
            field("Name", &profile.name),
            field("Email", &profile.email),
            field("Persona", &profile.persona),
            field("Region", &profile.region),
        ];

        if let Some(gpa) = profile.gpa {
            blocks.push(field("GPA", &format_decimal(gpa)));
        }
        blocks.push(field("Income Level", profile.income_level.as_str()));
        blocks.push(Block::Spacer);

        blocks.push(Block::Heading {
            level: 1,
            text: "Recommended Grants".to_string(),
        });

        for (i, grant) in grants.iter().enumerate() {
            push_grant_entry(&mut blocks, i + 1, grant);

            if i + 1 < grants.len() {
                blocks.push(Block::PageBreak);
            } else {
                blocks.push(Block::Spacer);
            }
        }

        blocks.push(Block::Footer(format!(
            "Generated on {}",
            generated_at.format("%B %d, %Y at %I:%M %p")
        )));

        Self {
            title: PACKET_TITLE.to_string(),
            blocks,
        }
    }

    /// Number of grant entries in the packet
    pub fn grant_entry_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::Heading { level: 2, .. }))
            .count()
    }
}

fn field(label: &str, value: &str) -> Block {
    Block::Field {
        label: label.to_string(),
        value: value.to_string(),
    }
}

fn push_grant_entry(blocks: &mut Vec<Block>, number: usize, grant: &Grant) {
    blocks.push(Block::Heading {
        level: 2,
        text: format!("{}. {}", number, grant.title),
    });
    blocks.push(field("Organization", &grant.organization));
    blocks.push(field("Amount", &format_currency(grant.amount)));
    blocks.push(field("Deadline", &grant.deadline));
    blocks.push(field("Description", &grant.description));

    if let Some(url) = grant.url.as_deref().filter(|u| !u.is_empty()) {
        blocks.push(field("Application URL", url));
    }

    blocks.push(Block::Label("Eligibility Criteria:".to_string()));
    blocks.extend(eligibility_criteria(grant).into_iter().map(Block::Bullet));
}

/// Criteria lines for the restrictions a grant actually sets
///
/// Unset dimensions are omitted rather than shown as "none".
pub fn eligibility_criteria(grant: &Grant) -> Vec<String> {
    let mut lines = Vec::new();

    if !grant.eligible_personas.is_empty() {
        lines.push(format!("Personas: {}", grant.eligible_personas.join(", ")));
    }
    if !grant.eligible_regions.is_empty() {
        lines.push(format!("Regions: {}", grant.eligible_regions.join(", ")));
    }
    if let Some(min_gpa) = grant.min_gpa {
        lines.push(format!("Minimum GPA: {}", format_decimal(min_gpa)));
    }
    if !grant.income_requirements.is_empty() {
        let levels: Vec<&str> = grant
            .income_requirements
            .iter()
            .map(IncomeLevel::as_str)
            .collect();
        lines.push(format!("Income Levels: {}", levels.join(", ")));
    }

    lines
}

/// Format an amount as US dollars with thousands separators, e.g. `$5,000.00`
pub fn format_currency(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (whole, cents) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn profile(gpa: Option<f64>) -> Profile {
        Profile {
            id: Some("p1".to_string()),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            persona: "student".to_string(),
            region: "California".to_string(),
            gpa,
            is_minority: false,
            has_disability: false,
            income_level: IncomeLevel::Low,
            created_at: None,
            updated_at: None,
        }
    }

    fn grant(title: &str) -> Grant {
        Grant {
            id: Some(title.to_lowercase()),
            title: title.to_string(),
            description: "Supports research".to_string(),
            amount: 12500.0,
            deadline: "2099-03-01".to_string(),
            eligible_personas: vec!["student".to_string(), "researcher".to_string()],
            eligible_regions: vec![],
            min_gpa: Some(3.0),
            requires_minority: false,
            requires_disability: false,
            income_requirements: vec![],
            organization: "Science Trust".to_string(),
            url: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 14, 5, 0).unwrap()
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(5000.0), "$5,000.00");
        assert_eq!(format_currency(999.5), "$999.50");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(0.0), "$0.00");
    }

    #[test]
    fn test_criteria_omit_unset_dimensions() {
        let lines = eligibility_criteria(&grant("A"));
        assert_eq!(lines, vec!["Personas: student, researcher", "Minimum GPA: 3.0"]);
    }

    #[test]
    fn test_page_breaks_between_entries_only() {
        let grants = vec![grant("A"), grant("B"), grant("C")];
        let doc = PacketDocument::build(&profile(Some(3.5)), &grants, generated_at());

        let breaks = doc.blocks.iter().filter(|b| **b == Block::PageBreak).count();
        assert_eq!(breaks, 2);
        assert_eq!(doc.grant_entry_count(), 3);
    }

    #[test]
    fn test_entries_keep_input_order_and_footer_last() {
        let grants = vec![grant("Zeta"), grant("Alpha")];
        let doc = PacketDocument::build(&profile(None), &grants, generated_at());

        let headings: Vec<&str> = doc
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Heading { level: 2, text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(headings, vec!["1. Zeta", "2. Alpha"]);

        assert_eq!(
            doc.blocks.last(),
            Some(&Block::Footer("Generated on October 19, 2026 at 02:05 PM".to_string()))
        );
    }

    #[test]
    fn test_gpa_only_when_present() {
        let has_gpa = |doc: &PacketDocument| {
            doc.blocks
                .iter()
                .any(|b| matches!(b, Block::Field { label, .. } if label == "GPA"))
        };

        let grants = vec![grant("A")];
        assert!(has_gpa(&PacketDocument::build(&profile(Some(3.2)), &grants, generated_at())));
        assert!(!has_gpa(&PacketDocument::build(&profile(None), &grants, generated_at())));
    }
}
