use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query string for find/refresh match endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchLimitQuery {
    pub limit: Option<usize>,
}

/// Query string for listing endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_list_limit")]
    pub limit: usize,
}

fn default_list_limit() -> usize {
    100
}

/// Request to generate an application packet
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PacketRequest {
    #[validate(length(min = 1))]
    pub profile_id: String,
    #[validate(length(min = 1))]
    pub grant_ids: Vec<String>,
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "pdf".to_string()
}

/// Query string for packet downloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadQuery {
    pub filename: String,
}

/// Query string for catalog seeding; `file` is a name inside the seed directory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedQuery {
    pub file: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_request_defaults_to_pdf() {
        let req: PacketRequest =
            serde_json::from_str(r#"{"profile_id":"p1","grant_ids":["g1"]}"#).unwrap();
        assert_eq!(req.format, "pdf");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_packet_request_requires_grants() {
        let req: PacketRequest =
            serde_json::from_str(r#"{"profile_id":"p1","grant_ids":[]}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
