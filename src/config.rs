use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::GatePoints;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub packets: PacketSettings,
    #[serde(default)]
    pub seed: SeedSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// "postgres" or "memory"
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default)]
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

fn default_backend() -> String { "postgres".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_match_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
    #[serde(default = "default_catalog_limit")]
    pub catalog_limit: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            default_limit: default_match_limit(),
            max_limit: default_max_limit(),
            catalog_limit: default_catalog_limit(),
        }
    }
}

fn default_match_limit() -> usize { 5 }
fn default_max_limit() -> usize { 100 }
fn default_catalog_limit() -> usize { 1000 }

impl MatchingSettings {
    /// Resolve a requested limit: absent means the default, zero is rejected,
    /// anything above `max_limit` is capped
    pub fn resolve_limit(&self, requested: Option<usize>) -> Result<usize, String> {
        match requested {
            None => Ok(self.default_limit.min(self.max_limit)),
            Some(0) => Err("limit must be at least 1".to_string()),
            Some(n) => Ok(n.min(self.max_limit)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PacketSettings {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for PacketSettings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> String { "packets".to_string() }

/// Where `POST /grants/seed` may read catalog files from
#[derive(Debug, Clone, Deserialize)]
pub struct SeedSettings {
    #[serde(default = "default_seed_dir")]
    pub dir: String,
    /// Used when the request names no file
    #[serde(default = "default_seed_file")]
    pub file: String,
}

impl Default for SeedSettings {
    fn default() -> Self {
        Self {
            dir: default_seed_dir(),
            file: default_seed_file(),
        }
    }
}

fn default_seed_dir() -> String { "data".to_string() }
fn default_seed_file() -> String { "grants_seed.json".to_string() }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub points: PointsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointsConfig {
    #[serde(default = "default_persona_points")]
    pub persona: f64,
    #[serde(default = "default_region_points")]
    pub region: f64,
    #[serde(default = "default_gpa_points")]
    pub gpa: f64,
    #[serde(default = "default_status_points")]
    pub minority: f64,
    #[serde(default = "default_status_points")]
    pub disability: f64,
    #[serde(default = "default_income_points")]
    pub income: f64,
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self {
            persona: default_persona_points(),
            region: default_region_points(),
            gpa: default_gpa_points(),
            minority: default_status_points(),
            disability: default_status_points(),
            income: default_income_points(),
        }
    }
}

fn default_persona_points() -> f64 { 20.0 }
fn default_region_points() -> f64 { 15.0 }
fn default_gpa_points() -> f64 { 20.0 }
fn default_status_points() -> f64 { 15.0 }
fn default_income_points() -> f64 { 15.0 }

impl PointsConfig {
    /// Every gate must award points and the gates must sum to exactly 100,
    /// so that a fully eligible grant always scores 100
    pub fn validate(&self) -> Result<(), ConfigError> {
        let points = GatePoints::from(self);

        let gates = [
            ("persona", points.persona),
            ("region", points.region),
            ("gpa", points.gpa),
            ("minority", points.minority),
            ("disability", points.disability),
            ("income", points.income),
        ];
        if let Some((name, value)) = gates.iter().find(|(_, value)| *value <= 0.0) {
            return Err(ConfigError::Message(format!(
                "scoring.points.{} must be positive, got {}",
                name, value
            )));
        }

        let total = points.total();
        if (total - 100.0).abs() > 1e-9 {
            return Err(ConfigError::Message(format!(
                "scoring.points must total 100, got {}",
                total
            )));
        }

        Ok(())
    }
}

impl From<&PointsConfig> for GatePoints {
    fn from(config: &PointsConfig) -> Self {
        GatePoints {
            persona: config.persona,
            region: config.region,
            gpa: config.gpa,
            minority: config.minority,
            disability: config.disability,
            income: config.income,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "default".to_string() }

const ENV_PREFIX: &str = "GRANT_MATCH";

fn environment() -> Environment {
    // e.g., GRANT_MATCH__SERVER__PORT -> server.port
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with GRANT_MATCH__)
    /// 5. DATABASE_URL
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(environment())
            .build()?;

        let settings: Self = with_database_url(settings)?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        let settings: Self = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scoring.points.validate()
    }

    pub fn gate_points(&self) -> GatePoints {
        GatePoints::from(&self.scoring.points)
    }
}

/// Apply the conventional DATABASE_URL variable on top of loaded settings
fn with_database_url(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("DATABASE_URL") {
        Ok(url) => Config::builder()
            .add_source(settings)
            .set_override("database.url", url)?
            .build(),
        Err(_) => Ok(settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_points() {
        let points = GatePoints::from(&PointsConfig::default());
        assert_eq!(points, GatePoints::default());
        assert_eq!(points.total(), 100.0);
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "default");
    }

    #[test]
    fn test_resolve_limit() {
        let matching = MatchingSettings::default();
        assert_eq!(matching.resolve_limit(None), Ok(5));
        assert_eq!(matching.resolve_limit(Some(20)), Ok(20));
        assert_eq!(matching.resolve_limit(Some(5000)), Ok(100));
        assert!(matching.resolve_limit(Some(0)).is_err());
    }

    #[test]
    fn test_load_from_file_fills_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nhost = \"127.0.0.1\"\nport = 9000\n\n[database]\nbackend = \"memory\"\n\n[scoring.points]\npersona = 25.0\nregion = 10.0"
        )
        .unwrap();

        let settings = Settings::load_from(file.path()).unwrap();

        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.database.backend, "memory");
        assert_eq!(settings.matching.catalog_limit, 1000);
        assert_eq!(settings.packets.output_dir, "packets");
        assert_eq!(settings.seed.dir, "data");
        assert_eq!(settings.seed.file, "grants_seed.json");
        assert_eq!(settings.gate_points().persona, 25.0);
        assert_eq!(settings.gate_points().region, 10.0);
        assert_eq!(settings.gate_points().total(), 100.0);
    }

    #[test]
    fn test_points_must_be_positive_and_total_hundred() {
        assert!(PointsConfig::default().validate().is_ok());

        let zeroed = PointsConfig {
            persona: 0.0,
            region: 0.0,
            gpa: 0.0,
            minority: 0.0,
            disability: 0.0,
            income: 0.0,
        };
        assert!(zeroed.validate().is_err());

        let inflated = PointsConfig {
            persona: 50.0,
            ..PointsConfig::default()
        };
        assert!(inflated.validate().is_err());

        let negative = PointsConfig {
            persona: 40.0,
            region: -5.0,
            ..PointsConfig::default()
        };
        assert!(negative.validate().is_err());
    }
}
