use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;

use super::repository::{new_id, Repository, RepositoryError};
use crate::models::{Grant, IncomeLevel, Match, Profile};

const PROFILE_COLUMNS: &str = "id, name, email, persona, region, gpa, is_minority, \
     has_disability, income_level, created_at, updated_at";

const GRANT_COLUMNS: &str = "id, title, description, amount, deadline, eligible_personas, \
     eligible_regions, min_gpa, requires_minority, requires_disability, income_requirements, \
     organization, url, created_at, updated_at";

const MATCH_COLUMNS: &str = "id, profile_id, grant_id, score, explanation, created_at";

/// PostgreSQL repository
///
/// Holds a connection pool created once at startup. Migrations in
/// `./migrations` run on connect.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Create a new repository from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout_secs: u64,
        idle_timeout_secs: u64,
    ) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(idle_timeout_secs))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new repository from settings
    pub async fn from_settings(
        settings: &crate::config::DatabaseSettings,
    ) -> Result<Self, RepositoryError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            &settings.url,
            settings.max_connections.unwrap_or(10),
            settings.min_connections.unwrap_or(1),
            settings.acquire_timeout_secs.unwrap_or(5),
            settings.idle_timeout_secs.unwrap_or(600),
        )
        .await
    }
}

fn parse_income(raw: &str) -> Result<IncomeLevel, RepositoryError> {
    raw.parse::<IncomeLevel>().map_err(RepositoryError::Corrupt)
}

fn profile_from_row(row: &PgRow) -> Result<Profile, RepositoryError> {
    let income_level: String = row.try_get("income_level")?;

    Ok(Profile {
        id: Some(row.try_get("id")?),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        persona: row.try_get("persona")?,
        region: row.try_get("region")?,
        gpa: row.try_get("gpa")?,
        is_minority: row.try_get("is_minority")?,
        has_disability: row.try_get("has_disability")?,
        income_level: parse_income(&income_level)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn grant_from_row(row: &PgRow) -> Result<Grant, RepositoryError> {
    let income_requirements: Vec<String> = row.try_get("income_requirements")?;

    Ok(Grant {
        id: Some(row.try_get("id")?),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        amount: row.try_get("amount")?,
        deadline: row.try_get("deadline")?,
        eligible_personas: row.try_get("eligible_personas")?,
        eligible_regions: row.try_get("eligible_regions")?,
        min_gpa: row.try_get("min_gpa")?,
        requires_minority: row.try_get("requires_minority")?,
        requires_disability: row.try_get("requires_disability")?,
        income_requirements: income_requirements
            .iter()
            .map(|level| parse_income(level))
            .collect::<Result<_, _>>()?,
        organization: row.try_get("organization")?,
        url: row.try_get("url")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn match_from_row(row: &PgRow) -> Result<Match, RepositoryError> {
    Ok(Match {
        id: Some(row.try_get("id")?),
        profile_id: row.try_get("profile_id")?,
        grant_id: row.try_get("grant_id")?,
        score: row.try_get("score")?,
        explanation: row.try_get("explanation")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn create_profile(&self, mut profile: Profile) -> Result<Profile, RepositoryError> {
        let now = Utc::now();
        profile.id = Some(new_id());
        profile.created_at = Some(now);
        profile.updated_at = Some(now);

        let query = r#"
            INSERT INTO profiles (id, name, email, persona, region, gpa, is_minority,
                                  has_disability, income_level, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#;

        sqlx::query(query)
            .bind(&profile.id)
            .bind(&profile.name)
            .bind(&profile.email)
            .bind(&profile.persona)
            .bind(&profile.region)
            .bind(profile.gpa)
            .bind(profile.is_minority)
            .bind(profile.has_disability)
            .bind(profile.income_level.as_str())
            .bind(profile.created_at)
            .bind(profile.updated_at)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Created profile {}", profile.id());
        Ok(profile)
    }

    async fn get_profile(&self, id: &str) -> Result<Option<Profile>, RepositoryError> {
        let query = format!("SELECT {} FROM profiles WHERE id = $1", PROFILE_COLUMNS);

        sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(profile_from_row)
            .transpose()
    }

    async fn list_profiles(&self, limit: usize) -> Result<Vec<Profile>, RepositoryError> {
        let query = format!(
            "SELECT {} FROM profiles ORDER BY created_at ASC LIMIT $1",
            PROFILE_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(profile_from_row).collect()
    }

    async fn update_profile(&self, id: &str, profile: Profile) -> Result<Profile, RepositoryError> {
        let query = format!(
            r#"
            UPDATE profiles
            SET name = $2, email = $3, persona = $4, region = $5, gpa = $6,
                is_minority = $7, has_disability = $8, income_level = $9, updated_at = $10
            WHERE id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(id)
            .bind(&profile.name)
            .bind(&profile.email)
            .bind(&profile.persona)
            .bind(&profile.region)
            .bind(profile.gpa)
            .bind(profile.is_minority)
            .bind(profile.has_disability)
            .bind(profile.income_level.as_str())
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("profile {}", id)))?;

        profile_from_row(&row)
    }

    async fn delete_profile(&self, id: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_grant(&self, mut grant: Grant) -> Result<Grant, RepositoryError> {
        let now = Utc::now();
        grant.id = Some(new_id());
        grant.created_at = Some(now);
        grant.updated_at = Some(now);

        let income: Vec<String> = grant
            .income_requirements
            .iter()
            .map(|level| level.as_str().to_string())
            .collect();

        let query = r#"
            INSERT INTO grants (id, title, description, amount, deadline, eligible_personas,
                                eligible_regions, min_gpa, requires_minority, requires_disability,
                                income_requirements, organization, url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        "#;

        sqlx::query(query)
            .bind(&grant.id)
            .bind(&grant.title)
            .bind(&grant.description)
            .bind(grant.amount)
            .bind(&grant.deadline)
            .bind(&grant.eligible_personas)
            .bind(&grant.eligible_regions)
            .bind(grant.min_gpa)
            .bind(grant.requires_minority)
            .bind(grant.requires_disability)
            .bind(&income)
            .bind(&grant.organization)
            .bind(&grant.url)
            .bind(grant.created_at)
            .bind(grant.updated_at)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Created grant {} ({})", grant.id(), grant.title);
        Ok(grant)
    }

    async fn get_grant(&self, id: &str) -> Result<Option<Grant>, RepositoryError> {
        let query = format!("SELECT {} FROM grants WHERE id = $1", GRANT_COLUMNS);

        sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(grant_from_row)
            .transpose()
    }

    async fn list_grants(&self, limit: usize) -> Result<Vec<Grant>, RepositoryError> {
        let query = format!(
            "SELECT {} FROM grants ORDER BY seq ASC LIMIT $1",
            GRANT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(grant_from_row).collect()
    }

    async fn update_grant(&self, id: &str, grant: Grant) -> Result<Grant, RepositoryError> {
        let income: Vec<String> = grant
            .income_requirements
            .iter()
            .map(|level| level.as_str().to_string())
            .collect();

        let query = format!(
            r#"
            UPDATE grants
            SET title = $2, description = $3, amount = $4, deadline = $5,
                eligible_personas = $6, eligible_regions = $7, min_gpa = $8,
                requires_minority = $9, requires_disability = $10,
                income_requirements = $11, organization = $12, url = $13, updated_at = $14
            WHERE id = $1
            RETURNING {}
            "#,
            GRANT_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(id)
            .bind(&grant.title)
            .bind(&grant.description)
            .bind(grant.amount)
            .bind(&grant.deadline)
            .bind(&grant.eligible_personas)
            .bind(&grant.eligible_regions)
            .bind(grant.min_gpa)
            .bind(grant.requires_minority)
            .bind(grant.requires_disability)
            .bind(&income)
            .bind(&grant.organization)
            .bind(&grant.url)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("grant {}", id)))?;

        grant_from_row(&row)
    }

    async fn delete_grant(&self, id: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM grants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_match(&self, mut m: Match) -> Result<Match, RepositoryError> {
        m.id = Some(new_id());
        m.created_at = Some(Utc::now());

        let query = r#"
            INSERT INTO matches (id, profile_id, grant_id, score, explanation, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
        "#;

        sqlx::query(query)
            .bind(&m.id)
            .bind(&m.profile_id)
            .bind(&m.grant_id)
            .bind(m.score)
            .bind(&m.explanation)
            .bind(m.created_at)
            .execute(&self.pool)
            .await?;

        Ok(m)
    }

    async fn get_match(&self, id: &str) -> Result<Option<Match>, RepositoryError> {
        let query = format!("SELECT {} FROM matches WHERE id = $1", MATCH_COLUMNS);

        sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(match_from_row)
            .transpose()
    }

    async fn list_matches_by_profile(
        &self,
        profile_id: &str,
        limit: usize,
    ) -> Result<Vec<Match>, RepositoryError> {
        let query = format!(
            r#"
            SELECT {}
            FROM matches
            WHERE profile_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
            MATCH_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(profile_id)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(match_from_row).collect()
    }

    async fn delete_match(&self, id: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM matches WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_matches_by_profile(&self, profile_id: &str) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM matches WHERE profile_id = $1")
            .bind(profile_id)
            .execute(&self.pool)
            .await?;

        tracing::info!(
            "Cleared {} matches for profile {}",
            result.rows_affected(),
            profile_id
        );

        Ok(result.rows_affected())
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, RepositoryError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
