use actix_web::{web, HttpResponse, Responder};

use super::AppState;
use crate::error::ServiceError;
use crate::models::{HealthResponse, ListQuery, MatchLimitQuery};

/// Configure health and match routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/matches/find/{profile_id}", web::post().to(find_matches))
        .route("/matches/refresh/{profile_id}", web::post().to(refresh_matches))
        .route("/matches/profile/{profile_id}", web::get().to(list_profile_matches))
        .route("/matches/{match_id}", web::get().to(get_match))
        .route("/matches/{match_id}", web::delete().to(delete_match));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let healthy = state.repository.health_check().await.unwrap_or(false);

    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Find matches endpoint
///
/// POST /api/v1/matches/find/{profile_id}?limit=5
///
/// Scores the whole catalog, stores the top matches and returns them
/// as `[{"match": {...}, "grant": {...}}]`, best first.
async fn find_matches(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<MatchLimitQuery>,
) -> Result<HttpResponse, ServiceError> {
    let profile_id = path.into_inner();
    let limit = state.match_limit(query.limit)?;

    tracing::info!("Finding matches for profile: {}, limit: {}", profile_id, limit);

    let results = state.matching.find_matches(&profile_id, limit).await?;
    Ok(HttpResponse::Ok().json(results))
}

/// Refresh matches endpoint
///
/// POST /api/v1/matches/refresh/{profile_id}?limit=5
async fn refresh_matches(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<MatchLimitQuery>,
) -> Result<HttpResponse, ServiceError> {
    let profile_id = path.into_inner();
    let limit = state.match_limit(query.limit)?;

    tracing::info!("Refreshing matches for profile: {}, limit: {}", profile_id, limit);

    let results = state.matching.refresh_matches(&profile_id, limit).await?;
    Ok(HttpResponse::Ok().json(results))
}

/// Stored matches for a profile, newest first
///
/// GET /api/v1/matches/profile/{profile_id}?limit=100
async fn list_profile_matches(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ServiceError> {
    let matches = state
        .repository
        .list_matches_by_profile(&path, query.limit)
        .await?;
    Ok(HttpResponse::Ok().json(matches))
}

async fn get_match(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let found = state
        .repository
        .get_match(&path)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Match not found".to_string()))?;
    Ok(HttpResponse::Ok().json(found))
}

async fn delete_match(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    if !state.repository.delete_match(&path).await? {
        return Err(ServiceError::NotFound("Match not found".to_string()));
    }

    tracing::debug!("Deleted match {}", path.as_str());
    Ok(HttpResponse::NoContent().finish())
}
