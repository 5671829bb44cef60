use actix_web::{web, HttpResponse};
use validator::Validate;

use super::AppState;
use crate::error::ServiceError;
use crate::models::{Grant, ListQuery, Profile, SeedQuery, SeedResponse};
use crate::services::load_seed_file;

/// Configure profile and grant catalog routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/profiles", web::post().to(create_profile))
        .route("/profiles", web::get().to(list_profiles))
        .route("/profiles/{profile_id}", web::get().to(get_profile))
        .route("/profiles/{profile_id}", web::put().to(update_profile))
        .route("/profiles/{profile_id}", web::delete().to(delete_profile))
        .route("/grants", web::post().to(create_grant))
        .route("/grants", web::get().to(list_grants))
        .route("/grants/seed", web::post().to(seed_grants))
        .route("/grants/{grant_id}", web::get().to(get_grant))
        .route("/grants/{grant_id}", web::put().to(update_grant))
        .route("/grants/{grant_id}", web::delete().to(delete_grant));
}

async fn create_profile(
    state: web::Data<AppState>,
    req: web::Json<Profile>,
) -> Result<HttpResponse, ServiceError> {
    req.validate()?;

    let profile = state.repository.create_profile(req.into_inner()).await?;
    tracing::info!("Created profile {}", profile.id());

    Ok(HttpResponse::Created().json(profile))
}

async fn get_profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let profile = state
        .repository
        .get_profile(&path)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Profile not found".to_string()))?;
    Ok(HttpResponse::Ok().json(profile))
}

/// Full replacement of a stored profile
async fn update_profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<Profile>,
) -> Result<HttpResponse, ServiceError> {
    req.validate()?;

    let profile = state
        .repository
        .update_profile(&path, req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(profile))
}

async fn list_profiles(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ServiceError> {
    let profiles = state.repository.list_profiles(query.limit).await?;
    Ok(HttpResponse::Ok().json(profiles))
}

async fn delete_profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    if !state.repository.delete_profile(&path).await? {
        return Err(ServiceError::NotFound("Profile not found".to_string()));
    }

    tracing::info!("Deleted profile {}", path.as_str());
    Ok(HttpResponse::NoContent().finish())
}

async fn create_grant(
    state: web::Data<AppState>,
    req: web::Json<Grant>,
) -> Result<HttpResponse, ServiceError> {
    req.validate()?;

    let grant = state.repository.create_grant(req.into_inner()).await?;
    tracing::info!("Created grant {} ({})", grant.id(), grant.title);

    Ok(HttpResponse::Created().json(grant))
}

async fn get_grant(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let grant = state
        .repository
        .get_grant(&path)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Grant not found".to_string()))?;
    Ok(HttpResponse::Ok().json(grant))
}

async fn list_grants(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ServiceError> {
    let grants = state.repository.list_grants(query.limit).await?;
    Ok(HttpResponse::Ok().json(grants))
}

/// Full replacement of a catalog entry
async fn update_grant(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<Grant>,
) -> Result<HttpResponse, ServiceError> {
    req.validate()?;

    let grant = state.repository.update_grant(&path, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(grant))
}

async fn delete_grant(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    if !state.repository.delete_grant(&path).await? {
        return Err(ServiceError::NotFound("Grant not found".to_string()));
    }

    tracing::info!("Deleted grant {}", path.as_str());
    Ok(HttpResponse::NoContent().finish())
}

/// Load grants from a JSON file in the configured seed directory
///
/// POST /api/v1/grants/seed?file=grants_seed.json
async fn seed_grants(
    state: web::Data<AppState>,
    query: web::Query<SeedQuery>,
) -> Result<HttpResponse, ServiceError> {
    let name = query.file.as_deref().unwrap_or(state.seed.file.as_str());
    let count = load_seed_file(state.repository.as_ref(), &state.seed.dir, name).await?;

    Ok(HttpResponse::Created().json(SeedResponse {
        message: format!("Successfully loaded {} grants", count),
        count,
    }))
}
