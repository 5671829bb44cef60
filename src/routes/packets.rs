use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use validator::Validate;

use super::AppState;
use crate::error::ServiceError;
use crate::models::{DownloadQuery, PacketRequest, PacketResponse};

/// Configure packet routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/packets/generate", web::post().to(generate_packet))
        .route("/packets/download", web::get().to(download_packet));
}

/// Generate packet endpoint
///
/// POST /api/v1/packets/generate
///
/// Request body:
/// ```json
/// {
///   "profile_id": "string",
///   "grant_ids": ["string"],
///   "format": "pdf|docx"
/// }
/// ```
async fn generate_packet(
    state: web::Data<AppState>,
    req: web::Json<PacketRequest>,
) -> Result<HttpResponse, ServiceError> {
    req.validate()?;

    let path = state
        .packets
        .generate_packet(&req.profile_id, &req.grant_ids, &req.format)
        .await?;

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(HttpResponse::Ok().json(PacketResponse {
        message: "Packet generated successfully".to_string(),
        filepath: path.display().to_string(),
        download_url: format!("/api/v1/packets/download?filename={}", filename),
        filename,
        format: req.format.to_lowercase(),
    }))
}

/// Download a generated packet by bare file name
async fn download_packet(
    state: web::Data<AppState>,
    query: web::Query<DownloadQuery>,
) -> Result<HttpResponse, ServiceError> {
    let (path, format) = state.packets.resolve_download(&query.filename)?;
    let bytes = tokio::fs::read(&path).await?;

    Ok(HttpResponse::Ok()
        .content_type(format.mime_type())
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(query.filename.clone())],
        })
        .body(bytes))
}
