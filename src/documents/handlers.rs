use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::web::{self, Json, Path};
use actix_web::{Error, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::auth::middleware::authenticated_user;
use crate::composer::{CertificateRequest, InvoiceRequest, QrRequest, ResumeRequest};
use crate::db::AppState;
use crate::documents::models::{
    BulkGenerateResponse, DocumentKind, DocumentSummary, GenerateResponse,
};
use crate::error::CoreError;

#[utoipa::path(
    context_path = "/api",
    tag = "Document Generation",
    post,
    path = "/documents/invoice",
    request_body = InvoiceRequest,
    responses(
        (status = 200, description = "Invoice generated", body = GenerateResponse),
        (status = 400, description = "Invalid payload", body = crate::ErrorResponse),
        (status = 403, description = "Quota exceeded or premium required", body = crate::ErrorResponse)
    )
)]
pub async fn generate_invoice(
    req: HttpRequest,
    payload: Json<InvoiceRequest>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let user_id = authenticated_user(&req)?;
    let record = data
        .service
        .generate_invoice(user_id, payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(GenerateResponse::for_record(
        &record,
        "Invoice generated successfully!",
    )))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Document Generation",
    post,
    path = "/documents/resume",
    request_body = ResumeRequest,
    responses(
        (status = 200, description = "Resume generated", body = GenerateResponse),
        (status = 400, description = "Invalid payload", body = crate::ErrorResponse),
        (status = 403, description = "Quota exceeded or premium required", body = crate::ErrorResponse)
    )
)]
pub async fn generate_resume(
    req: HttpRequest,
    payload: Json<ResumeRequest>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let user_id = authenticated_user(&req)?;
    let record = data
        .service
        .generate_resume(user_id, payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(GenerateResponse::for_record(
        &record,
        "Resume generated successfully!",
    )))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Document Generation",
    post,
    path = "/documents/certificate",
    request_body = CertificateRequest,
    responses(
        (status = 200, description = "Certificate(s) generated", body = BulkGenerateResponse),
        (status = 400, description = "Invalid payload", body = crate::ErrorResponse),
        (status = 403, description = "Quota exceeded or premium required", body = crate::ErrorResponse)
    )
)]
pub async fn generate_certificate(
    req: HttpRequest,
    payload: Json<CertificateRequest>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let user_id = authenticated_user(&req)?;
    let records = data
        .service
        .generate_certificates(user_id, payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(BulkGenerateResponse::for_records(
        &records,
        "Certificate(s) generated successfully!",
    )))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Document Generation",
    post,
    path = "/documents/qrcode",
    request_body = QrRequest,
    responses(
        (status = 200, description = "QR code generated", body = GenerateResponse),
        (status = 400, description = "Invalid payload", body = crate::ErrorResponse),
        (status = 403, description = "Quota exceeded", body = crate::ErrorResponse)
    )
)]
pub async fn generate_qrcode(
    req: HttpRequest,
    payload: Json<QrRequest>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let user_id = authenticated_user(&req)?;
    let record = data
        .service
        .generate_qrcode(user_id, payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(GenerateResponse::for_record(
        &record,
        "QR Code generated successfully!",
    )))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Documents",
    get,
    path = "/documents",
    responses(
        (status = 200, description = "The caller's documents, most recent first", body = [DocumentSummary])
    )
)]
pub async fn list_documents(
    req: HttpRequest,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let user_id = authenticated_user(&req)?;
    let records = data.ledger.list_for(user_id).await?;
    let summaries: Vec<DocumentSummary> = records.into_iter().map(DocumentSummary::from).collect();
    Ok(HttpResponse::Ok().json(summaries))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Documents",
    get,
    path = "/documents/{id}/download",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Artifact file as attachment"),
        (status = 404, description = "Not found or owned by someone else", body = crate::ErrorResponse)
    )
)]
pub async fn download_document(
    req: HttpRequest,
    id: Path<Uuid>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let user_id = authenticated_user(&req)?;
    let record = data.ledger.get_by_public_id(id.into_inner(), user_id).await?;

    // Only a download that can actually be served counts.
    let file = actix_files::NamedFile::open_async(&record.file_path)
        .await
        .map_err(|err| {
            log::error!("artifact file missing for document {}: {}", record.id, err);
            CoreError::NotFound
        })?;
    data.ledger.increment_download(record.id).await?;

    let download_name = format!("{}.{}", record.title, record.file_type);
    Ok(file
        .set_content_disposition(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(download_name)],
        })
        .into_response(&req))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Templates",
    get,
    path = "/templates/{kind}",
    params(("kind" = String, Path, description = "Document kind")),
    responses(
        (status = 200, description = "Active templates with plan availability", body = [crate::templates::TemplateListing]),
        (status = 400, description = "Unknown document kind", body = crate::ErrorResponse)
    )
)]
pub async fn list_templates(
    req: HttpRequest,
    kind: Path<String>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let user_id = authenticated_user(&req)?;
    let kind = DocumentKind::parse(&kind).map_err(CoreError::Validation)?;

    let user = data.ledger.get_user(user_id).await?;
    let premium = user.is_premium(chrono::Utc::now());
    let templates = data.ledger.templates_for(kind).await?;
    Ok(HttpResponse::Ok().json(crate::templates::listing_for(templates, premium)))
}
