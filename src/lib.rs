use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod composer;
pub mod db;
pub mod documents;
pub mod error;
pub mod ledger;
pub mod namer;
pub mod quota;
pub mod storage;
pub mod templates;
pub mod users;

pub use crate::db::AppState;
pub use crate::error::CoreError;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// API routes under `/api`; shared between `run` and the test harness.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::resource("/documents")
                    .route(web::get().to(documents::handlers::list_documents)),
            )
            .service(
                web::resource("/documents/invoice")
                    .route(web::post().to(documents::handlers::generate_invoice)),
            )
            .service(
                web::resource("/documents/resume")
                    .route(web::post().to(documents::handlers::generate_resume)),
            )
            .service(
                web::resource("/documents/certificate")
                    .route(web::post().to(documents::handlers::generate_certificate)),
            )
            .service(
                web::resource("/documents/qrcode")
                    .route(web::post().to(documents::handlers::generate_qrcode)),
            )
            .service(
                web::resource("/documents/{id}/download")
                    .route(web::get().to(documents::handlers::download_document)),
            )
            .service(
                web::resource("/templates/{kind}")
                    .route(web::get().to(documents::handlers::list_templates)),
            )
            .service(
                web::resource("/user/stats").route(web::get().to(users::handlers::user_stats)),
            ),
    );
}

pub async fn run() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    #[derive(OpenApi)]
    #[openapi(
        paths(
            crate::documents::handlers::generate_invoice,
            crate::documents::handlers::generate_resume,
            crate::documents::handlers::generate_certificate,
            crate::documents::handlers::generate_qrcode,
            crate::documents::handlers::list_documents,
            crate::documents::handlers::download_document,
            crate::documents::handlers::list_templates,
            crate::users::handlers::user_stats,
        ),
        components(
            schemas(
                composer::invoice::InvoiceRequest,
                composer::invoice::InvoiceItem,
                composer::resume::ResumeRequest,
                composer::resume::PersonalInfo,
                composer::resume::ExperienceEntry,
                composer::resume::EducationEntry,
                composer::resume::SkillEntry,
                composer::resume::ProjectEntry,
                composer::resume::CertificationEntry,
                composer::certificate::CertificateRequest,
                composer::qrcode::QrRequest,
                composer::qrcode::QrPayload,
                composer::qrcode::QrFormat,
                composer::qrcode::QrErrorCorrection,
                documents::models::DocumentKind,
                documents::models::DocumentSummary,
                documents::models::GenerateResponse,
                documents::models::BulkGenerateResponse,
                documents::models::GeneratedFile,
                templates::TemplateListing,
                users::model::UserStats,
                users::model::SubscriptionPlan,
                ErrorResponse,
            )
        ),
        tags(
            (name = "Document Generation", description = "Generate invoices, resumes, certificates and QR codes."),
            (name = "Documents", description = "Listing and downloads."),
            (name = "Templates", description = "Template catalog."),
            (name = "Users", description = "Account usage.")
        )
    )]
    struct ApiDoc;

    dotenvy::dotenv().ok();
    let app_state = match AppState::new().await {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!(
                "Failed to initialize application state. Check DATABASE_URL in .env and ensure the database is running. Error: {}",
                e
            );
            std::process::exit(1);
        }
    };

    let prometheus = PrometheusMetricsBuilder::new("docuforge_server")
        .endpoint("/metrics")
        .build()
        .expect("Failed to create Prometheus metrics middleware");

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    log::info!("Starting server at http://{bind_addr}");

    HttpServer::new(move || {
        let app_state = app_state.clone();
        let prometheus = prometheus.clone();
        let cors = Cors::default()
            .allowed_origin("http://localhost:5173")
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://localhost:8080")
            .allowed_origin("http://127.0.0.1:8080")
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus)
            .wrap(cors)
            .app_data(app_state)
            .configure(configure_api)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}
