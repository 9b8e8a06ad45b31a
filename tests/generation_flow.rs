//! End-to-end generation flows against the in-memory ledger.

mod common;

use std::sync::Arc;

use docuforge_server::composer::engine::PdfRenderer;
use docuforge_server::composer::{CertificateRequest, QrErrorCorrection, QrFormat, QrPayload, QrRequest};
use docuforge_server::db::AppState;
use docuforge_server::documents::DocumentKind;
use docuforge_server::error::CoreError;
use docuforge_server::ledger::{Ledger, MemoryLedger};
use docuforge_server::storage::FileStore;

use common::{artifact_count, free_user, harness, invoice_request, premium_user, template};

fn certificate_request(bulk_names: Vec<&str>) -> CertificateRequest {
    CertificateRequest {
        recipient_name: String::new(),
        course_name: "Rust Fundamentals".to_string(),
        completion_date: "2025-08-20".to_string(),
        instructor_name: "Dr. Ferris".to_string(),
        organization: "DocuForge Academy".to_string(),
        description: None,
        template_id: None,
        bulk_mode: true,
        bulk_names: bulk_names.into_iter().map(str::to_string).collect(),
    }
}

#[actix_web::test]
async fn test_free_user_hits_monthly_limit_on_sixth_document() {
    let h = harness();
    let user = free_user();
    h.ledger.insert_user(user.clone());

    for i in 0..5 {
        let record = h
            .state
            .service
            .generate_invoice(user.id, invoice_request(&format!("INV-{i}")))
            .await
            .expect("within limit");
        assert_eq!(record.kind, DocumentKind::Invoice);
    }

    let err = h
        .state
        .service
        .generate_invoice(user.id, invoice_request("INV-5"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::QuotaExceeded));

    assert_eq!(h.ledger.documents_created(user.id), 5);
    assert_eq!(artifact_count(&h.generated), 5);
}

#[actix_web::test]
async fn test_concurrent_requests_cannot_overdraw_the_last_slot() {
    let h = harness();
    let user = free_user();
    h.ledger.insert_user(user.clone());
    let now = chrono::Utc::now();
    for _ in 0..4 {
        h.ledger.seed_document(user.id, DocumentKind::Invoice, now);
    }

    let (a, b) = tokio::join!(
        h.state.service.generate_invoice(user.id, invoice_request("INV-A")),
        h.state.service.generate_invoice(user.id, invoice_request("INV-B")),
    );

    // One wins the remaining slot, the other is refused and its file removed.
    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    let err = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
    assert!(matches!(err, CoreError::QuotaExceeded));
    assert_eq!(h.ledger.documents_created(user.id), 5);
    assert_eq!(artifact_count(&h.generated), 1);
}

#[actix_web::test]
async fn test_bulk_certificates_skip_blank_names_and_charge_per_artifact() {
    let h = harness();
    let user = premium_user();
    h.ledger.insert_user(user.clone());

    let records = h
        .state
        .service
        .generate_certificates(user.id, certificate_request(vec!["Alice", "", "  ", "Bob"]))
        .await
        .expect("bulk generation");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].title, "Certificate - Alice");
    assert_eq!(records[1].title, "Certificate - Bob");
    assert_eq!(h.ledger.documents_created(user.id), 2);
    assert_eq!(artifact_count(&h.generated), 2);
}

#[actix_web::test]
async fn test_bulk_failure_leaves_no_rows_files_or_quota() {
    // Renders fine for the first recipient, fails for the second.
    struct FailingRenderer;
    impl PdfRenderer for FailingRenderer {
        fn render(&self, source: &str, _job_name: &str) -> Result<Vec<u8>, CoreError> {
            if source.contains("Bob") {
                Err(CoreError::Render("missing glyph".to_string()))
            } else {
                Ok(b"%PDF-stub".to_vec())
            }
        }
    }

    let ledger = Arc::new(MemoryLedger::new());
    let generated = tempfile::TempDir::new().expect("temp dir");
    let state = AppState::with_parts(
        ledger.clone(),
        Arc::new(FailingRenderer),
        FileStore::new(generated.path()),
    );
    let user = premium_user();
    ledger.insert_user(user.clone());

    let err = state
        .service
        .generate_certificates(user.id, certificate_request(vec!["Alice", "Bob", "Cara"]))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Render(_)));

    // Alice's staged artifact is removed and nothing reached the ledger.
    assert_eq!(ledger.documents_created(user.id), 0);
    assert!(ledger.list_for(user.id).await.unwrap().is_empty());
    assert_eq!(
        std::fs::read_dir(generated.path()).expect("generated dir").count(),
        0
    );
}

#[actix_web::test]
async fn test_bulk_mode_requires_premium() {
    let h = harness();
    let user = free_user();
    h.ledger.insert_user(user.clone());

    let err = h
        .state
        .service
        .generate_certificates(user.id, certificate_request(vec!["Alice"]))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::PremiumRequired(_)));
    assert_eq!(h.ledger.documents_created(user.id), 0);
    assert_eq!(artifact_count(&h.generated), 0);
}

#[actix_web::test]
async fn test_premium_template_is_refused_for_free_plan() {
    let h = harness();
    let user = free_user();
    h.ledger.insert_user(user.clone());
    let tmpl = template(DocumentKind::Invoice, true);
    h.ledger.insert_template(tmpl.clone());

    let mut request = invoice_request("INV-T");
    request.template_id = Some(tmpl.id);
    let err = h
        .state
        .service
        .generate_invoice(user.id, request)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::PremiumRequired(_)));
}

#[actix_web::test]
async fn test_template_kind_mismatch_is_a_validation_error() {
    let h = harness();
    let user = premium_user();
    h.ledger.insert_user(user.clone());
    let tmpl = template(DocumentKind::Resume, false);
    h.ledger.insert_template(tmpl.clone());

    let mut request = invoice_request("INV-K");
    request.template_id = Some(tmpl.id);
    let err = h
        .state
        .service
        .generate_invoice(user.id, request)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}

#[actix_web::test]
async fn test_qr_generation_stores_derived_content_in_payload() {
    let h = harness();
    let user = free_user();
    h.ledger.insert_user(user.clone());

    let request = QrRequest {
        payload: QrPayload::Wifi {
            security: "WPA".to_string(),
            ssid: "HomeNet".to_string(),
            password: "hunter2".to_string(),
        },
        size: 256,
        format: QrFormat::Png,
        error_correction: QrErrorCorrection::M,
    };

    let record = h
        .state
        .service
        .generate_qrcode(user.id, request)
        .await
        .expect("qr generation");

    assert_eq!(record.kind, DocumentKind::Qrcode);
    assert_eq!(record.file_type, "png");
    assert_eq!(
        record.payload.get("content").and_then(|v| v.as_str()),
        Some("WIFI:T:WPA;S:HomeNet;P:hunter2;;")
    );
    assert!(record.file_path.ends_with(".png"));
    assert_eq!(h.ledger.documents_created(user.id), 1);
}
