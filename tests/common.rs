//! Shared fixtures for the integration suites.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use tempfile::TempDir;
use uuid::Uuid;

use docuforge_server::composer::engine::PdfRenderer;
use docuforge_server::composer::{InvoiceItem, InvoiceRequest};
use docuforge_server::db::AppState;
use docuforge_server::error::CoreError;
use docuforge_server::ledger::MemoryLedger;
use docuforge_server::storage::FileStore;
use docuforge_server::templates::TemplateRecord;
use docuforge_server::users::model::{SubscriptionPlan, User};

/// Renderer stub so the suites run without the Typst binary.
pub struct StubRenderer;

impl PdfRenderer for StubRenderer {
    fn render(&self, source: &str, _job_name: &str) -> Result<Vec<u8>, CoreError> {
        Ok(format!("%PDF-stub\n{}", source.len()).into_bytes())
    }
}

pub struct Harness {
    pub state: AppState,
    pub ledger: Arc<MemoryLedger>,
    pub generated: TempDir,
}

pub fn harness() -> Harness {
    let ledger = Arc::new(MemoryLedger::new());
    let generated = TempDir::new().expect("temp dir");
    let state = AppState::with_parts(
        ledger.clone(),
        Arc::new(StubRenderer),
        FileStore::new(generated.path()),
    );
    Harness {
        state,
        ledger,
        generated,
    }
}

pub fn free_user() -> User {
    User {
        id: Uuid::new_v4(),
        email: "free@example.com".to_string(),
        full_name: "Free User".to_string(),
        plan: SubscriptionPlan::Free,
        subscription_expires: None,
        is_active: true,
        documents_created: 0,
        created_at: Utc::now(),
    }
}

pub fn premium_user() -> User {
    User {
        id: Uuid::new_v4(),
        email: "premium@example.com".to_string(),
        full_name: "Premium User".to_string(),
        plan: SubscriptionPlan::Premium,
        subscription_expires: Some(Utc::now() + Duration::days(30)),
        is_active: true,
        documents_created: 0,
        created_at: Utc::now(),
    }
}

pub fn template(kind: docuforge_server::documents::DocumentKind, premium: bool) -> TemplateRecord {
    TemplateRecord {
        id: Uuid::new_v4(),
        name: if premium { "Executive" } else { "Classic" }.to_string(),
        kind,
        is_premium: premium,
        is_active: true,
    }
}

pub fn invoice_request(number: &str) -> InvoiceRequest {
    InvoiceRequest {
        company_name: "Acme Ltd".to_string(),
        company_address: "1 Factory Rd".to_string(),
        company_email: "billing@acme.example".to_string(),
        company_phone: "+1 555 0100".to_string(),
        client_name: "Jane Doe".to_string(),
        client_address: "2 Client St".to_string(),
        client_email: "jane@client.example".to_string(),
        invoice_number: number.to_string(),
        invoice_date: "2025-08-01".to_string(),
        due_date: "2025-08-15".to_string(),
        items: vec![InvoiceItem {
            description: "Consulting".to_string(),
            quantity: 2.0,
            rate: 100.0,
        }],
        tax_rate: 5.0,
        discount: 10.0,
        notes: String::new(),
        template_id: None,
    }
}

pub fn artifact_count(dir: &TempDir) -> usize {
    std::fs::read_dir(dir.path())
        .expect("read generated dir")
        .count()
}
