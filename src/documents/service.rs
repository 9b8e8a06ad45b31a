//! Generation orchestration.
//!
//! Order per request: validate payload, quota pre-check, template
//! resolution, compose, write the artifact file, then `Ledger::record`
//! (which re-validates quota atomically). If the record fails, the written
//! file is removed so neither side observes a partial generation.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::composer::engine::PdfRenderer;
use crate::composer::{CertificateRequest, InvoiceRequest, QrRequest, ResumeRequest};
use crate::documents::models::{DocumentKind, DocumentRecord, NewDocument};
use crate::error::CoreError;
use crate::ledger::Ledger;
use crate::namer;
use crate::quota;
use crate::storage::FileStore;
use crate::templates::{self, TemplateRecord};
use crate::users::model::User;

#[derive(Clone)]
pub struct GenerationService {
    ledger: Arc<dyn Ledger>,
    renderer: Arc<dyn PdfRenderer>,
    files: FileStore,
}

impl GenerationService {
    pub fn new(ledger: Arc<dyn Ledger>, renderer: Arc<dyn PdfRenderer>, files: FileStore) -> Self {
        Self {
            ledger,
            renderer,
            files,
        }
    }

    async fn load_user(&self, user_id: Uuid) -> Result<User, CoreError> {
        self.ledger.get_user(user_id).await
    }

    /// Fast rejection before any composition work. The authoritative check
    /// runs again inside `Ledger::record`.
    async fn check_quota(&self, user: &User) -> Result<(), CoreError> {
        if quota::can_create(self.ledger.as_ref(), user, Utc::now()).await? {
            Ok(())
        } else {
            Err(CoreError::QuotaExceeded)
        }
    }

    /// Resolve a requested template: it must exist, be active, match the
    /// kind, and be plan-eligible.
    async fn resolve_template(
        &self,
        user: &User,
        template_id: Option<Uuid>,
        kind: DocumentKind,
    ) -> Result<Option<TemplateRecord>, CoreError> {
        let Some(id) = template_id else {
            return Ok(None);
        };
        let template = self.ledger.get_template(id).await?.ok_or(CoreError::NotFound)?;
        if !template.is_active || template.kind != kind {
            return Err(CoreError::Validation(format!(
                "Template '{}' is not available for {kind} documents",
                template.name
            )));
        }
        if template.is_premium && !user.is_premium(Utc::now()) {
            return Err(CoreError::PremiumRequired("This template"));
        }
        Ok(Some(template))
    }

    /// Write the artifact and record it; a record failure removes the file.
    async fn store_and_record(
        &self,
        user: &User,
        filename: &str,
        bytes: &[u8],
        mut doc: NewDocument,
    ) -> Result<DocumentRecord, CoreError> {
        let path = self.files.write(filename, bytes)?;
        doc.file_path = path.to_string_lossy().into_owned();

        let guard = quota::guard_for(user, Utc::now());
        match self.ledger.record(doc, &guard).await {
            Ok(record) => {
                log::info!(
                    "generated {} '{}' for user {}",
                    record.kind,
                    record.title,
                    user.id
                );
                Ok(record)
            }
            Err(err) => {
                self.files.remove(&path);
                Err(err)
            }
        }
    }

    pub async fn generate_invoice(
        &self,
        user_id: Uuid,
        request: InvoiceRequest,
    ) -> Result<DocumentRecord, CoreError> {
        request.validate()?;
        let user = self.load_user(user_id).await?;
        self.check_quota(&user).await?;
        let template = self
            .resolve_template(&user, request.template_id, DocumentKind::Invoice)
            .await?;

        let source = request.typst_source(templates::accent_for(template.as_ref()));
        let bytes = self.renderer.render(&source, "invoice")?;
        let filename = namer::name_for(DocumentKind::Invoice, &request.invoice_number, "pdf");

        let doc = NewDocument {
            user_id: user.id,
            kind: DocumentKind::Invoice,
            title: request.title(),
            file_path: String::new(),
            file_type: "pdf".to_string(),
            template_used: template.as_ref().map(|t| t.id),
            payload: payload_snapshot(&request)?,
        };
        self.store_and_record(&user, &filename, &bytes, doc).await
    }

    pub async fn generate_resume(
        &self,
        user_id: Uuid,
        request: ResumeRequest,
    ) -> Result<DocumentRecord, CoreError> {
        request.validate()?;
        let user = self.load_user(user_id).await?;
        self.check_quota(&user).await?;
        let template = self
            .resolve_template(&user, request.template_id, DocumentKind::Resume)
            .await?;

        let source = request.typst_source(templates::accent_for(template.as_ref()));
        let bytes = self.renderer.render(&source, "resume")?;
        let filename =
            namer::name_for(DocumentKind::Resume, &request.personal_info.full_name, "pdf");

        let doc = NewDocument {
            user_id: user.id,
            kind: DocumentKind::Resume,
            title: request.title(),
            file_path: String::new(),
            file_type: "pdf".to_string(),
            template_used: template.as_ref().map(|t| t.id),
            payload: payload_snapshot(&request)?,
        };
        self.store_and_record(&user, &filename, &bytes, doc).await
    }

    /// Certificate generation. Bulk mode is rejected for non-premium users
    /// before any composition; each generated artifact consumes one quota
    /// unit and gets its own payload snapshot with the recipient pinned.
    /// The whole batch is recorded in one ledger unit: a failure anywhere
    /// removes every staged file and leaves no rows or quota consumption.
    pub async fn generate_certificates(
        &self,
        user_id: Uuid,
        request: CertificateRequest,
    ) -> Result<Vec<DocumentRecord>, CoreError> {
        request.validate()?;
        let user = self.load_user(user_id).await?;
        if request.bulk_mode && !user.is_premium(Utc::now()) {
            return Err(CoreError::PremiumRequired("Bulk certificate generation"));
        }
        self.check_quota(&user).await?;
        let template = self
            .resolve_template(&user, request.template_id, DocumentKind::Certificate)
            .await?;
        let accent = templates::accent_for(template.as_ref());

        let mut staged: Vec<PathBuf> = Vec::new();
        let mut docs = Vec::new();
        for recipient in request.recipients() {
            let result = self
                .stage_certificate(&user, &request, &recipient, accent, template.as_ref())
                .map(|(path, doc)| {
                    staged.push(path);
                    docs.push(doc);
                });
            if let Err(err) = result {
                self.discard(&staged);
                return Err(err);
            }
        }

        let guard = quota::guard_for(&user, Utc::now());
        match self.ledger.record_many(docs, &guard).await {
            Ok(records) => {
                log::info!(
                    "generated {} certificate(s) for user {}",
                    records.len(),
                    user.id
                );
                Ok(records)
            }
            Err(err) => {
                self.discard(&staged);
                Err(err)
            }
        }
    }

    /// Render and write one certificate artifact; returns the written path
    /// and the row to record.
    fn stage_certificate(
        &self,
        user: &User,
        request: &CertificateRequest,
        recipient: &str,
        accent: &str,
        template: Option<&TemplateRecord>,
    ) -> Result<(PathBuf, NewDocument), CoreError> {
        let payload = payload_snapshot(&request.for_recipient(recipient))?;
        let source = request.typst_source(recipient, accent);
        let bytes = self.renderer.render(&source, "certificate")?;
        let filename = namer::name_for(DocumentKind::Certificate, recipient, "pdf");
        let path = self.files.write(&filename, &bytes)?;

        let doc = NewDocument {
            user_id: user.id,
            kind: DocumentKind::Certificate,
            title: CertificateRequest::title_for(recipient),
            file_path: path.to_string_lossy().into_owned(),
            file_type: "pdf".to_string(),
            template_used: template.map(|t| t.id),
            payload,
        };
        Ok((path, doc))
    }

    fn discard(&self, paths: &[PathBuf]) {
        for path in paths {
            self.files.remove(path);
        }
    }

    pub async fn generate_qrcode(
        &self,
        user_id: Uuid,
        request: QrRequest,
    ) -> Result<DocumentRecord, CoreError> {
        request.validate()?;
        let user = self.load_user(user_id).await?;
        self.check_quota(&user).await?;

        let bytes = request.render()?;
        let ext = request.format.ext();
        let filename = namer::name_for(DocumentKind::Qrcode, "", ext);

        // Snapshot includes the derived content so the artifact can be
        // audited without re-running the derivation.
        let mut payload = payload_snapshot(&request)?;
        if let Some(map) = payload.as_object_mut() {
            map.insert(
                "content".to_string(),
                serde_json::Value::String(request.content()),
            );
        }

        let doc = NewDocument {
            user_id: user.id,
            kind: DocumentKind::Qrcode,
            title: request.title(),
            file_path: String::new(),
            file_type: ext.to_string(),
            template_used: None,
            payload,
        };
        self.store_and_record(&user, &filename, &bytes, doc).await
    }
}

fn payload_snapshot<T: serde::Serialize>(request: &T) -> Result<serde_json::Value, CoreError> {
    serde_json::to_value(request)
        .map_err(|err| CoreError::Internal(format!("payload serialization failed: {err}")))
}
