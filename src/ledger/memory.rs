//! In-memory ledger.
//!
//! Backs tests and local runs without Postgres. A single mutex serializes
//! `record_many`, which gives the same per-user atomicity the Postgres
//! implementation gets from its transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use super::Ledger;
use crate::documents::models::{DocumentKind, DocumentRecord, NewDocument};
use crate::error::CoreError;
use crate::quota::QuotaGuard;
use crate::templates::TemplateRecord;
use crate::users::model::User;

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    documents: Vec<DocumentRecord>,
    templates: HashMap<Uuid, TemplateRecord>,
}

#[derive(Default)]
pub struct MemoryLedger {
    inner: Mutex<Inner>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: User) {
        self.inner.lock().users.insert(user.id, user);
    }

    pub fn insert_template(&self, template: TemplateRecord) {
        self.inner.lock().templates.insert(template.id, template);
    }

    /// Seed a pre-existing document with an explicit creation timestamp,
    /// bypassing quota. Test setup only.
    pub fn seed_document(&self, user_id: Uuid, kind: DocumentKind, created_at: DateTime<Utc>) {
        let mut inner = self.inner.lock();
        inner.documents.push(DocumentRecord {
            id: Uuid::new_v4(),
            user_id,
            kind,
            title: format!("seeded {kind}"),
            file_path: String::new(),
            file_type: "pdf".to_string(),
            template_used: None,
            payload: serde_json::Value::Null,
            created_at,
            download_count: 0,
        });
        if let Some(user) = inner.users.get_mut(&user_id) {
            user.documents_created += 1;
        }
    }

    /// Current lifetime counter for a user. Test assertions only.
    pub fn documents_created(&self, user_id: Uuid) -> i64 {
        self.inner
            .lock()
            .users
            .get(&user_id)
            .map(|user| user.documents_created)
            .unwrap_or(0)
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn get_user(&self, id: Uuid) -> Result<User, CoreError> {
        self.inner
            .lock()
            .users
            .get(&id)
            .filter(|user| user.is_active)
            .cloned()
            .ok_or(CoreError::NotFound)
    }

    async fn count_since(&self, user_id: Uuid, since: DateTime<Utc>) -> Result<i64, CoreError> {
        let inner = self.inner.lock();
        Ok(inner
            .documents
            .iter()
            .filter(|doc| doc.user_id == user_id && doc.created_at >= since)
            .count() as i64)
    }

    async fn record_many(
        &self,
        docs: Vec<NewDocument>,
        guard: &QuotaGuard,
    ) -> Result<Vec<DocumentRecord>, CoreError> {
        let Some(owner) = docs.first().map(|doc| doc.user_id) else {
            return Ok(Vec::new());
        };
        let mut inner = self.inner.lock();

        if !inner.users.contains_key(&owner) {
            return Err(CoreError::NotFound);
        }

        if let Some(limit) = guard.monthly_limit {
            let used = inner
                .documents
                .iter()
                .filter(|existing| {
                    existing.user_id == owner && existing.created_at >= guard.month_start
                })
                .count() as i64;
            if used + docs.len() as i64 > limit {
                return Err(CoreError::QuotaExceeded);
            }
        }

        let created_at = Utc::now();
        let mut records = Vec::with_capacity(docs.len());
        for doc in docs {
            let record = DocumentRecord {
                id: Uuid::new_v4(),
                user_id: doc.user_id,
                kind: doc.kind,
                title: doc.title,
                file_path: doc.file_path,
                file_type: doc.file_type,
                template_used: doc.template_used,
                payload: doc.payload,
                created_at,
                download_count: 0,
            };
            inner.documents.push(record.clone());
            records.push(record);
        }
        if let Some(user) = inner.users.get_mut(&owner) {
            user.documents_created += records.len() as i64;
        }
        Ok(records)
    }

    async fn list_for(&self, user_id: Uuid) -> Result<Vec<DocumentRecord>, CoreError> {
        let inner = self.inner.lock();
        let mut docs: Vec<DocumentRecord> = inner
            .documents
            .iter()
            .filter(|doc| doc.user_id == user_id)
            .cloned()
            .collect();
        docs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(docs)
    }

    async fn get_by_public_id(&self, id: Uuid, owner: Uuid) -> Result<DocumentRecord, CoreError> {
        self.inner
            .lock()
            .documents
            .iter()
            .find(|doc| doc.id == id && doc.user_id == owner)
            .cloned()
            .ok_or(CoreError::NotFound)
    }

    async fn increment_download(&self, id: Uuid) -> Result<(), CoreError> {
        let mut inner = self.inner.lock();
        let doc = inner
            .documents
            .iter_mut()
            .find(|doc| doc.id == id)
            .ok_or(CoreError::NotFound)?;
        doc.download_count += 1;
        Ok(())
    }

    async fn templates_for(&self, kind: DocumentKind) -> Result<Vec<TemplateRecord>, CoreError> {
        let inner = self.inner.lock();
        let mut templates: Vec<TemplateRecord> = inner
            .templates
            .values()
            .filter(|template| template.kind == kind && template.is_active)
            .cloned()
            .collect();
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(templates)
    }

    async fn get_template(&self, id: Uuid) -> Result<Option<TemplateRecord>, CoreError> {
        Ok(self.inner.lock().templates.get(&id).cloned())
    }
}
