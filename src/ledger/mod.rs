//! Document ledger - metadata for every generated artifact.
//!
//! `record_many` is the single write path and carries the quota guard: the
//! count re-check, the row inserts and the owner's counter increment happen
//! as one atomic unit, so two concurrent requests can never double-spend the
//! last free-tier slot and a bulk request commits entirely or not at all.
//! Lookups are ownership-scoped.

pub mod memory;
pub mod pg;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::documents::models::{DocumentKind, DocumentRecord, NewDocument};
use crate::error::CoreError;
use crate::quota::QuotaGuard;
use crate::templates::TemplateRecord;
use crate::users::model::User;

pub use memory::MemoryLedger;
pub use pg::PgLedger;

#[async_trait]
pub trait Ledger: Send + Sync {
    /// Load a user; `NotFound` if missing or deactivated.
    async fn get_user(&self, id: Uuid) -> Result<User, CoreError>;

    /// Number of documents the user created at or after `since`.
    async fn count_since(&self, user_id: Uuid, since: DateTime<Utc>) -> Result<i64, CoreError>;

    /// Persist a batch of artifact rows for one owner and advance the
    /// owner's lifetime counter by the batch size, re-validating `guard`
    /// against the whole batch inside the same atomic unit. Fails with
    /// `QuotaExceeded` when the batch no longer fits at commit time; on any
    /// failure no row and no counter increment persists.
    async fn record_many(
        &self,
        docs: Vec<NewDocument>,
        guard: &QuotaGuard,
    ) -> Result<Vec<DocumentRecord>, CoreError>;

    /// Single-row convenience over [`Ledger::record_many`].
    async fn record(
        &self,
        doc: NewDocument,
        guard: &QuotaGuard,
    ) -> Result<DocumentRecord, CoreError> {
        let mut records = self.record_many(vec![doc], guard).await?;
        records
            .pop()
            .ok_or_else(|| CoreError::Internal("recorded batch came back empty".to_string()))
    }

    /// The owner's documents, most recent first.
    async fn list_for(&self, user_id: Uuid) -> Result<Vec<DocumentRecord>, CoreError>;

    /// Ownership-scoped lookup: a valid id belonging to a different owner is
    /// `NotFound`, not the record.
    async fn get_by_public_id(&self, id: Uuid, owner: Uuid) -> Result<DocumentRecord, CoreError>;

    /// Bump the download counter; never touches quota.
    async fn increment_download(&self, id: Uuid) -> Result<(), CoreError>;

    /// Active templates for a kind.
    async fn templates_for(&self, kind: DocumentKind) -> Result<Vec<TemplateRecord>, CoreError>;

    async fn get_template(&self, id: Uuid) -> Result<Option<TemplateRecord>, CoreError>;
}
