//! PostgreSQL ledger.
//!
//! `record_many` takes a row lock on the owner (`SELECT .. FOR UPDATE`),
//! re-runs the month count under that lock, then inserts the whole batch and
//! bumps the lifetime counter in the same transaction. Dropping the
//! transaction on any error rolls everything back, so no partial rows or
//! orphaned counter increments can persist.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::Ledger;
use crate::documents::models::{DocumentKind, DocumentRecord, NewDocument};
use crate::error::CoreError;
use crate::quota::QuotaGuard;
use crate::templates::TemplateRecord;
use crate::users::model::{SubscriptionPlan, User};

pub struct PgLedger {
    pool: PgPool,
}

impl PgLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    full_name: String,
    subscription_plan: String,
    subscription_expires: Option<DateTime<Utc>>,
    is_active: bool,
    documents_created: i64,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            plan: SubscriptionPlan::parse(&row.subscription_plan),
            subscription_expires: row.subscription_expires,
            is_active: row.is_active,
            documents_created: row.documents_created,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: Uuid,
    user_id: Uuid,
    kind: String,
    title: String,
    file_path: String,
    file_type: String,
    template_used: Option<Uuid>,
    payload: serde_json::Value,
    created_at: DateTime<Utc>,
    download_count: i64,
}

impl TryFrom<DocumentRow> for DocumentRecord {
    type Error = CoreError;

    fn try_from(row: DocumentRow) -> Result<Self, CoreError> {
        Ok(DocumentRecord {
            id: row.id,
            user_id: row.user_id,
            kind: DocumentKind::parse(&row.kind).map_err(CoreError::Internal)?,
            title: row.title,
            file_path: row.file_path,
            file_type: row.file_type,
            template_used: row.template_used,
            payload: row.payload,
            created_at: row.created_at,
            download_count: row.download_count,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TemplateRow {
    id: Uuid,
    name: String,
    kind: String,
    is_premium: bool,
    is_active: bool,
}

impl TryFrom<TemplateRow> for TemplateRecord {
    type Error = CoreError;

    fn try_from(row: TemplateRow) -> Result<Self, CoreError> {
        Ok(TemplateRecord {
            id: row.id,
            name: row.name,
            kind: DocumentKind::parse(&row.kind).map_err(CoreError::Internal)?,
            is_premium: row.is_premium,
            is_active: row.is_active,
        })
    }
}

const DOCUMENT_COLUMNS: &str =
    "id, user_id, kind, title, file_path, file_type, template_used, payload, created_at, download_count";

#[async_trait]
impl Ledger for PgLedger {
    async fn get_user(&self, id: Uuid) -> Result<User, CoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, full_name, subscription_plan, subscription_expires, is_active, \
             documents_created, created_at FROM users WHERE id = $1 AND is_active",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::from).ok_or(CoreError::NotFound)
    }

    async fn count_since(&self, user_id: Uuid, since: DateTime<Utc>) -> Result<i64, CoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM documents WHERE user_id = $1 AND created_at >= $2",
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn record_many(
        &self,
        docs: Vec<NewDocument>,
        guard: &QuotaGuard,
    ) -> Result<Vec<DocumentRecord>, CoreError> {
        let Some(owner) = docs.first().map(|doc| doc.user_id) else {
            return Ok(Vec::new());
        };
        let mut tx = self.pool.begin().await?;

        // Serialize concurrent generations for this user.
        let locked: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM users WHERE id = $1 AND is_active FOR UPDATE")
                .bind(owner)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(CoreError::NotFound);
        }

        if let Some(limit) = guard.monthly_limit {
            let used: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM documents WHERE user_id = $1 AND created_at >= $2",
            )
            .bind(owner)
            .bind(guard.month_start)
            .fetch_one(&mut *tx)
            .await?;
            if used + docs.len() as i64 > limit {
                // Dropping tx rolls the lock back.
                return Err(CoreError::QuotaExceeded);
            }
        }

        let created_at = Utc::now();
        let mut records = Vec::with_capacity(docs.len());
        for doc in docs {
            let id = Uuid::new_v4();
            sqlx::query(
                "INSERT INTO documents \
                 (id, user_id, kind, title, file_path, file_type, template_used, payload, created_at, download_count) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 0)",
            )
            .bind(id)
            .bind(doc.user_id)
            .bind(doc.kind.as_str())
            .bind(&doc.title)
            .bind(&doc.file_path)
            .bind(&doc.file_type)
            .bind(doc.template_used)
            .bind(&doc.payload)
            .bind(created_at)
            .execute(&mut *tx)
            .await?;

            records.push(DocumentRecord {
                id,
                user_id: doc.user_id,
                kind: doc.kind,
                title: doc.title,
                file_path: doc.file_path,
                file_type: doc.file_type,
                template_used: doc.template_used,
                payload: doc.payload,
                created_at,
                download_count: 0,
            });
        }

        sqlx::query("UPDATE users SET documents_created = documents_created + $2 WHERE id = $1")
            .bind(owner)
            .bind(records.len() as i64)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(records)
    }

    async fn list_for(&self, user_id: Uuid) -> Result<Vec<DocumentRecord>, CoreError> {
        let rows = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE user_id = $1 ORDER BY created_at DESC",
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DocumentRecord::try_from).collect()
    }

    async fn get_by_public_id(&self, id: Uuid, owner: Uuid) -> Result<DocumentRecord, CoreError> {
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1 AND user_id = $2",
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        row.map(DocumentRecord::try_from)
            .transpose()?
            .ok_or(CoreError::NotFound)
    }

    async fn increment_download(&self, id: Uuid) -> Result<(), CoreError> {
        let result =
            sqlx::query("UPDATE documents SET download_count = download_count + 1 WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound);
        }
        Ok(())
    }

    async fn templates_for(&self, kind: DocumentKind) -> Result<Vec<TemplateRecord>, CoreError> {
        let rows = sqlx::query_as::<_, TemplateRow>(
            "SELECT id, name, kind, is_premium, is_active FROM templates \
             WHERE kind = $1 AND is_active ORDER BY name",
        )
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TemplateRecord::try_from).collect()
    }

    async fn get_template(&self, id: Uuid) -> Result<Option<TemplateRecord>, CoreError> {
        let row = sqlx::query_as::<_, TemplateRow>(
            "SELECT id, name, kind, is_premium, is_active FROM templates WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TemplateRecord::try_from).transpose()
    }
}
