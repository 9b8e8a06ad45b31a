use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// The four document kinds the composer knows how to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Invoice,
    Resume,
    Certificate,
    Qrcode,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "invoice",
            DocumentKind::Resume => "resume",
            DocumentKind::Certificate => "certificate",
            DocumentKind::Qrcode => "qrcode",
        }
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "invoice" => Ok(DocumentKind::Invoice),
            "resume" => Ok(DocumentKind::Resume),
            "certificate" => Ok(DocumentKind::Certificate),
            "qrcode" => Ok(DocumentKind::Qrcode),
            other => Err(format!("unknown document kind '{other}'")),
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ledger entity for a generated artifact. Created atomically with the
/// owner's counter increment; only the download counter mutates afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: DocumentKind,
    pub title: String,
    pub file_path: String,
    pub file_type: String,
    pub template_used: Option<Uuid>,
    /// Serialized copy of the originating payload, kept for audit and
    /// regeneration.
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub download_count: i64,
}

/// Row to insert; the ledger assigns id and creation timestamp.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub user_id: Uuid,
    pub kind: DocumentKind,
    pub title: String,
    pub file_path: String,
    pub file_type: String,
    pub template_used: Option<Uuid>,
    pub payload: serde_json::Value,
}

/// Listing entry for the owner's dashboard.
#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub kind: DocumentKind,
    pub title: String,
    pub file_type: String,
    pub template_used: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub download_count: i64,
    pub download_url: String,
}

impl From<DocumentRecord> for DocumentSummary {
    fn from(record: DocumentRecord) -> Self {
        Self {
            id: record.id,
            kind: record.kind,
            title: record.title,
            file_type: record.file_type,
            template_used: record.template_used,
            created_at: record.created_at,
            download_count: record.download_count,
            download_url: download_url(record.id),
        }
    }
}

pub fn download_url(id: Uuid) -> String {
    format!("/api/documents/{id}/download")
}

/// Response for single-artifact generation.
#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateResponse {
    pub success: bool,
    pub message: String,
    pub document_id: Uuid,
    pub download_url: String,
}

impl GenerateResponse {
    pub fn for_record(record: &DocumentRecord, message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            document_id: record.id,
            download_url: download_url(record.id),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GeneratedFile {
    pub name: String,
    pub document_id: Uuid,
    pub download_url: String,
}

/// Response for certificate generation, which may fan out to several
/// artifacts in bulk mode.
#[derive(Debug, Serialize, ToSchema)]
pub struct BulkGenerateResponse {
    pub success: bool,
    pub message: String,
    pub count: usize,
    pub files: Vec<GeneratedFile>,
}

impl BulkGenerateResponse {
    pub fn for_records(records: &[DocumentRecord], message: &str) -> Self {
        let files = records
            .iter()
            .map(|record| GeneratedFile {
                name: record.title.clone(),
                document_id: record.id,
                download_url: download_url(record.id),
            })
            .collect::<Vec<_>>();
        Self {
            success: true,
            message: message.to_string(),
            count: files.len(),
            files,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            DocumentKind::Invoice,
            DocumentKind::Resume,
            DocumentKind::Certificate,
            DocumentKind::Qrcode,
        ] {
            assert_eq!(DocumentKind::parse(kind.as_str()), Ok(kind));
        }
        assert!(DocumentKind::parse("report").is_err());
    }

    #[test]
    fn test_download_url_shape() {
        let id = Uuid::new_v4();
        assert_eq!(download_url(id), format!("/api/documents/{id}/download"));
    }
}
