//! Certificate composition.
//!
//! Single mode produces one artifact. Bulk mode is premium-gated (checked by
//! the service before any composition) and fans out to one artifact per
//! non-blank recipient; blank or whitespace-only names are skipped.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::escape_typst_string;
use super::validation::{validate_required, ValidationError, ValidationErrors};
use crate::error::CoreError;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CertificateRequest {
    #[serde(default)]
    pub recipient_name: String,
    pub course_name: String,
    pub completion_date: String,
    pub instructor_name: String,
    pub organization: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub template_id: Option<Uuid>,
    #[serde(default)]
    pub bulk_mode: bool,
    #[serde(default)]
    pub bulk_names: Vec<String>,
}

impl CertificateRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut errors = ValidationErrors::new();

        validate_required(&self.course_name, "course_name", "Course name", &mut errors);
        validate_required(
            &self.completion_date,
            "completion_date",
            "Completion date",
            &mut errors,
        );
        validate_required(
            &self.instructor_name,
            "instructor_name",
            "Instructor name",
            &mut errors,
        );
        validate_required(&self.organization, "organization", "Organization", &mut errors);

        if self.bulk_mode {
            if self.recipients().is_empty() {
                errors.add(ValidationError::new(
                    "bulk_names",
                    "Bulk mode needs at least one non-blank recipient name",
                ));
            }
        } else {
            validate_required(
                &self.recipient_name,
                "recipient_name",
                "Recipient name",
                &mut errors,
            );
        }

        errors.into_result()
    }

    /// Recipients to generate for: the bulk list with blank entries skipped,
    /// or the single recipient.
    pub fn recipients(&self) -> Vec<String> {
        if self.bulk_mode {
            self.bulk_names
                .iter()
                .map(|name| name.trim())
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect()
        } else {
            vec![self.recipient_name.trim().to_string()]
        }
    }

    /// Payload snapshot for one generated artifact: the shared fields with
    /// the concrete recipient substituted in.
    pub fn for_recipient(&self, recipient: &str) -> CertificateRequest {
        CertificateRequest {
            recipient_name: recipient.to_string(),
            bulk_mode: false,
            bulk_names: Vec::new(),
            ..self.clone()
        }
    }

    pub fn title_for(recipient: &str) -> String {
        format!("Certificate - {recipient}")
    }

    pub fn typst_source(&self, recipient: &str, accent: &str) -> String {
        let description_block = match self.description.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => {
                format!("\n#align(center)[{}]\n", escape_typst_string(text))
            }
            _ => String::new(),
        };

        format!(
            r#"#set page(paper: "a4", flipped: true, margin: 1.5cm)
#set text(12pt)

#rect(width: 100%, height: 100%, stroke: 3pt + rgb("{accent}"), inset: 1cm)[
  #align(center)[#text(30pt, weight: "bold", fill: rgb("{accent}"))[CERTIFICATE OF COMPLETION]]
  #v(2em)
  #align(center)[This is to certify that]
  #v(1em)
  #align(center)[#text(24pt, weight: "bold")[{recipient}]]
  #align(center)[#line(length: 40%)]
  #v(1em)
  #align(center)[has successfully completed the course]
  #v(1em)
  #align(center)[#text(18pt, weight: "bold")[{course}]]
  {description_block}
  #v(3em)
  #grid(
    columns: (1fr, 1fr),
    [
      Date: {completion_date} \
      Organization: {organization}
    ],
    [
      Instructor: {instructor} \
      #line(length: 60%) \
      Signature
    ],
  )
]
"#,
            accent = accent,
            recipient = escape_typst_string(recipient),
            course = escape_typst_string(&self.course_name),
            description_block = description_block,
            completion_date = escape_typst_string(&self.completion_date),
            organization = escape_typst_string(&self.organization),
            instructor = escape_typst_string(&self.instructor_name),
        )
    }
}
