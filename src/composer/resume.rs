//! Resume composition. Sections render in a fixed order and only when the
//! corresponding payload section is non-empty; no empty headers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::escape_typst_string;
use super::validation::{validate_email, validate_required, ValidationErrors};
use crate::error::CoreError;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub portfolio: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExperienceEntry {
    pub position: String,
    pub company: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EducationEntry {
    pub degree: String,
    pub institution: String,
    pub year: String,
    #[serde(default)]
    pub gpa: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SkillEntry {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectEntry {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub technologies: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CertificationEntry {
    pub name: String,
    pub issuer: String,
    pub year: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResumeRequest {
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub skills: Vec<SkillEntry>,
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
    #[serde(default)]
    pub certifications: Vec<CertificationEntry>,
    #[serde(default)]
    pub template_id: Option<Uuid>,
}

impl ResumeRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut errors = ValidationErrors::new();
        let info = &self.personal_info;
        validate_required(&info.full_name, "personal_info.full_name", "Full name", &mut errors);
        validate_email(&info.email, "personal_info.email", &mut errors);
        validate_required(&info.phone, "personal_info.phone", "Phone", &mut errors);
        validate_required(&info.address, "personal_info.address", "Address", &mut errors);
        errors.into_result()
    }

    pub fn title(&self) -> String {
        format!("Resume - {}", self.personal_info.full_name)
    }

    fn summary_text(&self) -> Option<&str> {
        self.summary
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    pub fn typst_source(&self, accent: &str) -> String {
        let info = &self.personal_info;

        let mut contact = format!(
            "{} | {}",
            escape_typst_string(&info.email),
            escape_typst_string(&info.phone)
        );
        if let Some(linkedin) = info.linkedin.as_deref().filter(|s| !s.trim().is_empty()) {
            contact.push_str(&format!(" | LinkedIn: {}", escape_typst_string(linkedin)));
        }
        if let Some(portfolio) = info.portfolio.as_deref().filter(|s| !s.trim().is_empty()) {
            contact.push_str(&format!(" | Portfolio: {}", escape_typst_string(portfolio)));
        }

        let mut body = format!(
            r#"#set page(paper: "a4", margin: 2cm)
#set text(10pt)
#show heading.where(level: 2): set text(fill: rgb("{accent}"))

#align(center)[#text(20pt, weight: "bold")[{name}]]
#align(center)[{contact}]
#align(center)[{address}]
#v(1em)
"#,
            accent = accent,
            name = escape_typst_string(&info.full_name),
            contact = contact,
            address = escape_typst_string(&info.address),
        );

        if let Some(summary) = self.summary_text() {
            body.push_str(&format!(
                "== PROFESSIONAL SUMMARY\n{}\n\n",
                escape_typst_string(summary)
            ));
        }

        if !self.experience.is_empty() {
            body.push_str("== WORK EXPERIENCE\n");
            for exp in &self.experience {
                body.push_str(&format!(
                    "*{}* - {} \\\n{} - {} \\\n{}\n\n",
                    escape_typst_string(&exp.position),
                    escape_typst_string(&exp.company),
                    escape_typst_string(&exp.start_date),
                    escape_typst_string(&exp.end_date),
                    escape_typst_string(&exp.description),
                ));
            }
        }

        if !self.education.is_empty() {
            body.push_str("== EDUCATION\n");
            for edu in &self.education {
                let gpa = edu.gpa.as_deref().unwrap_or("N/A");
                body.push_str(&format!(
                    "*{}* - {} \\\n{} | GPA: {}\n\n",
                    escape_typst_string(&edu.degree),
                    escape_typst_string(&edu.institution),
                    escape_typst_string(&edu.year),
                    escape_typst_string(gpa),
                ));
            }
        }

        if !self.skills.is_empty() {
            let skills = self
                .skills
                .iter()
                .map(|skill| escape_typst_string(&skill.name))
                .collect::<Vec<_>>()
                .join(", ");
            body.push_str(&format!("== SKILLS\n{skills}\n\n"));
        }

        if !self.projects.is_empty() {
            body.push_str("== PROJECTS\n");
            for project in &self.projects {
                body.push_str(&format!(
                    "*{}* \\\n{}\n",
                    escape_typst_string(&project.name),
                    escape_typst_string(&project.description),
                ));
                if let Some(tech) = project.technologies.as_deref().filter(|s| !s.is_empty()) {
                    body.push_str(&format!("Technologies: {}\n", escape_typst_string(tech)));
                }
                body.push('\n');
            }
        }

        if !self.certifications.is_empty() {
            body.push_str("== CERTIFICATIONS\n");
            for cert in &self.certifications {
                body.push_str(&format!(
                    "- {} - {} ({})\n",
                    escape_typst_string(&cert.name),
                    escape_typst_string(&cert.issuer),
                    escape_typst_string(&cert.year),
                ));
            }
        }

        body
    }
}
