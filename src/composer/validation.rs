//! Input validation for document payloads.
//!
//! Validation errors carry the offending field and a suggestion so API
//! clients can surface actionable messages.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::CoreError;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid");
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn empty_field(field: &str, label: &str) -> Self {
        Self::new(field, format!("{label} must not be empty"))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {suggestion}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn to_message(&self) -> String {
        let mut parts = vec![format!("Validation failed: {} error(s)", self.errors.len())];
        for (i, error) in self.errors.iter().enumerate() {
            parts.push(format!("{}. {}", i + 1, error));
        }
        parts.join("\n")
    }

    pub fn into_result(self) -> Result<(), CoreError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(self.to_message()))
        }
    }
}

pub fn validate_required(value: &str, field: &str, label: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(ValidationError::empty_field(field, label));
    }
}

pub fn validate_email(value: &str, field: &str, errors: &mut ValidationErrors) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(ValidationError::empty_field(field, "Email"));
        return;
    }
    if !EMAIL_RE.is_match(trimmed) {
        errors.add(
            ValidationError::new(field, format!("'{trimmed}' is not a valid email address"))
                .with_suggestion("Use the form name@example.com".to_string()),
        );
    }
}

pub fn validate_non_negative(value: f64, field: &str, label: &str, errors: &mut ValidationErrors) {
    if !value.is_finite() || value < 0.0 {
        errors.add(ValidationError::new(
            field,
            format!("{label} must be a non-negative number"),
        ));
    }
}

pub fn validate_positive(value: f64, field: &str, label: &str, errors: &mut ValidationErrors) {
    if !value.is_finite() || value <= 0.0 {
        errors.add(ValidationError::new(
            field,
            format!("{label} must be greater than zero"),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_collection_is_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_message_lists_all_errors() {
        let mut errors = ValidationErrors::new();
        validate_required("", "client_name", "Client name", &mut errors);
        validate_email("not-an-email", "client_email", &mut errors);
        validate_non_negative(-1.0, "tax_rate", "Tax rate", &mut errors);

        let err = errors.into_result().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("3 error(s)"));
        assert!(message.contains("[client_name]"));
        assert!(message.contains("[client_email]"));
        assert!(message.contains("[tax_rate]"));
    }

    #[test]
    fn test_email_accepts_plain_addresses() {
        let mut errors = ValidationErrors::new();
        validate_email("jane.doe@example.co.uk", "email", &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_nan_is_rejected() {
        let mut errors = ValidationErrors::new();
        validate_non_negative(f64::NAN, "discount", "Discount", &mut errors);
        assert!(!errors.is_empty());
    }
}
