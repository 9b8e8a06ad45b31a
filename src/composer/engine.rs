//! Typst rendering engine.
//!
//! PDF kinds compose a complete Typst source string; this module compiles it
//! in a temporary directory. The trait seam lets tests substitute the
//! compiler.

use std::fs;
use std::process::Command;

use tempfile::tempdir;

use crate::error::CoreError;

/// Compiles a Typst source string to PDF bytes.
pub trait PdfRenderer: Send + Sync {
    fn render(&self, source: &str, job_name: &str) -> Result<Vec<u8>, CoreError>;
}

/// Stateless renderer shelling out to the `typst` CLI.
pub struct TypstRenderer;

impl PdfRenderer for TypstRenderer {
    fn render(&self, source: &str, job_name: &str) -> Result<Vec<u8>, CoreError> {
        let temp_dir = tempdir()?;
        let typ_path = temp_dir.path().join(format!("{job_name}.typ"));
        let pdf_path = temp_dir.path().join(format!("{job_name}.pdf"));

        fs::write(&typ_path, source)?;

        let status = Command::new("typst")
            .arg("compile")
            .arg(&typ_path)
            .arg(&pdf_path)
            .current_dir(temp_dir.path())
            .status()
            .map_err(|err| CoreError::Render(format!("failed to run typst: {err}")))?;

        if !status.success() {
            let code = status.code().unwrap_or(-1);
            return Err(CoreError::Render(format!(
                "typst exited with status {code} for job '{job_name}'"
            )));
        }

        Ok(fs::read(&pdf_path)?)
    }
}
