//! Artifact naming.
//!
//! Names follow `<kind>_<discriminator-slug>_<token>.<ext>` with an
//! 8-hex-character random token, so concurrent generations never collide and
//! no cross-process coordination or wall clock is involved.

use uuid::Uuid;

use crate::documents::models::DocumentKind;

/// Filesystem-safe slug: strip unsafe characters, whitespace to underscores.
pub fn slugify(value: &str) -> String {
    sanitize_filename::sanitize(value.trim())
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

fn random_token() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    hex.chars().take(8).collect()
}

/// Unique filename for a new artifact. The discriminator is a
/// human-meaningful value (invoice number, recipient name) and may be empty
/// for content-less kinds such as QR codes.
pub fn name_for(kind: DocumentKind, discriminator: &str, ext: &str) -> String {
    let slug = slugify(discriminator);
    if slug.is_empty() {
        format!("{}_{}.{}", kind.as_str(), random_token(), ext)
    } else {
        format!("{}_{}_{}.{}", kind.as_str(), slug, random_token(), ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_slug_replaces_whitespace() {
        assert_eq!(slugify("Jane  van der Berg"), "Jane_van_der_Berg");
        assert_eq!(slugify("  INV-2025/001  "), "INV-2025001");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_name_shape() {
        let name = name_for(DocumentKind::Invoice, "INV-42", "pdf");
        assert!(name.starts_with("invoice_INV-42_"));
        assert!(name.ends_with(".pdf"));

        let bare = name_for(DocumentKind::Qrcode, "", "png");
        assert!(bare.starts_with("qrcode_"));
        assert!(bare.ends_with(".png"));
        // kind + token + extension only
        assert_eq!(bare.matches('_').count(), 1);
    }

    #[test]
    fn test_10000_names_are_distinct() {
        let names: HashSet<String> = (0..10_000)
            .map(|_| name_for(DocumentKind::Certificate, "Alice Smith", "pdf"))
            .collect();
        assert_eq!(names.len(), 10_000);
    }
}
