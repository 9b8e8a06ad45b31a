//! Template catalog records. Templates are created elsewhere; the core only
//! reads them to select a layout variant and to enforce premium gating.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::documents::models::DocumentKind;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TemplateRecord {
    pub id: Uuid,
    pub name: String,
    pub kind: DocumentKind,
    pub is_premium: bool,
    pub is_active: bool,
}

/// Catalog entry as shown to a caller, with availability resolved against
/// their plan.
#[derive(Debug, Serialize, ToSchema)]
pub struct TemplateListing {
    pub id: Uuid,
    pub name: String,
    pub kind: DocumentKind,
    pub is_premium: bool,
    pub available: bool,
}

pub fn listing_for(templates: Vec<TemplateRecord>, premium: bool) -> Vec<TemplateListing> {
    templates
        .into_iter()
        .filter(|template| template.is_active)
        .map(|template| TemplateListing {
            id: template.id,
            name: template.name,
            kind: template.kind,
            is_premium: template.is_premium,
            available: !template.is_premium || premium,
        })
        .collect()
}

/// Layout accent color for a template variant. Deterministic: the same
/// selection always renders the same document.
pub fn accent_for(template: Option<&TemplateRecord>) -> &'static str {
    match template {
        Some(template) if template.is_premium => "#1f3a5f",
        Some(_) => "#444444",
        None => "#333333",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(name: &str, premium: bool, active: bool) -> TemplateRecord {
        TemplateRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            kind: DocumentKind::Invoice,
            is_premium: premium,
            is_active: active,
        }
    }

    #[test]
    fn test_listing_marks_premium_availability() {
        let catalog = vec![
            template("Modern Invoice", false, true),
            template("Corporate Invoice", true, true),
        ];

        let free_view = listing_for(catalog.clone(), false);
        assert_eq!(free_view.len(), 2);
        assert!(free_view[0].available);
        assert!(!free_view[1].available);

        let premium_view = listing_for(catalog, true);
        assert!(premium_view.iter().all(|entry| entry.available));
    }

    #[test]
    fn test_listing_drops_inactive() {
        let catalog = vec![template("Retired", false, false)];
        assert!(listing_for(catalog, true).is_empty());
    }

    #[test]
    fn test_accent_is_deterministic() {
        let premium = template("Corporate Invoice", true, true);
        assert_eq!(accent_for(Some(&premium)), accent_for(Some(&premium)));
        assert_ne!(accent_for(Some(&premium)), accent_for(None));
    }
}
