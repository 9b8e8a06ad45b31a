pub mod handlers;
pub mod models;
pub mod service;

pub use models::{DocumentKind, DocumentRecord, DocumentSummary, NewDocument};
pub use service::GenerationService;
