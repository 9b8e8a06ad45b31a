//! Application state wiring: ledger, renderer and artifact store behind the
//! seams the handlers use.

use std::env;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use crate::composer::engine::{PdfRenderer, TypstRenderer};
use crate::documents::service::GenerationService;
use crate::ledger::{Ledger, PgLedger};
use crate::storage::FileStore;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn Ledger>,
    pub service: GenerationService,
}

impl AppState {
    /// Production wiring: Postgres ledger, Typst renderer, generated-files
    /// directory from the environment.
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();
        let database_url = env::var("DATABASE_URL")?;

        let pool = PgPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect(&database_url)
            .await?;

        let ledger: Arc<dyn Ledger> = Arc::new(PgLedger::new(pool));
        Ok(Self::with_parts(
            ledger,
            Arc::new(TypstRenderer),
            FileStore::from_env(),
        ))
    }

    /// Assemble state from explicit parts; tests use this with the
    /// in-memory ledger and a stub renderer.
    pub fn with_parts(
        ledger: Arc<dyn Ledger>,
        renderer: Arc<dyn PdfRenderer>,
        files: FileStore,
    ) -> Self {
        let service = GenerationService::new(ledger.clone(), renderer, files);
        Self { ledger, service }
    }
}
