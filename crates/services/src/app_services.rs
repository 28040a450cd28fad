use std::path::Path;
use std::sync::Arc;

use storage::assets::BankCatalog;
use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::progress_sync::ProgressSync;
use crate::sessions::QuizLoopService;
use crate::verse::{VerseClient, VerseConfig, VerseSource};

/// Assembles the app-facing services.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<BankCatalog>,
    progress: Arc<ProgressSync>,
    quiz_loop: Arc<QuizLoopService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage, bank assets on disk, and the
    /// HTTP verse API.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization, bank loading, or
    /// HTTP client construction fails.
    pub async fn new_sqlite(
        db_url: &str,
        bank_dir: &Path,
        verse_config: VerseConfig,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let catalog = BankCatalog::load_dir(bank_dir)?;
        let storage = Storage::sqlite(db_url).await?;
        let verses: Arc<dyn VerseSource> = Arc::new(VerseClient::new(verse_config)?);
        tracing::info!(
            books = catalog.len(),
            bank_dir = %bank_dir.display(),
            "question banks loaded"
        );
        Ok(Self::from_parts(clock, catalog, &storage, verses))
    }

    /// Wire services from already constructed parts.
    #[must_use]
    pub fn from_parts(
        clock: Clock,
        catalog: BankCatalog,
        storage: &Storage,
        verses: Arc<dyn VerseSource>,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let progress = Arc::new(ProgressSync::new(
            clock,
            Arc::clone(&storage.progress),
            Arc::clone(&storage.stats),
        ));
        let quiz_loop = Arc::new(QuizLoopService::new(
            clock,
            Arc::clone(&catalog),
            Arc::clone(&progress),
            verses,
        ));
        Self {
            catalog,
            progress,
            quiz_loop,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<BankCatalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressSync> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }
}
