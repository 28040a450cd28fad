//! Question bank assets.
//!
//! Each book's bank lives in its own `<book>.json` file. The file stem must
//! match the `book` field inside the file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use trivia_core::model::{BankDraft, BankError, BookId, QuestionBank};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid bank in {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: BankError,
    },
    #[error("{path} declares book {declared} but is named after a different book")]
    BookMismatch { path: PathBuf, declared: BookId },
    #[error("book {0} is defined by more than one asset")]
    DuplicateBook(BookId),
    #[error("no question banks found in {0}")]
    NoBanks(PathBuf),
}

/// All loaded banks, keyed by book.
#[derive(Debug, Clone, Default)]
pub struct BankCatalog {
    banks: BTreeMap<BookId, Arc<QuestionBank>>,
}

impl BankCatalog {
    /// Build a catalog from banks already in memory.
    ///
    /// # Errors
    ///
    /// Returns `BankLoadError::DuplicateBook` if two banks share a book id.
    pub fn from_banks(
        banks: impl IntoIterator<Item = QuestionBank>,
    ) -> Result<Self, BankLoadError> {
        let mut catalog = Self::default();
        for bank in banks {
            catalog.insert(bank)?;
        }
        Ok(catalog)
    }

    /// Load every `*.json` bank in `dir`.
    ///
    /// # Errors
    ///
    /// Returns `BankLoadError` if the directory cannot be read, any asset is
    /// malformed or invalid, or no banks are found.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, BankLoadError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|source| BankLoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| BankLoadError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut catalog = Self::default();
        for path in paths {
            let bank = load_bank_file(&path)?;
            tracing::debug!(
                book = %bank.book(),
                questions = bank.len(),
                path = %path.display(),
                "loaded question bank"
            );
            catalog.insert(bank)?;
        }

        if catalog.banks.is_empty() {
            return Err(BankLoadError::NoBanks(dir.to_path_buf()));
        }
        Ok(catalog)
    }

    fn insert(&mut self, bank: QuestionBank) -> Result<(), BankLoadError> {
        let book = bank.book().clone();
        if self.banks.contains_key(&book) {
            return Err(BankLoadError::DuplicateBook(book));
        }
        self.banks.insert(book, Arc::new(bank));
        Ok(())
    }

    #[must_use]
    pub fn get(&self, book: &BookId) -> Option<Arc<QuestionBank>> {
        self.banks.get(book).cloned()
    }

    /// Banks ordered by book id.
    pub fn banks(&self) -> impl Iterator<Item = &Arc<QuestionBank>> {
        self.banks.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.banks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }
}

/// Read and validate a single bank asset.
///
/// # Errors
///
/// Returns `BankLoadError` if the file cannot be read or parsed, fails
/// validation, or its stem does not match the declared book.
pub fn load_bank_file(path: &Path) -> Result<QuestionBank, BankLoadError> {
    let raw = std::fs::read_to_string(path).map_err(|source| BankLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let draft: BankDraft = serde_json::from_str(&raw).map_err(|source| BankLoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let stem_matches = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem == draft.book.as_str());
    if !stem_matches {
        return Err(BankLoadError::BookMismatch {
            path: path.to_path_buf(),
            declared: draft.book,
        });
    }

    draft.validate().map_err(|source| BankLoadError::Invalid {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank_json(book: &str, ids: &[&str]) -> String {
        let questions: Vec<String> = ids
            .iter()
            .map(|id| {
                format!(
                    r#"{{
                        "id": "{id}",
                        "prompt": "Question {id}?",
                        "options": [
                            {{"label": "A", "text": "one"}},
                            {{"label": "B", "text": "two"}},
                            {{"label": "C", "text": "three"}},
                            {{"label": "D", "text": "four"}}
                        ],
                        "correctLabel": "C",
                        "sourceReference": "Ruth 1:1"
                    }}"#
                )
            })
            .collect();
        format!(
            r#"{{"book": "{book}", "title": "Book of {book}", "questions": [{}]}}"#,
            questions.join(",")
        )
    }

    #[test]
    fn loads_every_json_bank_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ruth.json"), bank_json("ruth", &["r1", "r2"])).unwrap();
        std::fs::write(dir.path().join("jonah.json"), bank_json("jonah", &["j1"])).unwrap();
        std::fs::write(dir.path().join("README.md"), "not a bank").unwrap();

        let catalog = BankCatalog::load_dir(dir.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        let books: Vec<_> = catalog.banks().map(|b| b.book().as_str().to_owned()).collect();
        assert_eq!(books, ["jonah", "ruth"]);
        let ruth = catalog.get(&BookId::new("ruth").unwrap()).unwrap();
        assert_eq!(ruth.len(), 2);
        assert_eq!(ruth.title(), "Book of ruth");
    }

    #[test]
    fn file_name_must_match_declared_book() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("esther.json"), bank_json("ruth", &["r1"])).unwrap();
        let err = BankCatalog::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, BankLoadError::BookMismatch { .. }));
    }

    #[test]
    fn invalid_bank_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ruth.json"), bank_json("ruth", &["r1", "r1"])).unwrap();
        let err = BankCatalog::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, BankLoadError::Invalid { .. }));
        assert!(err.to_string().contains("ruth.json"));
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            BankCatalog::load_dir(dir.path()),
            Err(BankLoadError::NoBanks(_))
        ));
    }

    #[test]
    fn malformed_json_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ruth.json"), "{ not json").unwrap();
        assert!(matches!(
            BankCatalog::load_dir(dir.path()),
            Err(BankLoadError::Json { .. })
        ));
    }
}
