use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use services::VerseConfig;
use services::verse::DEFAULT_VERSE_API_URL;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid --db value: {raw}")]
    InvalidDbUrl { raw: String },
    #[error("failed to prepare database file {path}: {source}")]
    DbFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Parser)]
#[command(name = "trivia")]
#[command(version, about = "Bible trivia quiz server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// SQLite database URL or file path
    #[arg(
        long = "db",
        env = "TRIVIA_DB_URL",
        default_value = "sqlite://trivia.sqlite3",
        global = true
    )]
    pub db_url: String,

    /// Directory holding `<book>.json` question banks
    #[arg(
        long = "banks",
        env = "TRIVIA_BANK_DIR",
        default_value = "data/banks",
        global = true
    )]
    pub bank_dir: PathBuf,

    /// Address the HTTP API listens on
    #[arg(
        long,
        env = "TRIVIA_BIND",
        default_value = "127.0.0.1:8080",
        global = true
    )]
    pub bind: SocketAddr,

    /// Base URL of the verse lookup API
    #[arg(
        long = "verse-api",
        env = "TRIVIA_VERSE_API_URL",
        default_value = DEFAULT_VERSE_API_URL,
        global = true
    )]
    pub verse_api: Url,

    /// Timeout for a single verse lookup, in seconds
    #[arg(long, default_value_t = 5, global = true)]
    pub verse_timeout_secs: u64,

    /// Drop quiz sessions not touched for this many seconds
    #[arg(
        long,
        env = "TRIVIA_SESSION_TTL_SECS",
        default_value_t = 1800,
        global = true
    )]
    pub session_ttl_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run the JSON API (default)
    Serve,
    /// Validate the question banks and list them
    Books,
}

impl Cli {
    #[must_use]
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }

    #[must_use]
    pub fn verse_config(&self) -> VerseConfig {
        VerseConfig::new(self.verse_api.clone())
            .with_timeout(Duration::from_secs(self.verse_timeout_secs))
    }

    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

/// Turn a bare or relative path into an absolute `sqlite://` URL.
#[must_use]
pub fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_string();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Make sure the database file and its parent directory exist.
///
/// # Errors
///
/// Returns `ConfigError` if the URL has no file path or the file cannot be
/// created.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), ConfigError> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let invalid = || ConfigError::InvalidDbUrl {
        raw: db_url.to_string(),
    };
    let path = db_url.strip_prefix("sqlite://").ok_or_else(invalid)?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(invalid());
    }

    let path = Path::new(path);
    let io_err = |source| ConfigError::DbFile {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(io_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::DEFAULT_SESSION_TTL;

    #[test]
    fn sqlite_urls_pass_through() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url(" sqlite:///tmp/quiz.db "),
            "sqlite:///tmp/quiz.db"
        );
    }

    #[test]
    fn bare_paths_become_absolute_urls() {
        assert_eq!(normalize_sqlite_url("/var/lib/quiz.db"), "sqlite:///var/lib/quiz.db");
        assert_eq!(normalize_sqlite_url("sqlite:/srv/q.db"), "sqlite:///srv/q.db");

        let relative = normalize_sqlite_url("quiz.db");
        assert!(relative.starts_with("sqlite:///"));
        assert!(relative.ends_with("/quiz.db"));
    }

    #[test]
    fn prepare_rejects_non_file_urls() {
        assert!(matches!(
            prepare_sqlite_file("postgres://localhost/quiz"),
            Err(ConfigError::InvalidDbUrl { .. })
        ));
        assert!(matches!(
            prepare_sqlite_file("sqlite://?mode=rwc"),
            Err(ConfigError::InvalidDbUrl { .. })
        ));
        assert!(prepare_sqlite_file("sqlite::memory:").is_ok());
    }

    #[test]
    fn defaults_parse() {
        let cli = Cli::try_parse_from(["trivia"]).unwrap();
        assert_eq!(cli.command(), Command::Serve);
        assert_eq!(cli.bank_dir, PathBuf::from("data/banks"));
        assert_eq!(cli.verse_config().timeout, Duration::from_secs(5));
        assert_eq!(cli.session_ttl(), DEFAULT_SESSION_TTL);

        let cli = Cli::try_parse_from(["trivia", "books", "--banks", "/srv/banks"]).unwrap();
        assert_eq!(cli.command(), Command::Books);
        assert_eq!(cli.bank_dir, PathBuf::from("/srv/banks"));
    }
}
