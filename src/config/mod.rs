//! Configuration for the ingestion worker.
//!
//! The database settings mirror the four values operators already supply
//! (host, user, password, database name). A full connection URL can be given
//! instead, which is how SQLite stores are addressed.

use std::path::{Path, PathBuf};

use sqlx::ConnectOptions;
use sqlx::mysql::MySqlConnectOptions;

/// Default database name
pub const DEFAULT_DATABASE_NAME: &str = "medical_data";

/// Default location of documents waiting to be ingested
pub const DEFAULT_INCOMING_DIR: &str = "data/incoming";

/// Default location of ingested documents
pub const DEFAULT_PROCESSED_DIR: &str = "data/processed";

/// Connection settings for the relational store
#[derive(Clone)]
pub struct DatabaseConfig {
    /// Database server host
    pub host: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Database name
    pub name: String,
    /// Full connection URL, overriding the four settings above when present
    pub url: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            user: "root".to_string(),
            password: String::new(),
            name: DEFAULT_DATABASE_NAME.to_string(),
            url: None,
        }
    }
}

// Keep the password out of logs.
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("url", &self.url.as_ref().map(|_| "<set>"))
            .finish()
    }
}

impl DatabaseConfig {
    /// Create a database configuration with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Address the store by a full connection URL, e.g. `sqlite://ingest.db?mode=rwc`
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn mysql_options(&self) -> MySqlConnectOptions {
        let (host, port) = match self.host.rsplit_once(':') {
            Some((host, port)) => match port.parse::<u16>() {
                Ok(port) => (host, Some(port)),
                Err(_) => (self.host.as_str(), None),
            },
            None => (self.host.as_str(), None),
        };

        let mut options = MySqlConnectOptions::new()
            .host(host)
            .username(&self.user)
            .password(&self.password);
        if let Some(port) = port {
            options = options.port(port);
        }
        options
    }

    /// URL of the configured database.
    ///
    /// Returns `url` verbatim when set, otherwise a MySQL URL assembled from
    /// host, user, password and database name with credentials escaped.
    #[must_use]
    pub fn connection_url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => self
                .mysql_options()
                .database(&self.name)
                .to_url_lossy()
                .to_string(),
        }
    }

    /// URL of the database server without selecting a database.
    ///
    /// Returns `None` when the store is addressed by an explicit URL, in which
    /// case there is no separate server to connect to.
    #[must_use]
    pub fn server_url(&self) -> Option<String> {
        match self.url {
            Some(_) => None,
            None => Some(self.mysql_options().to_url_lossy().to_string()),
        }
    }
}

/// Configuration for an ingestion run
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Relational store settings
    pub database: DatabaseConfig,
    /// Directory scanned for documents to ingest
    pub incoming_dir: PathBuf,
    /// Directory receiving successfully ingested documents
    pub processed_dir: PathBuf,
    /// Parse documents without touching the database or moving files
    pub dry_run: bool,
    /// Show a progress bar on stderr
    pub show_progress: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            incoming_dir: PathBuf::from(DEFAULT_INCOMING_DIR),
            processed_dir: PathBuf::from(DEFAULT_PROCESSED_DIR),
            dry_run: false,
            show_progress: false,
        }
    }
}

impl IngestConfig {
    /// Create a new ingestion configuration with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the database settings
    #[must_use]
    pub fn with_database(mut self, database: DatabaseConfig) -> Self {
        self.database = database;
        self
    }

    /// Set the incoming and processed directories
    #[must_use]
    pub fn with_directories(mut self, incoming: &Path, processed: &Path) -> Self {
        self.incoming_dir = incoming.to_path_buf();
        self.processed_dir = processed.to_path_buf();
        self
    }

    /// Only parse documents
    #[must_use]
    pub const fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Report progress on stderr
    #[must_use]
    pub const fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}
