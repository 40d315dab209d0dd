//! Storage connection configuration.
//!
//! # Responsibility
//! - Parse the storage connection URL into a concrete target.
//! - Carry connection tuning passed to the engine at startup.
//!
//! # Invariants
//! - `sqlite:///<path>` keeps the path exactly as written after the third
//!   slash, so `sqlite:///./a.db` is relative and `sqlite:////a.db` absolute.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:///./lifttrack.db";
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_POOL_SIZE: u32 = 4;

const SQLITE_SCHEME: &str = "sqlite:";
const MEMORY_MARKER: &str = ":memory:";

/// Backing store selected by configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageTarget {
    File(PathBuf),
    Memory,
}

impl StorageTarget {
    /// Parses a connection URL or a bare file path.
    ///
    /// Accepted forms: `sqlite:///<path>`, `sqlite://` and
    /// `sqlite:///:memory:` (in-memory), `:memory:`, or a plain path.
    pub fn parse(url: &str) -> Result<Self, ConfigError> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyUrl);
        }
        if trimmed == MEMORY_MARKER {
            return Ok(Self::Memory);
        }

        let Some(rest) = trimmed.strip_prefix(SQLITE_SCHEME) else {
            if trimmed.contains("://") {
                return Err(ConfigError::UnsupportedScheme(trimmed.to_string()));
            }
            return Ok(Self::File(PathBuf::from(trimmed)));
        };

        let path = match rest.strip_prefix("///") {
            Some(path) => path,
            None if rest == "//" || rest == MEMORY_MARKER => return Ok(Self::Memory),
            None => return Err(ConfigError::MalformedUrl(trimmed.to_string())),
        };

        if path.is_empty() || path == MEMORY_MARKER {
            return Ok(Self::Memory);
        }
        Ok(Self::File(PathBuf::from(path)))
    }

    pub fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Memory => "memory",
        }
    }
}

impl Display for StorageTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}:{}", self.mode(), path.display()),
            Self::Memory => write!(f, "{}", self.mode()),
        }
    }
}

/// Engine configuration injected at process start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub target: StorageTarget,
    /// How long a blocked statement waits for another writer before failing.
    /// Also bounds the wait for a free pooled connection.
    pub busy_timeout: Duration,
    /// Maximum number of pooled connections, i.e. concurrently open sessions.
    pub pool_size: u32,
}

impl StorageConfig {
    pub fn new(target: StorageTarget) -> Self {
        Self {
            target,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            pool_size: DEFAULT_POOL_SIZE,
        }
    }

    pub fn from_url(url: &str) -> Result<Self, ConfigError> {
        StorageTarget::parse(url).map(Self::new)
    }

    pub fn in_memory() -> Self {
        Self::new(StorageTarget::Memory)
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    pub fn with_pool_size(mut self, pool_size: u32) -> Self {
        self.pool_size = pool_size.max(1);
        self
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(StorageTarget::File(PathBuf::from("./lifttrack.db")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyUrl,
    UnsupportedScheme(String),
    MalformedUrl(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "database url cannot be empty"),
            Self::UnsupportedScheme(url) => {
                write!(f, "unsupported database url `{url}`; only sqlite is available")
            }
            Self::MalformedUrl(url) => {
                write!(f, "malformed database url `{url}`; expected sqlite:///<path>")
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{ConfigError, StorageConfig, StorageTarget, DEFAULT_DATABASE_URL, DEFAULT_POOL_SIZE};
    use std::path::PathBuf;

    #[test]
    fn default_url_matches_default_config() {
        let parsed = StorageConfig::from_url(DEFAULT_DATABASE_URL).unwrap();
        assert_eq!(parsed, StorageConfig::default());
    }

    #[test]
    fn parses_relative_absolute_and_memory_targets() {
        assert_eq!(
            StorageTarget::parse("sqlite:////var/lib/lifttrack.db").unwrap(),
            StorageTarget::File(PathBuf::from("/var/lib/lifttrack.db"))
        );
        assert_eq!(
            StorageTarget::parse("data/lifttrack.db").unwrap(),
            StorageTarget::File(PathBuf::from("data/lifttrack.db"))
        );
        for url in ["sqlite://", "sqlite:///:memory:", ":memory:", " sqlite:/// "] {
            assert_eq!(StorageTarget::parse(url).unwrap(), StorageTarget::Memory, "{url}");
        }
    }

    #[test]
    fn rejects_unknown_schemes_and_empty_urls() {
        assert_eq!(StorageTarget::parse("  "), Err(ConfigError::EmptyUrl));
        assert!(matches!(
            StorageTarget::parse("postgresql://localhost/lifttrack"),
            Err(ConfigError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            StorageTarget::parse("sqlite:lifttrack.db"),
            Err(ConfigError::MalformedUrl(_))
        ));
    }

    #[test]
    fn pool_size_defaults_and_never_drops_to_zero() {
        assert_eq!(StorageConfig::default().pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(StorageConfig::in_memory().with_pool_size(0).pool_size, 1);
        assert_eq!(StorageConfig::in_memory().with_pool_size(8).pool_size, 8);
    }
}
