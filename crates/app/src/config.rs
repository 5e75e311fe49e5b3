use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use services::leaderboard_service::DEFAULT_LEADERBOARD_LIMIT;

const DEFAULT_DB_URL: &str = "sqlite://dev.sqlite3";
const DEFAULT_BIND: &str = "0.0.0.0:3000";

#[derive(Debug)]
pub enum ConfigError {
    HelpRequested,
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidBind { raw: String },
    InvalidLeaderboardLimit { raw: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::HelpRequested => write!(f, "help requested"),
            ConfigError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ConfigError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ConfigError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ConfigError::InvalidBind { raw } => write!(f, "invalid --bind value: {raw}"),
            ConfigError::InvalidLeaderboardLimit { raw } => {
                write!(f, "invalid LITERACY_LEADERBOARD_LIMIT value: {raw}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ConfigError> {
    args.next().ok_or(ConfigError::MissingValue { flag })
}

/// Server settings from the environment, overridden by command-line flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_url: String,
    pub bind: SocketAddr,
    pub leaderboard_limit: u32,
}

impl AppConfig {
    /// Parses flags on top of environment defaults.
    ///
    /// `env` looks up a variable by name so callers can pass `std::env::var`
    /// or a fixed map.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::HelpRequested` for `--help`, or another variant
    /// for unknown flags and malformed values.
    pub fn parse(
        args: impl IntoIterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut db_url = env("LITERACY_DB_URL")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
        let mut bind_raw = env("LITERACY_BIND").unwrap_or_else(|| DEFAULT_BIND.into());
        let leaderboard_limit = match env("LITERACY_LEADERBOARD_LIMIT") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidLeaderboardLimit { raw })?,
            None => DEFAULT_LEADERBOARD_LIMIT,
        };

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ConfigError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--bind" => {
                    bind_raw = require_value(&mut args, "--bind")?;
                }
                "--help" | "-h" => return Err(ConfigError::HelpRequested),
                _ => return Err(ConfigError::UnknownArg(arg)),
            }
        }

        let bind = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidBind { raw: bind_raw.clone() })?;

        Ok(Self {
            db_url,
            bind,
            leaderboard_limit,
        })
    }
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--db <sqlite_url>] [--bind <addr:port>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --bind {DEFAULT_BIND}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  LITERACY_DB_URL, LITERACY_BIND, LITERACY_LEADERBOARD_LIMIT");
    eprintln!("  CLOUDINARY_CLOUD_NAME, GEMINI_API_KEY, GEMINI_BASE_URL, GEMINI_MODEL");
}

/// Turns `sqlite:relative.db` or a bare path into an absolute `sqlite://` URL.
#[must_use]
pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Creates the database file (and its directory) so `SQLite` can open it.
///
/// # Errors
///
/// Returns `ConfigError::InvalidDbUrl` for a non-file URL, or an I/O error if
/// the file cannot be created.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ConfigError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ConfigError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}
