//! Runtime settings from environment variables (a `.env` file is loaded first when present).

use crate::error::ConfigError;

pub const ENV_MODE: &str = "BOOKSTORE_ENV";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_TEST_DATABASE_URL: &str = "TEST_DATABASE_URL";
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_MAX_CONNECTIONS: &str = "DB_MAX_CONNECTIONS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// Uses the isolated test database.
    Test,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub mode: Mode,
    pub database_url: String,
    pub test_database_url: String,
    pub bind_addr: String,
    pub max_connections: u32,
}

impl Settings {
    /// Load `.env` if present, then read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup; unset keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = match lookup(ENV_MODE).as_deref().map(str::trim) {
            None | Some("") | Some("development") | Some("production") => Mode::Normal,
            Some("test") => Mode::Test,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: ENV_MODE,
                    value: other.to_string(),
                })
            }
        };
        let max_connections = match lookup(ENV_MAX_CONNECTIONS) {
            None => 5,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_MAX_CONNECTIONS,
                        value: raw,
                    })
                }
            },
        };
        Ok(Settings {
            mode,
            database_url: lookup(ENV_DATABASE_URL).unwrap_or_else(|| "postgres://localhost/books".into()),
            test_database_url: lookup(ENV_TEST_DATABASE_URL)
                .unwrap_or_else(|| "postgres://localhost/books_test".into()),
            bind_addr: lookup(ENV_BIND_ADDR).unwrap_or_else(|| "0.0.0.0:3000".into()),
            max_connections,
        })
    }

    /// Connection string for the current mode.
    pub fn database_url(&self) -> &str {
        match self.mode {
            Mode::Normal => &self.database_url,
            Mode::Test => &self.test_database_url,
        }
    }
}
