//! Environment-driven server configuration.
//!
//! Every variable has a default except the superuser password, which may
//! also come from a mounted secret file. Malformed values are errors.

use std::env;
use std::fmt::Display;
use std::fs::read_to_string;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use coursehub_core::{default_log_level, SuperuserSeed};
use log::{info, warn};
use thiserror::Error;

const SECRETS_DIR: &str = "/run/secrets";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("cannot resolve working directory: {0}")]
    WorkingDir(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub bind: IpAddr,
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
    /// `None` when no superuser password was provided.
    pub superuser: Option<SuperuserSeed>,
    /// Fallbacks taken while loading; see [`Config::log_notes`].
    pub notes: Vec<ConfigNote>,
}

/// Something `Config` fell back on while loading.
///
/// Loading happens before the logger exists, so these are collected and
/// written out by [`Config::log_notes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigNote {
    Default { key: &'static str, value: String },
    SecretUnreadable { name: &'static str, path: PathBuf, error: String },
    NoSuperuserPassword,
}

impl Config {
    /// Reads the process environment and `/run/secrets`.
    pub fn load() -> Result<Self, ConfigError> {
        let cwd = env::current_dir()?;
        Self::from_source(|key| env::var(key).ok(), Path::new(SECRETS_DIR), &cwd)
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_source<F>(vars: F, secrets_dir: &Path, cwd: &Path) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut source = Source {
            vars,
            notes: Vec::new(),
        };

        let password = match (source.vars)("COURSEHUB_SUPERUSER_PASSWORD") {
            Some(password) => Some(password),
            None => source.read_secret(secrets_dir, "COURSEHUB_SUPERUSER_PASSWORD"),
        };
        let superuser = match password {
            Some(password) => Some(SuperuserSeed {
                username: source.string_or("COURSEHUB_SUPERUSER_USERNAME", "admin"),
                email: source.string_or("COURSEHUB_SUPERUSER_EMAIL", "admin@example.com"),
                password,
            }),
            None => {
                source.notes.push(ConfigNote::NoSuperuserPassword);
                None
            }
        };

        let log_dir = match (source.vars)("COURSEHUB_LOG_DIR").map(PathBuf::from) {
            Some(dir) if dir.is_absolute() => dir,
            Some(dir) => cwd.join(dir),
            None => {
                let dir = cwd.join("logs");
                source.note_default("COURSEHUB_LOG_DIR", &dir.display().to_string());
                dir
            }
        };

        let port = source.parse_or("COURSEHUB_PORT", "8000")?;
        let bind = source.parse_or("COURSEHUB_BIND", "0.0.0.0")?;
        let db_path = PathBuf::from(source.string_or("COURSEHUB_DB_PATH", "coursehub.sqlite3"));
        let log_level = source.string_or("COURSEHUB_LOG_LEVEL", default_log_level());

        Ok(Self {
            port,
            bind,
            db_path,
            log_level,
            log_dir,
            superuser,
            notes: source.notes,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Writes the collected fallbacks. Call once logging is initialized.
    pub fn log_notes(&self) {
        for note in &self.notes {
            match note {
                ConfigNote::Default { key, value } => {
                    info!("event=config_default module=http key={key} value={value}");
                }
                ConfigNote::SecretUnreadable { name, path, error } => {
                    info!(
                        "event=config_secret module=http status=skipped name={name} path={} error={error}",
                        path.display()
                    );
                }
                ConfigNote::NoSuperuserPassword => {
                    warn!("event=config_load module=http status=degraded reason=no_superuser_password");
                }
            }
        }
    }
}

struct Source<F> {
    vars: F,
    notes: Vec<ConfigNote>,
}

impl<F> Source<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn note_default(&mut self, key: &'static str, value: &str) {
        self.notes.push(ConfigNote::Default {
            key,
            value: value.to_string(),
        });
    }

    fn string_or(&mut self, key: &'static str, default: &str) -> String {
        match (self.vars)(key) {
            Some(value) => value,
            None => {
                self.note_default(key, default);
                default.to_string()
            }
        }
    }

    fn parse_or<T>(&mut self, key: &'static str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.string_or(key, default)
            .trim()
            .parse()
            .map_err(|err: T::Err| ConfigError::Invalid {
                key,
                message: err.to_string(),
            })
    }

    fn read_secret(&mut self, secrets_dir: &Path, name: &'static str) -> Option<String> {
        let path = secrets_dir.join(name);
        match read_to_string(&path) {
            Ok(secret) => Some(secret.trim().to_string()).filter(|secret| !secret.is_empty()),
            Err(err) => {
                self.notes.push(ConfigNote::SecretUnreadable {
                    name,
                    path,
                    error: err.to_string(),
                });
                None
            }
        }
    }
}
