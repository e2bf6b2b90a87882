//! Configuration loading and management.
//!
//! Lookup order: an explicit `--config` path, then
//! `staff-performance/config.yaml` in the working directory, then
//! `<user config dir>/staff-performance/config.yaml`, else defaults.
//! Environment variables are applied on top, and CLI flags last (in `main`).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project directory name, relative to the working directory.
pub const PROJECT_DIR: &str = "staff-performance";

/// Server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            bind: default_bind(),
            port: default_port(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from(PROJECT_DIR).join("staffperformance.db")
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Session lifetime in hours.
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,

    /// Mark the cookie `Secure` (HTTPS only).
    #[serde(default)]
    pub secure_cookie: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            ttl_hours: default_ttl_hours(),
            secure_cookie: false,
        }
    }
}

fn default_cookie_name() -> String {
    "session".to_string()
}

fn default_ttl_hours() -> u64 {
    168 // 7 days
}

/// First-run Admin account. Seeded only when no Admin exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_admin_username")]
    pub username: String,

    /// No default. Seeding is skipped until one is configured.
    #[serde(default)]
    pub password: Option<String>,

    #[serde(default = "default_admin_full_name")]
    pub full_name: String,

    #[serde(default)]
    pub email: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            username: default_admin_username(),
            password: None,
            full_name: default_admin_full_name(),
            email: String::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_full_name() -> String {
    "Administrator".to_string()
}

impl Config {
    /// Load configuration from file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Candidate config files in lookup order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(PROJECT_DIR).join("config.yaml")];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join(PROJECT_DIR).join("config.yaml"));
        }
        paths
    }

    /// Load from `explicit` if given (it must exist), otherwise from the first
    /// search path that exists, otherwise defaults. Environment overrides are
    /// applied in every case. Returns the file that was used, if any.
    pub fn discover(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        Self::discover_in(explicit, &Self::search_paths(), |key| std::env::var(key).ok())
    }

    fn discover_in(
        explicit: Option<&Path>,
        search: &[PathBuf],
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<(Self, Option<PathBuf>)> {
        let (mut config, source) = match explicit {
            Some(path) => (Self::load(path)?, Some(path.to_path_buf())),
            None => match search.iter().find(|p| p.exists()) {
                Some(path) => (Self::load(path)?, Some(path.clone())),
                None => (Self::default(), None),
            },
        };
        config.apply_env_overrides(env);
        Ok((config, source))
    }

    /// Apply `STAFF_PERF_*` overrides. Unparsable numbers are ignored.
    pub fn apply_env_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(db_path) = env("STAFF_PERF_DB_PATH") {
            self.server.db_path = PathBuf::from(db_path);
        }

        if let Some(port) = env("STAFF_PERF_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }

        if let Some(bind) = env("STAFF_PERF_BIND") {
            self.server.bind = bind;
        }

        if let Some(username) = env("STAFF_PERF_ADMIN_USERNAME") {
            self.bootstrap.username = username;
        }

        if let Some(password) = env("STAFF_PERF_ADMIN_PASSWORD") {
            self.bootstrap.password = Some(password);
        }

        if let Some(flag) = env("STAFF_PERF_BOOTSTRAP") {
            self.bootstrap.enabled = !matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "0" | "false" | "no" | "off"
            );
        }
    }

    /// Ensure the database directory exists.
    pub fn ensure_db_dir(&self) -> Result<()> {
        if let Some(parent) = self.server.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}
