use std::path::{Path, PathBuf};

use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database")]
    database: String,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Header set by the authenticating proxy in front of the store
    #[serde(default = "default_user_header")]
    pub user_header: String,
    /// Albums shown on the home page
    #[serde(default = "default_top_selling_count")]
    pub top_selling_count: usize,
    /// Secret for signing session cookies, at least 64 bytes. A random key is
    /// generated at startup when unset, so sessions do not survive a restart.
    #[serde(default)]
    pub cookie_secret: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// OTLP gRPC endpoint, e.g. http://localhost:4317
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_database() -> String {
    dirs::data_dir()
        .map(|dir| dir.join("music-store").join("music-store.db"))
        .unwrap_or_else(|| PathBuf::from("music-store.db"))
        .to_string_lossy()
        .to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_user_header() -> String {
    "x-forwarded-user".to_string()
}

fn default_top_selling_count() -> usize {
    5
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            user_header: default_user_header(),
            top_selling_count: default_top_selling_count(),
            cookie_secret: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            http: HttpConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .context(format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("music-store").join("config.toml"))
    }

    /// Load the config from the default location, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                log::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Write a default config file, if it doesn't exist
    pub fn create_default() -> Result<PathBuf> {
        let path = Self::config_path().ok_or(eyre!("No config directory available"))?;
        if path.exists() {
            log::info!("Config already exists at: {}", path.display());
            return Ok(path);
        }
        Self::default().write_to(&path)?;
        Ok(path)
    }

    fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context(format!(
                "Failed to create config directory: {}",
                parent.display()
            ))?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents)
            .context(format!("Failed to write config file: {}", path.display()))
    }

    /// Expand ~ to home directory
    fn expand_path(&self, path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(rest);
        }
        PathBuf::from(path)
    }

    /// Get expanded database path
    pub fn database_path(&self) -> PathBuf {
        self.expand_path(&self.database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            database = "/tmp/store.db"

            [http]
            port = 8080
            "#,
        )
        .unwrap();

        assert_eq!(config.database_path(), PathBuf::from("/tmp/store.db"));
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.http.user_header, "x-forwarded-user");
        assert_eq!(config.http.top_selling_count, 5);
        assert!(config.http.cookie_secret.is_none());
        assert!(config.telemetry.otlp_endpoint.is_none());
    }

    #[test]
    fn test_expand_home_path() {
        let config = Config::default();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.expand_path("~/store.db"), home.join("store.db"));
        }
        assert_eq!(config.expand_path("store.db"), PathBuf::from("store.db"));
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.http.port = 4000;
        config.write_to(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.http.port, 4000);
        assert_eq!(loaded.database_path(), config.database_path());
    }
}
