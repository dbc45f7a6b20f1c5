use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, net::SocketAddr, path::Path, path::PathBuf, time::Duration};
use tracing::debug;

pub const DEFAULT_CONFIG: &str = r#"---
server:
  listen_addr: "0.0.0.0:8080"
  database_path: "cotacoes.db"
  upstream_base_url: "https://economia.awesomeapi.com.br"
  pair: "USD-BRL"
  fetch_timeout_ms: 200
  store_timeout_ms: 10

client:
  server_url: "http://localhost:8080/cotacao"
  timeout_ms: 300
  output_path: "cotacao.txt"
"#;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub database_path: PathBuf,
    pub upstream_base_url: String,
    /// Currency pair as the upstream spells it in the URL, e.g. `USD-BRL`.
    pub pair: String,
    pub fetch_timeout_ms: u64,
    pub store_timeout_ms: u64,
}

impl ServerConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_path: PathBuf::from("cotacoes.db"),
            upstream_base_url: "https://economia.awesomeapi.com.br".to_string(),
            pair: "USD-BRL".to_string(),
            fetch_timeout_ms: 200,
            store_timeout_ms: 10,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: String,
    pub timeout_ms: u64,
    pub output_path: PathBuf,
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            server_url: "http://localhost:8080/cotacao".to_string(),
            timeout_ms: 300,
            output_path: PathBuf::from("cotacao.txt"),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

impl AppConfig {
    /// Loads the config file from the default location, falling back to the
    /// built-in defaults when no file exists there.
    pub fn load() -> Result<Self> {
        Self::load_optional(Self::project_dirs().map(|dirs| Self::config_path_in(&dirs)))
    }

    /// A missing home directory or config file is not an error: the
    /// defaults cover everything.
    fn load_optional(config_path: Option<PathBuf>) -> Result<Self> {
        let Some(config_path) = config_path else {
            debug!("No project directories, using defaults");
            return Ok(Self::default());
        };

        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("br", "goexpert", "cotacao")
    }

    fn config_path_in(proj_dirs: &ProjectDirs) -> PathBuf {
        proj_dirs.config_dir().join("config.yaml")
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = Self::project_dirs().context("Could not determine project directories")?;
        Ok(Self::config_path_in(&proj_dirs))
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Writes the default configuration to `path`, refusing to overwrite.
    pub fn write_default<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();

        if path.exists() {
            anyhow::bail!("Configuration file already exists at {}", path.display());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        fs::write(path, DEFAULT_CONFIG)
            .with_context(|| format!("Failed to write config file to {}", path.display()))?;

        tracing::info!("Created default configuration at {}", path.display());
        Ok(())
    }
}
