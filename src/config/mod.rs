use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const DEFAULT_SECRET_KEY: &str = "dev-secret-key";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Where downloaded streams are written
    pub storage: StorageConfig,

    /// External extraction client settings
    pub extractor: ExtractorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Listen port
    pub port: u16,

    /// Key for signing flash message cookies
    pub secret_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for audio-only downloads
    pub audio_dir: PathBuf,

    /// Directory for progressive video downloads
    pub video_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Path or name of the yt-dlp executable
    pub yt_dlp_path: String,

    /// How many extractions may run at once
    pub max_concurrent_extractions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            secret_key: DEFAULT_SECRET_KEY.to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            audio_dir: PathBuf::from("audio"),
            video_dir: PathBuf::from("video"),
        }
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
            max_concurrent_extractions: 1,
        }
    }
}

impl StorageConfig {
    /// Directory that holds files of the given kind
    pub fn dir_for(&self, kind: crate::StreamKind) -> &Path {
        match kind {
            crate::StreamKind::Audio => &self.audio_dir,
            crate::StreamKind::Video => &self.video_dir,
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific YAML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path)
            .context("Failed to read config file")?;

        let config: Config = serde_yaml::from_str(&content)
            .context("Failed to parse config file")?;

        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Get configuration file path
    fn config_path() -> Option<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir().map(|dir| dir.join("tubefetch").join("config.yaml"))
    }

    /// Apply command-line and environment overrides on top of the loaded file
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        secret_key: Option<String>,
    ) -> Result<Self> {
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
        if let Some(secret_key) = secret_key {
            self.server.secret_key = secret_key;
        }

        self.validate()?;
        Ok(self)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be non-zero");
        }

        if self.server.secret_key.is_empty() {
            anyhow::bail!("Secret key must not be empty");
        }

        if self.extractor.max_concurrent_extractions == 0 {
            anyhow::bail!("max_concurrent_extractions must be at least 1");
        }

        if self.storage.audio_dir == self.storage.video_dir {
            anyhow::bail!("Audio and video directories must differ");
        }

        Ok(())
    }

    /// Socket address the web front end binds to
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .with_context(|| {
                format!("Invalid bind address {}:{}", self.server.host, self.server.port)
            })
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Host: {}", self.server.host);
        println!("  Port: {}", self.server.port);
        if self.server.secret_key == DEFAULT_SECRET_KEY {
            println!("  Secret Key: (default, set SECRET_KEY in production)");
        } else {
            println!("  Secret Key: (set)");
        }
        println!("  Audio Directory: {}", self.storage.audio_dir.display());
        println!("  Video Directory: {}", self.storage.video_dir.display());
        println!("  yt-dlp: {}", self.extractor.yt_dlp_path);
        println!("  Max Concurrent Extractions: {}", self.extractor.max_concurrent_extractions);
        if let Some(path) = Self::config_path() {
            println!("  Config File: {}", path.display());
        }
    }
}
