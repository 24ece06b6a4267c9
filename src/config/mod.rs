use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable that overrides `provider.proxy`
pub const PROXY_ENV: &str = "TRANSCRIPT_PROXY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Transcript provider settings
    pub provider: ProviderConfig,

    /// Language selection settings
    pub resolver: ResolverConfig,

    /// Log output settings
    pub logging: LoggingConfig,

    /// File the configuration was read from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Scheme and host of the video site
    pub base_url: String,

    /// Value sent as the Accept-Language header
    pub accept_language: String,

    /// User agent for all requests
    pub user_agent: String,

    /// Innertube client version reported to the player endpoint
    pub client_version: String,

    /// Optional proxy URL for all requests
    pub proxy: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Language tried when the requested one has no transcript
    pub fallback_language: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Emit log lines as JSON objects
    pub json: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.youtube.com".to_string(),
            accept_language: "en-US".to_string(),
            user_agent: concat!("transcript-resolver/", env!("CARGO_PKG_VERSION")).to_string(),
            client_version: "20.10.38".to_string(),
            proxy: None,
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            fallback_language: "en".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from an explicit file, the usual locations, or defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from(path)?,
            None => match Self::config_path() {
                Some(path) => Self::load_from(&path)?,
                None => Self::default(),
            },
        };

        if let Ok(proxy) = std::env::var(PROXY_ENV) {
            if !proxy.is_empty() {
                config.provider.proxy = Some(proxy);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML configuration file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path)
            .context("Failed to read config file")?;

        let mut config: Config = serde_yaml::from_str(&content)
            .context("Failed to parse config file")?;

        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// First existing configuration file, if any
    fn config_path() -> Option<PathBuf> {
        let local_config = PathBuf::from("transcript.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir()
            .map(|dir| dir.join("transcript-resolver").join("config.yaml"))
            .filter(|path| path.exists())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let parsed = Url::parse(&self.provider.base_url)
            .with_context(|| format!("Invalid provider base_url: {}", self.provider.base_url))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("Provider base_url must use HTTP or HTTPS protocol");
        }

        if self.resolver.fallback_language.trim().is_empty() {
            anyhow::bail!("Resolver fallback_language must not be empty");
        }

        Ok(())
    }
}
