use anyhow::Result;
use std::env;
use std::path::PathBuf;

use crate::pubmed::DEFAULT_EUTILS_URL;
use crate::throttle::DEFAULT_DELAY_MS;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub pubmed: PubMedConfig,
    pub ai: AiConfig,
    pub client: ClientConfig,
    /// Minimum spacing between any two outbound upstream calls
    pub rate_limit_delay_ms: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
    pub static_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct PubMedConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

#[derive(Clone)]
pub struct AiConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
}

// Redacted: the config is logged at startup.
impl std::fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<set>" })
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub proxy_url: String,
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: 3000,
                host: "0.0.0.0".to_string(),
                cors_allowed_origins: vec!["*".to_string()],
                static_dir: PathBuf::from("public"),
            },
            pubmed: PubMedConfig {
                base_url: DEFAULT_EUTILS_URL.to_string(),
                api_key: None,
            },
            ai: AiConfig {
                base_url: "https://gen.pollinations.ai".to_string(),
                model: "openai".to_string(),
                api_key: String::new(),
            },
            client: ClientConfig {
                proxy_url: "http://localhost:3000".to_string(),
                data_dir: default_data_dir(),
            },
            rate_limit_delay_ms: DEFAULT_DELAY_MS,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| defaults.server.port.to_string())
                    .parse()?,
                host: env::var("HOST").unwrap_or(defaults.server.host),
                cors_allowed_origins: env::var("ALLOWED_ORIGINS")
                    .map(|v| {
                        v.split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or(defaults.server.cors_allowed_origins),
                static_dir: env::var("STATIC_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.server.static_dir),
            },
            pubmed: PubMedConfig {
                base_url: env::var("PUBMED_BASE_URL").unwrap_or(defaults.pubmed.base_url),
                api_key: env::var("NCBI_API_KEY").ok().filter(|k| !k.is_empty()),
            },
            ai: AiConfig {
                base_url: env::var("AI_BASE_URL").unwrap_or(defaults.ai.base_url),
                model: env::var("AI_MODEL").unwrap_or(defaults.ai.model),
                // Not validated: a missing key shows up as upstream auth failures.
                api_key: env::var("API_KEY").unwrap_or_default(),
            },
            client: ClientConfig {
                proxy_url: env::var("PROXY_URL").unwrap_or(defaults.client.proxy_url),
                data_dir: env::var("DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.client.data_dir),
            },
            rate_limit_delay_ms: env::var("RATE_LIMIT_DELAY_MS")
                .unwrap_or_else(|_| defaults.rate_limit_delay_ms.to_string())
                .parse()?,
        })
    }

    pub fn rate_limit_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.rate_limit_delay_ms)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pubmed-ai")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.rate_limit_delay_ms, 350);
        assert!(config.pubmed.base_url.starts_with("https://eutils.ncbi.nlm.nih.gov"));
        assert!(config.client.data_dir.ends_with("pubmed-ai"));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let mut config = Config::default();
        config.ai.api_key = "sk-secret".to_string();
        let printed = format!("{:?}", config.ai);
        assert!(!printed.contains("sk-secret"));
        assert!(printed.contains("<set>"));
    }
}
