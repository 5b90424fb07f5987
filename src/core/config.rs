use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

/// Placeholder shipped in sample configs in place of a real API key.
pub const PLACEHOLDER_KEY: &str = "demo";

/// Whether a provider is called over the network or replaced by synthetic data.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderMode {
    Real,
    Synthetic,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProviderConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Explicit mode. When absent the mode is derived from the API key.
    #[serde(default)]
    pub mode: Option<ProviderMode>,
}

impl ProviderConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_key: None,
            mode: None,
        }
    }

    /// A blank key or the `demo` placeholder counts as no key.
    fn has_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| {
            let k = k.trim();
            !k.is_empty() && !k.eq_ignore_ascii_case(PLACEHOLDER_KEY)
        })
    }

    /// Resolves the mode once at startup. A provider that needs a key and has
    /// none falls back to synthetic data unless `mode: real` was requested.
    pub fn resolved_mode(&self, requires_key: bool) -> ProviderMode {
        match self.mode {
            Some(mode) => mode,
            None if requires_key && !self.has_key() => ProviderMode::Synthetic,
            None => ProviderMode::Real,
        }
    }

    /// Key for providers that require one; empty for keyless providers.
    pub fn key(&self) -> &str {
        self.api_key.as_deref().unwrap_or_default()
    }
}

fn default_alpha_vantage() -> ProviderConfig {
    ProviderConfig::new("https://www.alphavantage.co")
}

fn default_finnhub() -> ProviderConfig {
    ProviderConfig::new("https://finnhub.io/api/v1")
}

fn default_exchange_rate_api() -> ProviderConfig {
    ProviderConfig::new("https://v6.exchangerate-api.com")
}

fn default_frankfurter() -> ProviderConfig {
    ProviderConfig::new("https://api.frankfurter.app")
}

fn default_news_api() -> ProviderConfig {
    ProviderConfig::new("https://newsapi.org")
}

fn default_news_feed() -> ProviderConfig {
    ProviderConfig::new("http://localhost:3000")
}

fn default_fred() -> ProviderConfig {
    ProviderConfig::new("https://api.stlouisfed.org")
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProvidersConfig {
    #[serde(default = "default_alpha_vantage")]
    pub alpha_vantage: ProviderConfig,
    #[serde(default = "default_finnhub")]
    pub finnhub: ProviderConfig,
    #[serde(default = "default_exchange_rate_api")]
    pub exchange_rate_api: ProviderConfig,
    #[serde(default = "default_frankfurter")]
    pub frankfurter: ProviderConfig,
    #[serde(default = "default_news_api")]
    pub news_api: ProviderConfig,
    #[serde(default = "default_news_feed")]
    pub news_feed: ProviderConfig,
    #[serde(default = "default_fred")]
    pub fred: ProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            alpha_vantage: default_alpha_vantage(),
            finnhub: default_finnhub(),
            exchange_rate_api: default_exchange_rate_api(),
            frankfurter: default_frankfurter(),
            news_api: default_news_api(),
            news_feed: default_news_feed(),
            fred: default_fred(),
        }
    }
}

impl ProvidersConfig {
    /// Providers that need an API key, with the environment variable that
    /// can supply it.
    fn keyed_mut(&mut self) -> [(&'static str, &mut ProviderConfig); 5] {
        [
            ("FINFEED_ALPHA_VANTAGE_API_KEY", &mut self.alpha_vantage),
            ("FINFEED_FINNHUB_API_KEY", &mut self.finnhub),
            ("FINFEED_EXCHANGE_RATE_API_KEY", &mut self.exchange_rate_api),
            ("FINFEED_NEWS_API_KEY", &mut self.news_api),
            ("FINFEED_FRED_API_KEY", &mut self.fred),
        ]
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: "finfeed/1.0".to_string(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub quote_ttl_secs: u64,
    pub currency_ttl_secs: u64,
    pub news_ttl_secs: u64,
    pub indicator_ttl_secs: u64,
    pub synthetic_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            quote_ttl_secs: 300,
            currency_ttl_secs: 3600,
            news_ttl_secs: 900,
            indicator_ttl_secs: 86400,
            synthetic_ttl_secs: 60,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct AppConfig {
    /// Serve synthetic data for every domain without touching the network.
    #[serde(default)]
    pub demo: bool,
    /// Share one upstream call between concurrent requests for the same key.
    #[serde(default)]
    pub coalesce_requests: bool,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            let mut config = Self::default();
            config.apply_env();
            config.validate()?;
            return Ok(config);
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "finfeed", "finfeed")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let mut config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.apply_env();
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Fills API keys missing from the file with `FINFEED_*_API_KEY` variables.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for (var, provider) in self.providers.keyed_mut() {
            if provider.api_key.is_none()
                && let Some(key) = lookup(var)
            {
                debug!("Using API key from {}", var);
                provider.api_key = Some(key);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.http.timeout_secs == 0 {
            bail!("http.timeout_secs must be greater than zero");
        }
        let ttls = [
            ("quote_ttl_secs", self.cache.quote_ttl_secs),
            ("currency_ttl_secs", self.cache.currency_ttl_secs),
            ("news_ttl_secs", self.cache.news_ttl_secs),
            ("indicator_ttl_secs", self.cache.indicator_ttl_secs),
            ("synthetic_ttl_secs", self.cache.synthetic_ttl_secs),
        ];
        for (name, ttl) in ttls {
            if ttl == 0 {
                bail!("cache.{} must be greater than zero", name);
            }
        }

        let keyed = [
            ("alpha_vantage", &self.providers.alpha_vantage),
            ("finnhub", &self.providers.finnhub),
            ("exchange_rate_api", &self.providers.exchange_rate_api),
            ("news_api", &self.providers.news_api),
            ("fred", &self.providers.fred),
        ];
        for (name, provider) in keyed {
            if provider.mode == Some(ProviderMode::Real) && !provider.has_key() {
                bail!("providers.{} is set to real mode but has no api_key", name);
            }
        }
        Ok(())
    }

    /// Effective mode for a provider, taking the global demo switch into account.
    pub fn mode_for(&self, provider: &ProviderConfig, requires_key: bool) -> ProviderMode {
        if self.demo {
            ProviderMode::Synthetic
        } else {
            provider.resolved_mode(requires_key)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
coalesce_requests: true
http:
  timeout_secs: 5
cache:
  quote_ttl_secs: 120
providers:
  alpha_vantage:
    base_url: "http://example.com/av"
    api_key: "av-key"
  finnhub:
    base_url: "http://example.com/finnhub"
    mode: synthetic
  frankfurter:
    base_url: "http://example.com/fx"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert!(!config.demo);
        assert!(config.coalesce_requests);
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.http.user_agent, "finfeed/1.0");
        assert_eq!(config.cache.quote_ttl_secs, 120);
        assert_eq!(config.cache.currency_ttl_secs, 3600);
        assert_eq!(config.providers.alpha_vantage.base_url, "http://example.com/av");
        assert_eq!(config.providers.alpha_vantage.key(), "av-key");
        assert_eq!(config.providers.finnhub.mode, Some(ProviderMode::Synthetic));
        assert_eq!(config.providers.frankfurter.base_url, "http://example.com/fx");
        // Sections left out fall back to defaults
        assert_eq!(config.providers.news_api.base_url, "https://newsapi.org");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.http.timeout(), Duration::from_secs(10));
        assert_eq!(config.cache.synthetic_ttl_secs, 60);
    }

    #[test]
    fn test_mode_resolution() {
        let mut provider = ProviderConfig::new("http://example.com");
        assert_eq!(provider.resolved_mode(true), ProviderMode::Synthetic);
        assert_eq!(provider.resolved_mode(false), ProviderMode::Real);

        provider.api_key = Some("   ".to_string());
        assert_eq!(provider.resolved_mode(true), ProviderMode::Synthetic);

        provider.api_key = Some("secret".to_string());
        assert_eq!(provider.resolved_mode(true), ProviderMode::Real);

        provider.api_key = Some(" DEMO ".to_string());
        assert_eq!(provider.resolved_mode(true), ProviderMode::Synthetic);

        provider.mode = Some(ProviderMode::Synthetic);
        assert_eq!(provider.resolved_mode(true), ProviderMode::Synthetic);
    }

    #[test]
    fn test_demo_overrides_every_provider() {
        let mut config = AppConfig::default();
        config.providers.alpha_vantage.api_key = Some("secret".to_string());
        assert_eq!(
            config.mode_for(&config.providers.alpha_vantage, true),
            ProviderMode::Real
        );

        config.demo = true;
        assert_eq!(
            config.mode_for(&config.providers.alpha_vantage, true),
            ProviderMode::Synthetic
        );
        assert_eq!(
            config.mode_for(&config.providers.frankfurter, false),
            ProviderMode::Synthetic
        );
    }

    #[test]
    fn test_real_mode_without_key_is_rejected() {
        let yaml_str = r#"
providers:
  news_api:
    base_url: "https://newsapi.org"
    mode: real
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("providers.news_api"));
    }

    #[test]
    fn test_real_mode_with_placeholder_key_is_rejected() {
        let yaml_str = r#"
providers:
  finnhub:
    base_url: "https://finnhub.io/api/v1"
    api_key: demo
    mode: real
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "providers.finnhub is set to real mode but has no api_key"
        );
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let config: AppConfig = serde_yaml::from_str("http:\n  timeout_secs: 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_fills_missing_keys_only() {
        let mut config = AppConfig::default();
        config.providers.finnhub.api_key = Some("from-file".to_string());

        let env: HashMap<&str, &str> = [
            ("FINFEED_ALPHA_VANTAGE_API_KEY", "from-env"),
            ("FINFEED_FINNHUB_API_KEY", "ignored"),
        ]
        .into_iter()
        .collect();
        config.apply_env_from(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.providers.alpha_vantage.key(), "from-env");
        assert_eq!(config.providers.finnhub.key(), "from-file");
        assert!(config.providers.fred.api_key.is_none());
    }

    #[test]
    fn test_load_from_path() -> Result<()> {
        let file = tempfile::NamedTempFile::new()?;
        fs::write(file.path(), "demo: true\n")?;

        let config = AppConfig::load_from_path(file.path())?;
        assert!(config.demo);
        Ok(())
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let err = AppConfig::load_from_path("/nonexistent/finfeed.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
