//! Application configuration for DocAnalyzer.
//!
//! User config lives at `~/.docanalyzer/docanalyzer.toml`.
//! Environment variables override config file values, which override defaults.
//! CLI flags are applied last by the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AnalyzerError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "docanalyzer.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".docanalyzer";

/// Site URL sent as `HTTP-Referer` in production deployments.
const PRODUCTION_SITE_URL: &str = "https://llmapi-flax.vercel.app/";

/// Site URL sent as `HTTP-Referer` everywhere else.
const DEVELOPMENT_SITE_URL: &str = "http://localhost:3000";

/// Default system instruction for the completion call.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant that provides direct, concise answers based on the document provided. If calculations are needed, show your work briefly.";

// ---------------------------------------------------------------------------
// Config structs (matching docanalyzer.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Completion provider settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Fixed sampling parameters sent with every question.
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Per-session result cache.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Answer rendering.
    #[serde(default)]
    pub render: RenderConfig,

    /// Reference document override.
    #[serde(default)]
    pub document: DocumentConfig,
}

/// `[provider]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Full chat-completions endpoint URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Value for the `HTTP-Referer` header. Derived from the environment when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,

    /// Value for the `X-Title` header.
    #[serde(default = "default_site_name")]
    pub site_name: String,

    /// Timeout for one completion request, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// System instruction sent ahead of the document and question.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key_env: default_api_key_env(),
            model: default_model(),
            site_url: None,
            site_name: default_site_name(),
            timeout_secs: default_timeout_secs(),
            system_prompt: default_system_prompt(),
        }
    }
}

fn default_api_url() -> String {
    "https://openrouter.ai/api/v1/chat/completions".into()
}
fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".into()
}
fn default_model() -> String {
    "anthropic/claude-3-haiku".into()
}
fn default_site_name() -> String {
    "Document Analysis App".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.into()
}

/// `[sampling]` section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Maximum output length in tokens.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus-sampling cutoff.
    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
        }
    }
}

fn default_max_tokens() -> u32 {
    300
}
fn default_temperature() -> f32 {
    0.2
}
fn default_top_p() -> f32 {
    0.8
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address the HTTP server binds to.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".into()
}

/// Which cached questions may short-circuit a new request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheScope {
    /// Only a repeat of the most recently answered question is served from cache.
    #[default]
    Last,
    /// Any previously answered question is served from cache.
    Any,
}

/// `[cache]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum cached answers per session; `0` means unbounded.
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,

    /// Cache-hit scope.
    #[serde(default)]
    pub scope: CacheScope,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            scope: CacheScope::default(),
        }
    }
}

fn default_cache_capacity() -> usize {
    128
}

/// `[render]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Domain terms emphasized in rendered answers.
    #[serde(default = "default_terms")]
    pub terms: Vec<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            terms: default_terms(),
        }
    }
}

fn default_terms() -> Vec<String> {
    [
        "ExponentX",
        "IT Consulting",
        "Cloud Solutions",
        "Automation",
        "AI",
        "Enterprise-Ready",
        "Digital transformation",
        "CRM",
        "ERP",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// `[document]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// Read the reference document from this file instead of the built-in profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Provider settings (runtime, resolved from config + environment)
// ---------------------------------------------------------------------------

/// Runtime provider configuration with the API key resolved from the environment.
#[derive(Clone)]
pub struct ProviderSettings {
    /// Chat-completions endpoint.
    pub api_url: Url,
    /// Bearer token; `None` when the env var is unset or empty.
    pub api_key: Option<String>,
    /// Env var the key was read from, for error messages.
    pub api_key_env: String,
    /// Model identifier.
    pub model: String,
    /// `HTTP-Referer` header value.
    pub site_url: String,
    /// `X-Title` header value.
    pub site_name: String,
    /// Request timeout.
    pub timeout: Duration,
    /// System instruction.
    pub system_prompt: String,
    /// Sampling parameters.
    pub sampling: SamplingConfig,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("api_url", &self.api_url.as_str())
            .field(
                "api_key",
                &if self.api_key.is_some() {
                    "[REDACTED]"
                } else {
                    "not set"
                },
            )
            .field("model", &self.model)
            .field("site_url", &self.site_url)
            .field("site_name", &self.site_name)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProviderSettings {
    /// Resolve settings from config, reading the key and environment from the process env.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::resolve(config, |name| std::env::var(name).ok())
    }

    /// Resolve settings using `lookup` for environment access.
    pub fn resolve(config: &AppConfig, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let provider = &config.provider;

        let api_url = Url::parse(&provider.api_url).map_err(|e| {
            AnalyzerError::config(format!("invalid provider.api_url '{}': {e}", provider.api_url))
        })?;

        if provider.timeout_secs == 0 {
            return Err(AnalyzerError::config("provider.timeout_secs must be positive"));
        }

        let api_key = lookup(&provider.api_key_env).filter(|k| !k.is_empty());

        let site_url = provider.site_url.clone().unwrap_or_else(|| {
            match lookup("DOCANALYZER_ENV").as_deref() {
                Some("production") => PRODUCTION_SITE_URL.to_string(),
                _ => DEVELOPMENT_SITE_URL.to_string(),
            }
        });

        Ok(Self {
            api_url,
            api_key,
            api_key_env: provider.api_key_env.clone(),
            model: provider.model.clone(),
            site_url,
            site_name: provider.site_name.clone(),
            timeout: Duration::from_secs(provider.timeout_secs),
            system_prompt: provider.system_prompt.clone(),
            sampling: config.sampling,
        })
    }

    /// The API key, or a config error naming the env var to set.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            AnalyzerError::config(format!(
                "{} is not set in environment variables",
                self.api_key_env
            ))
        })
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.docanalyzer/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| AnalyzerError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.docanalyzer/docanalyzer.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk and apply environment overrides.
/// Missing file means defaults.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    let mut config = if path.exists() {
        load_config_from(&path)?
    } else {
        tracing::debug!(?path, "config file not found, using defaults");
        AppConfig::default()
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    Ok(config)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AnalyzerError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| AnalyzerError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Overlay environment variables on top of file/default values.
pub fn apply_env_overrides(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(url) = non_empty("OPENROUTER_API_URL") {
        config.provider.api_url = url;
    }
    if let Some(model) = non_empty("OPENROUTER_MODEL") {
        config.provider.model = model;
    }
    if let Some(site_url) = non_empty("SITE_URL") {
        config.provider.site_url = Some(site_url);
    }
    if let Some(site_name) = non_empty("SITE_NAME") {
        config.provider.site_name = site_name;
    }
    if let Some(bind) = non_empty("DOCANALYZER_BIND") {
        config.server.bind = bind;
    }
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| AnalyzerError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| AnalyzerError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| AnalyzerError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the provider API key env var is set and non-empty.
pub fn validate_api_key(config: &AppConfig) -> Result<()> {
    let var_name = &config.provider.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(()),
        _ => Err(AnalyzerError::config(format!(
            "OpenRouter API key not found. Set the {var_name} environment variable.\n\
             Get a key at https://openrouter.ai/keys"
        ))),
    }
}
