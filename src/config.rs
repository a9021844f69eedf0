use std::path::Path;

use rocket::figment::providers::{Env, Format, Serialized, Toml};
use rocket::figment::Figment;
use serde::{Deserialize, Serialize};

use crate::ai::extract::PayloadContract;

pub const CONFIG_FILE: &str = "shopscribe.toml";
const ENV_PREFIX: &str = "SHOPSCRIBE_";

// ── Sections ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ai: AiConfig,
    pub shopify: ShopifyConfig,
    pub rate_limit: RateLimitConfig,
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// One of: openai, gemini, ollama, groq
    pub provider: String,
    /// Empty means the provider's default model.
    pub model: String,
    pub api_key: String,
    /// Empty means the provider's public endpoint.
    pub base_url: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig {
            provider: "openai".into(),
            model: String::new(),
            api_key: String::new(),
            base_url: String::new(),
            max_tokens: 8192,
            temperature: 0.7,
            request_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopifyConfig {
    pub api_version: String,
    /// Title of the blog created when the store has none.
    pub default_blog_title: String,
    pub author_name: String,
    pub request_timeout_secs: u64,
}

impl Default for ShopifyConfig {
    fn default() -> Self {
        ShopifyConfig {
            api_version: "2024-10".into(),
            default_blog_title: "News".into(),
            author_name: "Store Admin".into(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_requests: u64,
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        RateLimitConfig {
            max_requests: 10,
            window_secs: 3600,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub contract: PayloadContract,
}

// ── Loading ───────────────────────────────────────────

/// Load configuration. Merge order, later wins:
/// compiled defaults, `shopscribe.toml`, `SHOPSCRIBE_*` environment variables.
pub fn load() -> Result<Config, rocket::figment::Error> {
    load_from_path(Path::new(CONFIG_FILE))
}

pub fn load_from_path(path: &Path) -> Result<Config, rocket::figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

#[cfg(test)]
pub fn load_from_str(toml: &str) -> Result<Config, rocket::figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::string(toml))
        .extract()
}

/// `SHOPSCRIBE_AI_API_KEY` maps to `ai.api_key`, `SHOPSCRIBE_RATE_LIMIT_MAX_REQUESTS`
/// to `rate_limit.max_requests`. Only the leading section name is rewritten since
/// key names contain underscores too.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).map(|key| section_key(key.as_str()).into())
}

fn section_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in ["rate_limit", "generation", "shopify", "ai"] {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{}.{}", section, rest);
        }
    }
    key
}

impl Config {
    /// Sanity checks that cannot be expressed through serde defaults.
    pub fn check(&self) -> Result<(), String> {
        if crate::ai::Provider::from_str(&self.ai.provider).is_none() {
            return Err(format!("unknown ai.provider '{}'", self.ai.provider));
        }
        if self.rate_limit.max_requests == 0 {
            return Err("rate_limit.max_requests must be at least 1".into());
        }
        if self.rate_limit.window_secs == 0 {
            return Err("rate_limit.window_secs must be at least 1".into());
        }
        if self.shopify.default_blog_title.trim().is_empty() {
            return Err("shopify.default_blog_title must not be empty".into());
        }
        Ok(())
    }
}
