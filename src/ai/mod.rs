pub mod extract;
pub mod gemini;
pub mod groq;
pub mod ollama;
pub mod openai;
pub mod prompts;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::AiConfig;

// ── Types ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiResponse {
    pub text: String,
    pub provider: String,
    pub model: String,
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct AiError(pub String);

/// Anything that turns a prompt into raw model text.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, req: &AiRequest) -> Result<AiResponse, AiError>;
    fn provider_name(&self) -> &str;
    fn model(&self) -> &str;

    /// False when a call is certain to fail for lack of credentials.
    fn is_configured(&self) -> bool {
        true
    }
}

// ── Provider Enum ─────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Provider {
    OpenAi,
    Gemini,
    Ollama,
    Groq,
}

impl Provider {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "openai" => Some(Self::OpenAi),
            "gemini" => Some(Self::Gemini),
            "ollama" => Some(Self::Ollama),
            "groq" => Some(Self::Groq),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
            Self::Ollama => "ollama",
            Self::Groq => "groq",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o",
            Self::Gemini => "gemini-1.5-pro",
            Self::Ollama => "llama3.1",
            Self::Groq => "llama-3.3-70b-versatile",
        }
    }

    fn needs_api_key(&self) -> bool {
        !matches!(self, Self::Ollama)
    }
}

// ── HTTP-backed generator ─────────────────────────────

/// Calls the single configured provider. No failover and no retry:
/// a failed call is reported to the caller as-is.
pub struct HttpGenerator {
    provider: Provider,
    model: String,
    config: AiConfig,
}

impl HttpGenerator {
    pub fn from_config(config: &AiConfig) -> Result<Self, AiError> {
        let provider = Provider::from_str(&config.provider)
            .ok_or_else(|| AiError(format!("Unknown AI provider '{}'", config.provider)))?;
        let model = if config.model.trim().is_empty() {
            provider.default_model().to_string()
        } else {
            config.model.trim().to_string()
        };
        Ok(HttpGenerator {
            provider,
            model,
            config: config.clone(),
        })
    }
}

impl TextGenerator for HttpGenerator {
    fn generate(&self, req: &AiRequest) -> Result<AiResponse, AiError> {
        if !self.is_configured() {
            return Err(AiError(format!(
                "{} API key not configured",
                self.provider.name()
            )));
        }
        log::info!(
            "[ai] Calling {} ({}) with a {} char prompt",
            self.provider.name(),
            self.model,
            req.prompt.len()
        );
        let result = match self.provider {
            Provider::OpenAi => openai::call(&self.config, &self.model, req),
            Provider::Gemini => gemini::call(&self.config, &self.model, req),
            Provider::Ollama => ollama::call(&self.config, &self.model, req),
            Provider::Groq => groq::call(&self.config, &self.model, req),
        };
        if let Err(ref e) = result {
            log::warn!("[ai] AI provider {} failed: {}", self.provider.name(), e);
        }
        result
    }

    fn provider_name(&self) -> &str {
        self.provider.name()
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_configured(&self) -> bool {
        !self.provider.needs_api_key() || !self.config.api_key.is_empty()
    }
}

/// Blocking client shared by every provider adapter.
pub(crate) fn http_client(config: &AiConfig) -> Result<reqwest::blocking::Client, AiError> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .map_err(|e| AiError(format!("HTTP client error: {}", e)))
}

/// Base URL override, or the provider's public endpoint.
pub(crate) fn base_url(config: &AiConfig, default: &str) -> String {
    let base = config.base_url.trim();
    if base.is_empty() {
        default.to_string()
    } else {
        base.trim_end_matches('/').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_round_trip() {
        for p in [Provider::OpenAi, Provider::Gemini, Provider::Ollama, Provider::Groq] {
            assert_eq!(Provider::from_str(p.name()), Some(p));
        }
        assert_eq!(Provider::from_str("cloudflare"), None);
    }

    #[test]
    fn generator_uses_default_model() {
        let cfg = AiConfig {
            provider: "groq".into(),
            ..AiConfig::default()
        };
        let gen = HttpGenerator::from_config(&cfg).unwrap();
        assert_eq!(gen.model(), "llama-3.3-70b-versatile");
        assert!(!gen.is_configured());
    }

    #[test]
    fn ollama_needs_no_key() {
        let cfg = AiConfig {
            provider: "ollama".into(),
            model: " mistral ".into(),
            ..AiConfig::default()
        };
        let gen = HttpGenerator::from_config(&cfg).unwrap();
        assert_eq!(gen.model(), "mistral");
        assert!(gen.is_configured());
    }

    #[test]
    fn missing_key_fails_without_network() {
        let gen = HttpGenerator::from_config(&AiConfig::default()).unwrap();
        let req = AiRequest {
            system: "s".into(),
            prompt: "p".into(),
            max_tokens: None,
            temperature: None,
        };
        let err = gen.generate(&req).unwrap_err();
        assert_eq!(err.to_string(), "openai API key not configured");
    }

    #[test]
    fn base_url_override_is_trimmed() {
        let mut cfg = AiConfig::default();
        assert_eq!(base_url(&cfg, "https://x/v1"), "https://x/v1");
        cfg.base_url = "http://proxy.local/v1/".into();
        assert_eq!(base_url(&cfg, "https://x/v1"), "http://proxy.local/v1");
    }
}
