use serde_json::{json, Value};

use super::{base_url, http_client, AiError, AiRequest, AiResponse};
use crate::config::AiConfig;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub fn call(config: &AiConfig, model: &str, req: &AiRequest) -> Result<AiResponse, AiError> {
    let url = format!("{}/chat/completions", base_url(config, DEFAULT_BASE_URL));
    chat_completion(config, &url, "OpenAI", "openai", model, req)
}

/// POST an OpenAI-style chat completion. Groq speaks the same protocol.
pub(super) fn chat_completion(
    config: &AiConfig,
    url: &str,
    label: &str,
    provider: &str,
    model: &str,
    req: &AiRequest,
) -> Result<AiResponse, AiError> {
    let body = json!({
        "model": model,
        "messages": [
            {"role": "system", "content": req.system},
            {"role": "user", "content": req.prompt}
        ],
        "max_tokens": req.max_tokens.unwrap_or(config.max_tokens),
        "temperature": req.temperature.unwrap_or(config.temperature)
    });

    let client = http_client(config)?;

    let resp = client
        .post(url)
        .header("Authorization", format!("Bearer {}", config.api_key))
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .map_err(|e| AiError(format!("{} request failed: {}", label, e)))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().unwrap_or_default();
        return Err(AiError(format!("{} returned {}: {}", label, status, text)));
    }

    let json: Value = resp
        .json()
        .map_err(|e| AiError(format!("{} JSON parse error: {}", label, e)))?;

    let text = json
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .unwrap_or("")
        .to_string();

    if text.is_empty() {
        return Err(AiError(format!("{} returned an empty completion", label)));
    }

    Ok(AiResponse {
        text,
        provider: provider.into(),
        model: model.into(),
    })
}
