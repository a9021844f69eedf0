use serde_json::{json, Value};

use super::{base_url, http_client, AiError, AiRequest, AiResponse};
use crate::config::AiConfig;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";

pub fn call(config: &AiConfig, model: &str, req: &AiRequest) -> Result<AiResponse, AiError> {
    let url = format!("{}/api/chat", base_url(config, DEFAULT_BASE_URL));

    let body = json!({
        "model": model,
        "messages": [
            {"role": "system", "content": req.system},
            {"role": "user", "content": req.prompt}
        ],
        "stream": false,
        "format": "json",
        "options": {
            "temperature": req.temperature.unwrap_or(config.temperature),
            "num_predict": req.max_tokens.unwrap_or(config.max_tokens)
        }
    });

    let client = http_client(config)?;

    let resp = client
        .post(&url)
        .json(&body)
        .send()
        .map_err(|e| AiError(format!("Ollama request failed: {}", e)))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().unwrap_or_default();
        return Err(AiError(format!("Ollama returned {}: {}", status, text)));
    }

    let json: Value = resp
        .json()
        .map_err(|e| AiError(format!("Ollama JSON parse error: {}", e)))?;

    let text = json
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .unwrap_or("")
        .to_string();

    if text.is_empty() {
        return Err(AiError("Ollama returned an empty message".into()));
    }

    Ok(AiResponse {
        text,
        provider: "ollama".into(),
        model: model.into(),
    })
}
