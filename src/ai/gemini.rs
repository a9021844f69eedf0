use serde_json::{json, Value};

use super::{base_url, http_client, AiError, AiRequest, AiResponse};
use crate::config::AiConfig;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub fn call(config: &AiConfig, model: &str, req: &AiRequest) -> Result<AiResponse, AiError> {
    let url = format!(
        "{}/models/{}:generateContent",
        base_url(config, DEFAULT_BASE_URL),
        model
    );

    let body = json!({
        "systemInstruction": {"parts": [{"text": req.system}]},
        "contents": [{"role": "user", "parts": [{"text": req.prompt}]}],
        "generationConfig": {
            "maxOutputTokens": req.max_tokens.unwrap_or(config.max_tokens),
            "temperature": req.temperature.unwrap_or(config.temperature),
            "responseMimeType": "application/json"
        }
    });

    let client = http_client(config)?;

    let resp = client
        .post(&url)
        .header("x-goog-api-key", &config.api_key)
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .map_err(|e| AiError(format!("Gemini request failed: {}", e)))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().unwrap_or_default();
        return Err(AiError(format!("Gemini returned {}: {}", status, text)));
    }

    let json: Value = resp
        .json()
        .map_err(|e| AiError(format!("Gemini JSON parse error: {}", e)))?;

    // A long answer can arrive split across several parts.
    let text: String = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        let reason = json
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("finishReason"))
            .and_then(|r| r.as_str())
            .unwrap_or("unknown");
        return Err(AiError(format!(
            "Gemini returned no text (finish reason: {})",
            reason
        )));
    }

    Ok(AiResponse {
        text,
        provider: "gemini".into(),
        model: model.into(),
    })
}
