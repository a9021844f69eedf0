use super::{base_url, openai, AiError, AiRequest, AiResponse};
use crate::config::AiConfig;

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

pub fn call(config: &AiConfig, model: &str, req: &AiRequest) -> Result<AiResponse, AiError> {
    let url = format!("{}/chat/completions", base_url(config, DEFAULT_BASE_URL));
    openai::chat_completion(config, &url, "Groq", "groq", model, req)
}
