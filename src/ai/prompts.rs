use crate::ai::extract::PayloadContract;
use crate::validate::{AudienceLevel, GenerationRequest, SearchIntent, Tone};

/// System prompt for article generation
pub fn blog_system() -> String {
    "You are a senior SEO content strategist and copywriter for e-commerce brands. \
     You write original, well-researched articles that follow search-quality guidelines. \
     Always respond with a single valid JSON object exactly as specified. \
     Do not include markdown fences or any text outside the JSON."
        .to_string()
}

fn intent_guidance(intent: SearchIntent) -> &'static str {
    match intent {
        SearchIntent::Informational => "answer the reader's question thoroughly and teach the topic",
        SearchIntent::Commercial => "help the reader compare options before a purchase decision",
        SearchIntent::Transactional => "guide the reader toward buying, with clear next steps",
        SearchIntent::Navigational => "help the reader find the specific brand, product or page they want",
    }
}

fn audience_guidance(level: AudienceLevel) -> &'static str {
    match level {
        AudienceLevel::Beginner => "assume no prior knowledge and define terms",
        AudienceLevel::Intermediate => "assume basic familiarity and skip the fundamentals",
        AudienceLevel::Advanced => "go deep on specifics, trade-offs and edge cases",
        AudienceLevel::Expert => "write for practitioners; cite specifics and nuance",
    }
}

fn tone_guidance(tone: Tone) -> &'static str {
    match tone {
        Tone::Professional => "clear, polished and businesslike",
        Tone::Conversational => "warm and chatty, as if talking to a friend",
        Tone::Authoritative => "confident and evidence-led",
        Tone::Friendly => "upbeat and approachable",
        Tone::Educational => "patient and structured like a good lesson",
        Tone::Persuasive => "compelling, benefit-focused and action-oriented",
    }
}

/// Generate an SEO blog article. Every interpolated value comes from a
/// validated [`GenerationRequest`], so none of them can carry quotes,
/// newlines or other characters that would change the template's shape.
pub fn blog_article(req: &GenerationRequest, contract: PayloadContract) -> String {
    let secondary = if req.secondary_keywords.is_empty() {
        "none".to_string()
    } else {
        req.secondary_keywords.clone()
    };

    let strict_fields = match contract {
        PayloadContract::Standard => "",
        PayloadContract::Strict => {
            ",\n  \"competitiveAnalysis\": {\"commonTopics\": [\"...\"], \"contentGaps\": [\"...\"], \"differentiators\": [\"...\"]},\n  \
             \"eeatSignals\": {\"experience\": \"...\", \"expertise\": \"...\", \"authoritativeness\": \"...\", \"trustworthiness\": \"...\"}"
        }
    };

    format!(
        "Write an SEO blog article for an online store.\n\n\
         Primary keyword: {keyword}\n\
         Secondary keywords: {secondary}\n\
         Search intent: {intent} ({intent_guidance})\n\
         Target market: {market}\n\
         Audience level: {audience} ({audience_guidance})\n\
         Tone: {tone} ({tone_guidance})\n\
         Target length: about {words} words\n\n\
         Requirements:\n\
         - Propose 3 title options (≤60 chars, primary keyword near the start) and pick the best one\n\
         - Use HTML formatting (h2, h3, p, ul/li, strong, em); do NOT include an h1 tag\n\
         - Use the primary keyword in the first 100 words and in at least one h2\n\
         - Work secondary keywords in naturally; never keyword-stuff\n\
         - Include an engaging introduction, 4-7 sections with subheadings and a conclusion with a call to action\n\
         - Add a short FAQ section answering 3 common questions\n\
         - Write a meta description of 120-155 characters\n\
         - Suggest a URL slug (lowercase, hyphens, 3-6 words) and 3-6 tags\n\
         - Use spelling and references appropriate for {market}\n\n\
         Respond as JSON:\n\
         {{\n  \
         \"titleOptions\": [\"...\", \"...\", \"...\"],\n  \
         \"selectedTitle\": \"...\",\n  \
         \"slug\": \"...\",\n  \
         \"metaDescription\": \"...\",\n  \
         \"excerpt\": \"...\",\n  \
         \"articleContent\": \"<h2>...</h2><p>...</p>\",\n  \
         \"tags\": [\"...\"],\n  \
         \"contentStrategy\": {{\"angle\": \"...\", \"keywordPlacement\": \"...\"}}{strict_fields}\n\
         }}",
        keyword = req.primary_keyword,
        secondary = secondary,
        intent = req.search_intent,
        intent_guidance = intent_guidance(req.search_intent),
        market = req.target_country.market_name(),
        audience = req.audience_level,
        audience_guidance = audience_guidance(req.audience_level),
        tone = req.tone,
        tone_guidance = tone_guidance(req.tone),
        words = req.word_count,
        strict_fields = strict_fields,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::TargetCountry;

    fn request() -> GenerationRequest {
        GenerationRequest {
            primary_keyword: "sustainable fashion".into(),
            secondary_keywords: String::new(),
            search_intent: SearchIntent::Informational,
            target_country: TargetCountry::Gb,
            audience_level: AudienceLevel::Beginner,
            tone: Tone::Authoritative,
            word_count: 1500,
        }
    }

    #[test]
    fn prompt_interpolates_fields() {
        let prompt = blog_article(&request(), PayloadContract::Standard);
        assert!(prompt.contains("Primary keyword: sustainable fashion\n"));
        assert!(prompt.contains("Secondary keywords: none\n"));
        assert!(prompt.contains("Target market: United Kingdom"));
        assert!(prompt.contains("Tone: authoritative"));
        assert!(prompt.contains("about 1500 words"));
        assert!(!prompt.contains("eeatSignals"));
    }

    #[test]
    fn prompt_is_deterministic() {
        let a = blog_article(&request(), PayloadContract::Strict);
        let b = blog_article(&request(), PayloadContract::Strict);
        assert_eq!(a, b);
        assert!(a.contains("\"competitiveAnalysis\""));
        assert!(a.contains("\"eeatSignals\""));
    }
}
