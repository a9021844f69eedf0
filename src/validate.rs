use serde::Deserialize;
use std::fmt;

// ── Limits ────────────────────────────────────────────

pub const KEYWORD_MAX_LEN: usize = 100;
pub const SECONDARY_KEYWORDS_MAX_LEN: usize = 500;
pub const WORD_COUNT_MIN: u32 = 500;
pub const WORD_COUNT_MAX: u32 = 5000;

// ── Errors ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    Required,
    Length { min: usize, max: usize },
    Charset,
    OneOf(&'static [&'static str]),
    NotANumber,
    Range { min: u32, max: u32 },
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Required => write!(f, "is required"),
            Constraint::Length { min, max } => {
                write!(f, "must be between {} and {} characters", min, max)
            }
            Constraint::Charset => write!(f, "contains characters that are not allowed"),
            Constraint::OneOf(allowed) => write!(f, "must be one of: {}", allowed.join(", ")),
            Constraint::NotANumber => write!(f, "must be a whole number"),
            Constraint::Range { min, max } => write!(f, "must be between {} and {}", min, max),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} {constraint}")]
pub struct ValidationError {
    pub field: &'static str,
    pub constraint: Constraint,
}

impl ValidationError {
    fn new(field: &'static str, constraint: Constraint) -> Self {
        ValidationError { field, constraint }
    }
}

// ── Enumerations ──────────────────────────────────────

macro_rules! form_enum {
    ($name:ident, $field:literal, { $($variant:ident => $value:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALLOWED: &'static [&'static str] = &[$($value),+];

            pub fn parse(raw: &str) -> Result<Self, ValidationError> {
                match raw.trim() {
                    $($value => Ok(Self::$variant),)+
                    _ => Err(ValidationError::new($field, Constraint::OneOf(Self::ALLOWED))),
                }
            }

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $value),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

form_enum!(SearchIntent, "searchIntent", {
    Informational => "informational",
    Commercial => "commercial",
    Transactional => "transactional",
    Navigational => "navigational",
});

form_enum!(Tone, "tone", {
    Professional => "professional",
    Conversational => "conversational",
    Authoritative => "authoritative",
    Friendly => "friendly",
    Educational => "educational",
    Persuasive => "persuasive",
});

form_enum!(AudienceLevel, "audienceLevel", {
    Beginner => "beginner",
    Intermediate => "intermediate",
    Advanced => "advanced",
    Expert => "expert",
});

form_enum!(TargetCountry, "targetCountry", {
    Us => "US",
    Gb => "GB",
    Ca => "CA",
    Au => "AU",
    Ie => "IE",
    Nz => "NZ",
    In => "IN",
    De => "DE",
    Fr => "FR",
    Es => "ES",
    It => "IT",
    Nl => "NL",
    Global => "global",
});

impl TargetCountry {
    /// Human-readable market name used inside the prompt.
    pub fn market_name(&self) -> &'static str {
        match self {
            Self::Us => "United States",
            Self::Gb => "United Kingdom",
            Self::Ca => "Canada",
            Self::Au => "Australia",
            Self::Ie => "Ireland",
            Self::Nz => "New Zealand",
            Self::In => "India",
            Self::De => "Germany",
            Self::Fr => "France",
            Self::Es => "Spain",
            Self::It => "Italy",
            Self::Nl => "Netherlands",
            Self::Global => "a global audience",
        }
    }
}

// ── Raw form & validated request ──────────────────────

/// Raw generation form as posted by the admin UI. Every field is untrusted.
///
/// Fields accept any JSON value so that a wrongly typed field reaches the
/// validators and is reported by name. Non-string values are kept as their
/// JSON text, which lets `"wordCount": 1500` through and fails `"tone": 5`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationForm {
    #[serde(default, deserialize_with = "lenient_string")]
    pub keyword: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub secondary_keywords: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub search_intent: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub target_country: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub audience_level: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tone: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub word_count: Option<String>,
}

/// Generation parameters that passed every check in this module.
/// Only `validate_request` builds one.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub primary_keyword: String,
    pub secondary_keywords: String,
    pub search_intent: SearchIntent,
    pub target_country: TargetCountry,
    pub audience_level: AudienceLevel,
    pub tone: Tone,
    pub word_count: u32,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

// ── Field validators ──────────────────────────────────

fn is_keyword_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_' | '(' | ')')
}

pub fn validate_keyword(raw: &str) -> Result<String, ValidationError> {
    let keyword = raw.trim();
    if keyword.is_empty() {
        return Err(ValidationError::new("keyword", Constraint::Required));
    }
    if keyword.chars().count() > KEYWORD_MAX_LEN {
        return Err(ValidationError::new(
            "keyword",
            Constraint::Length {
                min: 1,
                max: KEYWORD_MAX_LEN,
            },
        ));
    }
    if !keyword.chars().all(is_keyword_char) {
        return Err(ValidationError::new("keyword", Constraint::Charset));
    }
    Ok(keyword.to_string())
}

pub fn validate_secondary_keywords(raw: &str) -> Result<String, ValidationError> {
    let keywords = raw.trim();
    if keywords.chars().count() > SECONDARY_KEYWORDS_MAX_LEN {
        return Err(ValidationError::new(
            "secondaryKeywords",
            Constraint::Length {
                min: 0,
                max: SECONDARY_KEYWORDS_MAX_LEN,
            },
        ));
    }
    if !keywords.chars().all(|c| is_keyword_char(c) || c == ',') {
        return Err(ValidationError::new("secondaryKeywords", Constraint::Charset));
    }
    Ok(keywords.to_string())
}

pub fn validate_search_intent(raw: &str) -> Result<SearchIntent, ValidationError> {
    SearchIntent::parse(raw)
}

pub fn validate_tone(raw: &str) -> Result<Tone, ValidationError> {
    Tone::parse(raw)
}

pub fn validate_audience_level(raw: &str) -> Result<AudienceLevel, ValidationError> {
    AudienceLevel::parse(raw)
}

pub fn validate_target_country(raw: &str) -> Result<TargetCountry, ValidationError> {
    TargetCountry::parse(raw)
}

pub fn validate_word_count(raw: &str) -> Result<u32, ValidationError> {
    let count: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::new("wordCount", Constraint::NotANumber))?;
    if count < WORD_COUNT_MIN as i64 || count > WORD_COUNT_MAX as i64 {
        return Err(ValidationError::new(
            "wordCount",
            Constraint::Range {
                min: WORD_COUNT_MIN,
                max: WORD_COUNT_MAX,
            },
        ));
    }
    Ok(count as u32)
}

/// Validate the whole form. The first failing field wins.
pub fn validate_request(form: &GenerationForm) -> Result<GenerationRequest, ValidationError> {
    let field = |v: &Option<String>| v.clone().unwrap_or_default();

    let primary_keyword = validate_keyword(&field(&form.keyword))?;
    let secondary_keywords = validate_secondary_keywords(&field(&form.secondary_keywords))?;
    let search_intent = validate_search_intent(&field(&form.search_intent))?;
    let target_country = validate_target_country(&field(&form.target_country))?;
    let audience_level = validate_audience_level(&field(&form.audience_level))?;
    let tone = validate_tone(&field(&form.tone))?;
    let word_count = validate_word_count(&field(&form.word_count))?;

    Ok(GenerationRequest {
        primary_keyword,
        secondary_keywords,
        search_intent,
        target_country,
        audience_level,
        tone,
        word_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> GenerationForm {
        GenerationForm {
            keyword: Some("sustainable fashion".into()),
            secondary_keywords: Some("eco clothing, slow fashion".into()),
            search_intent: Some("informational".into()),
            target_country: Some("US".into()),
            audience_level: Some("beginner".into()),
            tone: Some("authoritative".into()),
            word_count: Some("1500".into()),
        }
    }

    #[test]
    fn keyword_is_trimmed() {
        assert_eq!(
            validate_keyword("  organic cotton (2024) tips_v2 ").unwrap(),
            "organic cotton (2024) tips_v2"
        );
    }

    #[test]
    fn keyword_round_trips_allowed_charset() {
        let samples = vec![
            "a".to_string(),
            "A-b_c (d) 9".to_string(),
            "running shoes".to_string(),
            "x".repeat(100),
        ];
        for s in &samples {
            assert_eq!(&validate_keyword(s).unwrap(), s);
        }
    }

    #[test]
    fn keyword_rejects_disallowed_characters() {
        for bad in ["<script>", "shoes; drop", "back`tick", "quote\"", "new\nline", "café"] {
            let err = validate_keyword(bad).unwrap_err();
            assert_eq!(err.field, "keyword");
            assert_eq!(err.constraint, Constraint::Charset, "input: {:?}", bad);
        }
    }

    #[test]
    fn keyword_required_and_bounded() {
        assert_eq!(validate_keyword("   ").unwrap_err().constraint, Constraint::Required);
        let long = "k".repeat(101);
        assert!(matches!(
            validate_keyword(&long).unwrap_err().constraint,
            Constraint::Length { max: 100, .. }
        ));
    }

    #[test]
    fn secondary_keywords_allow_empty_and_commas() {
        assert_eq!(validate_secondary_keywords("").unwrap(), "");
        assert_eq!(
            validate_secondary_keywords("linen, hemp,bamboo").unwrap(),
            "linen, hemp,bamboo"
        );
        assert_eq!(
            validate_secondary_keywords("a;b").unwrap_err().constraint,
            Constraint::Charset
        );
        let long = "a,".repeat(251);
        assert!(validate_secondary_keywords(&long).is_err());
    }

    #[test]
    fn enums_accept_only_known_values() {
        assert_eq!(validate_tone("authoritative").unwrap(), Tone::Authoritative);
        assert_eq!(validate_search_intent("commercial").unwrap(), SearchIntent::Commercial);
        assert_eq!(validate_audience_level("expert").unwrap(), AudienceLevel::Expert);
        assert_eq!(validate_target_country("GB").unwrap(), TargetCountry::Gb);
        assert_eq!(validate_target_country("global").unwrap(), TargetCountry::Global);

        let err = validate_tone("sarcastic").unwrap_err();
        assert_eq!(err.field, "tone");
        assert!(matches!(err.constraint, Constraint::OneOf(_)));
        assert!(validate_target_country("us").is_err());
        assert!(validate_search_intent("").is_err());
    }

    #[test]
    fn word_count_boundaries() {
        assert_eq!(validate_word_count("500").unwrap(), 500);
        assert_eq!(validate_word_count("5000").unwrap(), 5000);
        assert_eq!(validate_word_count(" 1500 ").unwrap(), 1500);
        for bad in ["499", "5001", "0", "-700", "99999999999"] {
            assert!(matches!(
                validate_word_count(bad).unwrap_err().constraint,
                Constraint::Range { min: 500, max: 5000 }
            ));
        }
        for bad in ["", "abc", "1500.5", "1e3"] {
            assert_eq!(
                validate_word_count(bad).unwrap_err().constraint,
                Constraint::NotANumber
            );
        }
    }

    #[test]
    fn validate_request_builds_typed_request() {
        let req = validate_request(&valid_form()).unwrap();
        assert_eq!(req.primary_keyword, "sustainable fashion");
        assert_eq!(req.tone, Tone::Authoritative);
        assert_eq!(req.target_country, TargetCountry::Us);
        assert_eq!(req.word_count, 1500);
    }

    #[test]
    fn validate_request_reports_first_bad_field() {
        let mut form = valid_form();
        form.tone = Some("angry".into());
        form.word_count = Some("10".into());
        assert_eq!(validate_request(&form).unwrap_err().field, "tone");

        let mut form = valid_form();
        form.keyword = None;
        let err = validate_request(&form).unwrap_err();
        assert_eq!(err.to_string(), "keyword is required");
    }

    #[test]
    fn form_accepts_numeric_word_count() {
        let form: GenerationForm = serde_json::from_str(
            r#"{"keyword":"k","searchIntent":"informational","wordCount":2000}"#,
        )
        .unwrap();
        assert_eq!(form.word_count.as_deref(), Some("2000"));
    }

    #[test]
    fn wrongly_typed_fields_reach_the_validators() {
        let form: GenerationForm = serde_json::from_str(
            r#"{"keyword":"k","secondaryKeywords":null,"searchIntent":"informational",
                "targetCountry":"US","audienceLevel":"beginner","tone":5,"wordCount":1500}"#,
        )
        .unwrap();
        assert_eq!(form.secondary_keywords, None);
        assert_eq!(form.tone.as_deref(), Some("5"));
        assert_eq!(validate_request(&form).unwrap_err().field, "tone");

        let form: GenerationForm =
            serde_json::from_str(r#"{"keyword":123,"tone":["friendly"]}"#).unwrap();
        assert_eq!(form.keyword.as_deref(), Some("123"));
        assert_eq!(form.tone.as_deref(), Some(r#"["friendly"]"#));

        let form: GenerationForm = serde_json::from_str(r#"{"keyword":{"x":1}}"#).unwrap();
        let err = validate_request(&form).unwrap_err();
        assert_eq!(err.field, "keyword");
        assert_eq!(err.constraint, Constraint::Charset);
    }
}
