use rocket::http::Status;

use crate::ai::extract::PayloadError;
use crate::store::ContentError;
use crate::validate::ValidationError;

/// Every way a generation request can fail. Callers only ever see
/// [`GenerationError::user_message`]; the variants carry the diagnostics that
/// go to the log.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("throttled for {retry_after_secs}s")]
    Throttled {
        retry_after_secs: u64,
        message: String,
    },

    #[error("AI provider error: {0}")]
    Provider(String),

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error("content store error: {0}")]
    ContentStore(#[from] ContentError),
}

impl GenerationError {
    pub fn status(&self) -> Status {
        match self {
            GenerationError::Validation(_) => Status::BadRequest,
            GenerationError::Throttled { .. } => Status::TooManyRequests,
            GenerationError::Provider(_)
            | GenerationError::Payload(_)
            | GenerationError::ContentStore(_) => Status::InternalServerError,
        }
    }

    /// Short machine-readable name of the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::Validation(_) => "validation",
            GenerationError::Throttled { .. } => "throttled",
            GenerationError::Provider(_) => "provider",
            GenerationError::Payload(PayloadError::NoJsonFound { .. }) => "no_json_found",
            GenerationError::Payload(PayloadError::MalformedJson { .. }) => "malformed_json",
            GenerationError::Payload(PayloadError::IncompletePayload { .. }) => {
                "incomplete_payload"
            }
            GenerationError::ContentStore(_) => "content_store",
        }
    }

    /// The message returned to the merchant. Never contains raw model output.
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::Validation(e) => format!("Invalid input: {}", e),
            GenerationError::Throttled { message, .. } => message.clone(),
            GenerationError::Provider(_) => {
                "The AI service could not be reached. Please try again in a few minutes.".into()
            }
            GenerationError::Payload(PayloadError::NoJsonFound { .. }) => {
                "The AI response was not in the expected format. Please try again.".into()
            }
            GenerationError::Payload(PayloadError::MalformedJson { .. }) => {
                "The AI returned an invalid response. Please try again, or adjust your keyword or word count.".into()
            }
            GenerationError::Payload(PayloadError::IncompletePayload { missing }) => format!(
                "The AI response was incomplete (missing {}). Please try again.",
                missing.join(", ")
            ),
            GenerationError::ContentStore(e @ ContentError::Rejected(_)) => e.first_message(),
            GenerationError::ContentStore(ContentError::Transport(_)) => {
                "The store could not be reached. Please try again in a few minutes.".into()
            }
        }
    }
}
