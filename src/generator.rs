use serde::Serialize;
use std::sync::Arc;

use crate::ai::extract::{self, ArticlePayload, PayloadContract};
use crate::ai::{prompts, AiRequest, TextGenerator};
use crate::config::Config;
use crate::error::GenerationError;
use crate::rate_limit::RateLimiter;
use crate::session::ShopSession;
use crate::store::{ContainerRef, ContentStore, NewArticle, StoreConnector};
use crate::validate::{self, GenerationForm, GenerationRequest};

/// Rate-limit action key for article generation.
pub const GENERATE_ACTION: &str = "generate_blog";

const FALLBACK_SLUG: &str = "blog-article";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleResult {
    /// Bare trailing id segment, e.g. `123` for `gid://shopify/Article/123`.
    pub id: String,
    pub title: String,
}

/// Turns a validated request into a draft article.
///
/// One request is one strictly ordered sequence: throttle check, a single AI
/// call, payload recovery, find-or-create blog, create article. Nothing is
/// retried here and nothing is deduplicated, so calling twice with the same
/// input makes two AI calls and two drafts.
pub struct BlogGenerator {
    ai: Arc<dyn TextGenerator>,
    limiter: Arc<dyn RateLimiter>,
    contract: PayloadContract,
    default_blog_title: String,
    max_tokens: u32,
    temperature: f32,
}

impl BlogGenerator {
    pub fn new(ai: Arc<dyn TextGenerator>, limiter: Arc<dyn RateLimiter>, config: &Config) -> Self {
        BlogGenerator {
            ai,
            limiter,
            contract: config.generation.contract,
            default_blog_title: config.shopify.default_blog_title.clone(),
            max_tokens: config.ai.max_tokens,
            temperature: config.ai.temperature,
        }
    }

    pub fn contract(&self) -> PayloadContract {
        self.contract
    }

    pub fn ai(&self) -> &dyn TextGenerator {
        self.ai.as_ref()
    }

    /// Validate the form, then open the shop's store and generate. Invalid
    /// input is rejected before any collaborator is touched.
    pub fn generate_for_session(
        &self,
        session: &ShopSession,
        form: &GenerationForm,
        stores: &dyn StoreConnector,
    ) -> Result<ArticleResult, GenerationError> {
        let request = validate::validate_request(form).map_err(|e| {
            log::info!("[generate] Rejected input from {}: {}", session.shop, e);
            GenerationError::from(e)
        })?;
        let store = stores.connect(session).map_err(|e| {
            log::warn!("[generate] Could not open store for {}: {}", session.shop, e);
            GenerationError::ContentStore(e)
        })?;
        self.generate(&session.shop, &request, store.as_ref())
    }

    pub fn generate(
        &self,
        subject: &str,
        request: &GenerationRequest,
        store: &dyn ContentStore,
    ) -> Result<ArticleResult, GenerationError> {
        if let Some(throttle) = self.limiter.check(subject, GENERATE_ACTION) {
            log::info!(
                "[generate] Throttled {} for {}s",
                subject,
                throttle.retry_after_secs
            );
            return Err(GenerationError::Throttled {
                retry_after_secs: throttle.retry_after_secs,
                message: throttle.message(),
            });
        }

        let ai_request = AiRequest {
            system: prompts::blog_system(),
            prompt: prompts::blog_article(request, self.contract),
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
        };

        log::info!(
            "[generate] {}: '{}' ({} words, {}) via {}",
            subject,
            request.primary_keyword,
            request.word_count,
            request.tone,
            self.ai.provider_name()
        );

        let response = self
            .ai
            .generate(&ai_request)
            .map_err(|e| GenerationError::Provider(e.to_string()))?;

        log::debug!(
            "[generate] AI raw response: {}",
            extract::truncate_chars(&response.text, 500)
        );

        let payload = extract::parse_article_payload(&response.text, self.contract)?;

        let container = self.resolve_container(store)?;
        let article = build_article(&container, &payload, request);

        let created = store.create_article(&article).map_err(|e| {
            log::warn!("[generate] Article create failed for {}: {}", subject, e);
            GenerationError::ContentStore(e)
        })?;

        let result = ArticleResult {
            id: bare_id(&created.id).to_string(),
            title: if created.title.is_empty() {
                payload.selected_title.clone()
            } else {
                created.title
            },
        };
        log::info!(
            "[generate] Created draft article {} '{}' for {}",
            result.id,
            result.title,
            subject
        );
        Ok(result)
    }

    /// Use the store's first blog, creating one when there is none.
    ///
    /// Read-then-write without a lock: two concurrent first requests may both
    /// create a blog. The store then has two blogs, which is harmless.
    fn resolve_container(&self, store: &dyn ContentStore) -> Result<ContainerRef, GenerationError> {
        let existing = store.list_containers(1).map_err(|e| {
            log::warn!("[generate] Blog lookup failed: {}", e);
            GenerationError::ContentStore(e)
        })?;
        if let Some(container) = existing.into_iter().next() {
            return Ok(container);
        }
        log::info!(
            "[generate] No blog found, creating '{}'",
            self.default_blog_title
        );
        store.create_container(&self.default_blog_title).map_err(|e| {
            log::warn!("[generate] Blog create failed: {}", e);
            GenerationError::ContentStore(e)
        })
    }
}

fn build_article(
    container: &ContainerRef,
    payload: &ArticlePayload,
    request: &GenerationRequest,
) -> NewArticle {
    let slug = payload
        .slug
        .as_deref()
        .map(derive_slug)
        .filter(|s| !s.is_empty())
        .or_else(|| Some(derive_slug(&payload.selected_title)).filter(|s| !s.is_empty()))
        .or_else(|| Some(derive_slug(&request.primary_keyword)).filter(|s| !s.is_empty()))
        .unwrap_or_else(|| FALLBACK_SLUG.to_string());

    NewArticle {
        container_id: container.id.clone(),
        title: payload.selected_title.clone(),
        body: payload.article_content.clone(),
        summary: payload.meta_description.clone(),
        slug,
        tags: payload.tags.clone(),
        draft: true,
    }
}

/// Lower-case, collapse every run of non-alphanumerics into one hyphen,
/// trim hyphens at both ends.
pub fn derive_slug(title: &str) -> String {
    slug::slugify(title.to_lowercase())
}

/// `gid://shopify/Article/123` → `123`. Ids without a path pass through.
pub fn bare_id(id: &str) -> &str {
    id.rsplit('/').next().unwrap_or(id)
}
