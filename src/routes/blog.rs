use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::GenerationError;
use crate::generator::ArticleResult;
use crate::session::ShopSession;
use crate::validate::GenerationForm;
use crate::AppState;

// ── Generate Blog Article ─────────────────────────────

#[post("/api/blog/generate", format = "json", data = "<body>")]
pub async fn generate_blog(
    session: ShopSession,
    state: &State<Arc<AppState>>,
    body: Json<GenerationForm>,
) -> Custom<Json<Value>> {
    let state = Arc::clone(state.inner());
    let form = body.into_inner();

    // Provider and store clients are blocking; keep them off the async workers.
    let outcome =
        rocket::tokio::task::spawn_blocking(move || run(&state, &session, &form)).await;

    match outcome {
        Ok(Ok(article)) => Custom(Status::Ok, Json(success_body(&article))),
        Ok(Err(e)) => {
            log::warn!("[generate] Generation failed ({}): {}", e.kind(), e);
            Custom(e.status(), Json(error_body(&e)))
        }
        Err(e) => {
            log::error!("[generate] Generation task panicked: {}", e);
            Custom(
                Status::InternalServerError,
                Json(json!({"success": false, "error": "Internal server error"})),
            )
        }
    }
}

fn run(
    state: &AppState,
    session: &ShopSession,
    form: &GenerationForm,
) -> Result<ArticleResult, GenerationError> {
    state
        .generator
        .generate_for_session(session, form, state.stores.as_ref())
}

pub fn success_body(article: &ArticleResult) -> Value {
    json!({
        "success": true,
        "articleId": article.id,
        "articleTitle": article.title,
    })
}

pub fn error_body(err: &GenerationError) -> Value {
    json!({
        "success": false,
        "error": err.user_message(),
    })
}
