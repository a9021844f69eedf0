use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::session::ShopSession;
use crate::AppState;

// ── Status Check ──────────────────────────────────────

#[get("/api/status")]
pub fn ai_status(_session: ShopSession, state: &State<Arc<AppState>>) -> Json<Value> {
    let generator = &state.generator;
    Json(json!({
        "enabled": generator.ai().is_configured(),
        "provider": generator.ai().provider_name(),
        "model": generator.ai().model(),
        "contract": generator.contract().name(),
    }))
}

#[get("/health")]
pub fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}
