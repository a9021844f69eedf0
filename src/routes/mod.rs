pub mod blog;
pub mod status;

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::Request;
use serde_json::{json, Value};

// ── Route Registration ────────────────────────────────

pub fn routes() -> Vec<rocket::Route> {
    routes![blog::generate_blog, status::ai_status, status::health]
}

pub fn catchers() -> Vec<rocket::Catcher> {
    catchers![default_catcher]
}

// ── Catchers ──────────────────────────────────────────

/// Every error the framework produces on its own (bad JSON body, missing
/// session headers, unknown route) gets the same JSON shape as handler errors.
#[catch(default)]
fn default_catcher(status: Status, _req: &Request) -> Json<Value> {
    let error = match status.code {
        400 | 422 => "Malformed request body",
        401 => "Missing or invalid shop session",
        404 => "Not found",
        415 => "Expected a JSON request body",
        _ => "Internal server error",
    };
    Json(json!({"success": false, "error": error}))
}
