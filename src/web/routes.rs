use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::web::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(
            web::scope("/api/ai")
                .route("/chat", web::post().to(handlers::chat))
        )
        .route("/", web::get().to(handlers::index))
        .route("/health", web::get().to(handlers::health_check));
}

// Undeserializable bodies get the same {error, detail} JSON shape as
// every other error response instead of actix's plain-text default.
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let detail = err.to_string();
    let response = HttpResponse::BadRequest().json(json!({
        "error": "Invalid request",
        "detail": detail,
    }));
    InternalError::from_response(err, response).into()
}
