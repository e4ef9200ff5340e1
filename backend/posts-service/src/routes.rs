/// Route table for posts-service
use crate::error::AppError;
use crate::handlers;
use crate::metrics;
use crate::validators::{FieldErrors, TEXT_REQUIRED};
use actix_middleware::{JwtAuthMiddleware, TokenVerifier};
use actix_web::error::JsonPayloadError;
use actix_web::{web, HttpRequest};
use std::sync::Arc;

/// Body errors answer with the same field map as validation failures.
fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let mut fields = FieldErrors::new();
    match err {
        JsonPayloadError::ContentType => {
            fields.insert("text".to_string(), TEXT_REQUIRED.to_string());
        }
        other => {
            fields.insert("body".to_string(), other.to_string());
        }
    }
    AppError::Validation(fields).into()
}

/// Registers every route. `/api/posts` resolves bearer tokens through
/// `verifier`; handlers that take a `UserId` require one.
pub fn configure(verifier: Arc<dyn TokenVerifier>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.route("/metrics", web::get().to(metrics::serve_metrics))
            .route("/api/health", web::get().to(handlers::liveness_check))
            .route("/api/health/ready", web::get().to(handlers::readiness_check))
            .service(
                web::scope("/api/posts")
                    .wrap(JwtAuthMiddleware::new(verifier))
                    .app_data(web::JsonConfig::default().error_handler(json_error))
                    .route("/test", web::get().to(handlers::test_route))
                    .service(
                        web::resource(["", "/"])
                            .route(web::get().to(handlers::list_posts))
                            .route(web::post().to(handlers::create_post)),
                    )
                    .route("/like/{id}", web::post().to(handlers::like_post))
                    .route("/unlike/{id}", web::post().to(handlers::unlike_post))
                    .route("/comment/{id}", web::post().to(handlers::add_comment))
                    .route(
                        "/comment/{id}/{comment_id}",
                        web::delete().to(handlers::delete_comment),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(handlers::get_post))
                            .route(web::delete().to(handlers::delete_post)),
                    ),
            );
    }
}
