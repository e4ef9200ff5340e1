/// Post handlers - HTTP endpoints for post operations
use crate::error::{AppError, ErrorCode, Result};
use crate::metrics;
use crate::models::PostInput;
use crate::services::PostMutationService;
use actix_middleware::UserId;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

/// Unparseable ids can never name a stored post.
fn parse_post_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(ErrorCode::PostNotFound))
}

/// Route smoke test
pub async fn test_route() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "msg": "Posts work" }))
}

/// Create a new post
pub async fn create_post(
    user_id: UserId,
    service: web::Data<PostMutationService>,
    req: web::Json<PostInput>,
) -> Result<HttpResponse> {
    let result = service.create(user_id.0, req.into_inner()).await;
    metrics::observe("create", &result);

    Ok(HttpResponse::Ok().json(result?))
}

/// List all posts, newest first
pub async fn list_posts(service: web::Data<PostMutationService>) -> Result<HttpResponse> {
    let result = service.list().await;
    metrics::observe("list", &result);

    Ok(HttpResponse::Ok().json(result?))
}

/// Get a post by ID
pub async fn get_post(
    service: web::Data<PostMutationService>,
    post_id: web::Path<String>,
) -> Result<HttpResponse> {
    let result = match parse_post_id(&post_id) {
        Ok(post_id) => service.get_by_id(post_id).await,
        Err(e) => Err(e),
    };
    metrics::observe("get", &result);

    Ok(HttpResponse::Ok().json(result?))
}

/// Delete a post owned by the caller
pub async fn delete_post(
    user_id: UserId,
    service: web::Data<PostMutationService>,
    post_id: web::Path<String>,
) -> Result<HttpResponse> {
    let result = match parse_post_id(&post_id) {
        Ok(post_id) => service.delete(user_id.0, post_id).await,
        Err(e) => Err(e),
    };
    metrics::observe("delete", &result);
    result?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

/// Like a post
pub async fn like_post(
    user_id: UserId,
    service: web::Data<PostMutationService>,
    post_id: web::Path<String>,
) -> Result<HttpResponse> {
    let result = match parse_post_id(&post_id) {
        Ok(post_id) => service.add_like(user_id.0, post_id).await,
        Err(e) => Err(e),
    };
    metrics::observe("like", &result);

    Ok(HttpResponse::Ok().json(result?))
}

/// Withdraw a like
pub async fn unlike_post(
    user_id: UserId,
    service: web::Data<PostMutationService>,
    post_id: web::Path<String>,
) -> Result<HttpResponse> {
    let result = match parse_post_id(&post_id) {
        Ok(post_id) => service.remove_like(user_id.0, post_id).await,
        Err(e) => Err(e),
    };
    metrics::observe("unlike", &result);

    Ok(HttpResponse::Ok().json(result?))
}

/// Comment on a post
pub async fn add_comment(
    user_id: UserId,
    service: web::Data<PostMutationService>,
    post_id: web::Path<String>,
    req: web::Json<PostInput>,
) -> Result<HttpResponse> {
    let result = match parse_post_id(&post_id) {
        Ok(post_id) => service.add_comment(user_id.0, post_id, req.into_inner()).await,
        Err(e) => Err(e),
    };
    metrics::observe("comment", &result);

    Ok(HttpResponse::Ok().json(result?))
}

/// Remove a comment
pub async fn delete_comment(
    user_id: UserId,
    service: web::Data<PostMutationService>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();

    let result = match parse_post_id(&post_id) {
        Ok(post_id) => match Uuid::parse_str(&comment_id) {
            Ok(comment_id) => service.remove_comment(user_id.0, post_id, comment_id).await,
            // The post must still exist before the comment can be reported missing
            Err(_) => match service.get_by_id(post_id).await {
                Ok(_) => Err(AppError::NotFound(ErrorCode::CommentNotExists)),
                Err(e) => Err(e),
            },
        },
        Err(e) => Err(e),
    };
    metrics::observe("uncomment", &result);

    Ok(HttpResponse::Ok().json(result?))
}
