/// HTTP handlers for posts-service
///
/// - Posts: create, list, fetch, delete
/// - Likes and comments embedded in a post
/// - Health: liveness and store readiness
pub mod health;
pub mod posts;

pub use health::{liveness_check, readiness_check};
pub use posts::{
    add_comment, create_post, delete_comment, delete_post, get_post, like_post, list_posts,
    test_route, unlike_post,
};
