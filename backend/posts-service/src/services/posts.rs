/// Post service - creation, retrieval, deletion and the like/comment protocol
use crate::db::{Conditional, PostStore, StoreError};
use crate::error::{AppError, ErrorCode, Result};
use crate::models::{Comment, Post, PostInput};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Applies ownership checks and set-membership updates to posts.
///
/// Like/unlike and comment removal are delegated to the store as single
/// conditional updates. Deletion and comment-removal authorization read
/// `post.user` / `comment.user`, which never change after creation.
pub struct PostMutationService {
    store: Arc<dyn PostStore>,
}

impl PostMutationService {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self { store }
    }

    /// Create a new post owned by `owner`
    pub async fn create(&self, owner: Uuid, input: PostInput) -> Result<Post> {
        input.validate()?;

        let post = Post::new(owner, input);
        self.store.insert(&post).await?;

        tracing::info!(post_id = %post.id, user_id = %owner, "post created");
        Ok(post)
    }

    /// All posts, newest first
    pub async fn list(&self) -> Result<Vec<Post>> {
        Ok(self.store.find_all().await?)
    }

    pub async fn get_by_id(&self, post_id: Uuid) -> Result<Post> {
        self.store
            .find_by_id(post_id)
            .await?
            .ok_or(AppError::NotFound(ErrorCode::PostNotFound))
    }

    /// Delete a post; only its owner may do so
    pub async fn delete(&self, acting: Uuid, post_id: Uuid) -> Result<()> {
        let post = self.get_by_id(post_id).await?;

        if post.user != acting {
            tracing::info!(%post_id, user_id = %acting, "delete refused: not the owner");
            return Err(AppError::Unauthorized(ErrorCode::NotAuthorized));
        }

        if !self.store.delete(post_id).await? {
            return Err(AppError::NotFound(ErrorCode::PostNotFound));
        }

        tracing::info!(%post_id, user_id = %acting, "post deleted");
        Ok(())
    }

    pub async fn add_like(&self, acting: Uuid, post_id: Uuid) -> Result<Post> {
        let outcome = self.store.push_like_if_absent(post_id, acting).await?;
        let post = settle(outcome, AppError::Conflict(ErrorCode::AlreadyLiked))?;

        tracing::debug!(%post_id, user_id = %acting, likes = post.likes.len(), "post liked");
        Ok(post)
    }

    pub async fn remove_like(&self, acting: Uuid, post_id: Uuid) -> Result<Post> {
        let outcome = self.store.pull_like(post_id, acting).await?;
        let post = settle(outcome, AppError::Conflict(ErrorCode::NotLiked))?;

        tracing::debug!(%post_id, user_id = %acting, likes = post.likes.len(), "post unliked");
        Ok(post)
    }

    /// Prepend a comment authored by `acting`
    pub async fn add_comment(
        &self,
        acting: Uuid,
        post_id: Uuid,
        input: PostInput,
    ) -> Result<Post> {
        input.validate()?;

        let comment = Comment::new(acting, input);
        let post = self
            .store
            .push_comment(post_id, &comment)
            .await?
            .ok_or(AppError::NotFound(ErrorCode::PostNotFound))?;

        tracing::debug!(%post_id, comment_id = %comment.id, user_id = %acting, "comment added");
        Ok(post)
    }

    /// Remove a comment; the comment's author or the post's owner may do so
    pub async fn remove_comment(
        &self,
        acting: Uuid,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Post> {
        let post = self.get_by_id(post_id).await?;
        let comment = post
            .comment(comment_id)
            .ok_or(AppError::NotFound(ErrorCode::CommentNotExists))?;

        if comment.user != acting && post.user != acting {
            tracing::info!(
                %post_id,
                %comment_id,
                user_id = %acting,
                "comment removal refused: neither author nor post owner"
            );
            return Err(AppError::Unauthorized(ErrorCode::NotAuthorized));
        }

        let outcome = self.store.pull_comment(post_id, comment_id).await?;
        let post = settle(outcome, AppError::NotFound(ErrorCode::CommentNotExists))?;

        tracing::debug!(%post_id, %comment_id, user_id = %acting, "comment removed");
        Ok(post)
    }

    /// Store readiness
    pub async fn ping(&self) -> std::result::Result<(), StoreError> {
        self.store.ping().await
    }

    pub async fn shutdown(&self) {
        self.store.close().await;
    }
}

/// `rejected` is returned when the post exists but the update did not apply.
fn settle(outcome: Conditional, rejected: AppError) -> Result<Post> {
    match outcome {
        Conditional::Applied(post) => Ok(post),
        Conditional::Rejected => Err(rejected),
        Conditional::Missing => Err(AppError::NotFound(ErrorCode::PostNotFound)),
    }
}
