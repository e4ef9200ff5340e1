/// Persistence layer for post documents
///
/// `PostStore` is the seam between the mutation service and storage. Every
/// like/comment mutation is a single conditional update that the store applies
/// atomically per document, so membership checks never race with writes.
pub mod memory;
pub mod postgres;

pub use memory::InMemoryPostStore;
pub use postgres::PgPostStore;

use crate::models::{Comment, Post};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result of a conditional document update
#[derive(Debug, Clone, PartialEq)]
pub enum Conditional {
    /// The predicate held and the update was written.
    Applied(Post),
    /// The post exists but the predicate did not hold; nothing was written.
    Rejected,
    /// No post with that id.
    Missing,
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn insert(&self, post: &Post) -> Result<(), StoreError>;

    async fn find_by_id(&self, post_id: Uuid) -> Result<Option<Post>, StoreError>;

    /// All posts, newest `date` first; equal dates newest insertion first.
    async fn find_all(&self) -> Result<Vec<Post>, StoreError>;

    /// Returns `false` when nothing was deleted.
    async fn delete(&self, post_id: Uuid) -> Result<bool, StoreError>;

    /// Prepends `{user}` to `likes` unless the user is already present.
    async fn push_like_if_absent(&self, post_id: Uuid, user: Uuid)
        -> Result<Conditional, StoreError>;

    /// Removes the user's like if present.
    async fn pull_like(&self, post_id: Uuid, user: Uuid) -> Result<Conditional, StoreError>;

    /// Prepends a comment; `None` when the post does not exist.
    async fn push_comment(
        &self,
        post_id: Uuid,
        comment: &Comment,
    ) -> Result<Option<Post>, StoreError>;

    /// Removes the comment with `comment_id` if present.
    async fn pull_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Conditional, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    async fn close(&self) {}
}
