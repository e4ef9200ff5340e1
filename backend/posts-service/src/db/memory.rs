/// Process-local post store
///
/// Backs development runs and tests. A single write lock makes every
/// conditional update atomic.
use super::{Conditional, PostStore, StoreError};
use crate::models::{Comment, Post};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Documents {
    next_seq: u64,
    posts: HashMap<Uuid, (u64, Post)>,
}

impl Documents {
    fn apply<F>(&mut self, post_id: Uuid, update: F) -> Conditional
    where
        F: FnOnce(&mut Post) -> bool,
    {
        match self.posts.get_mut(&post_id) {
            Some((_, post)) => {
                if update(post) {
                    Conditional::Applied(post.clone())
                } else {
                    Conditional::Rejected
                }
            }
            None => Conditional::Missing,
        }
    }
}

#[derive(Default)]
pub struct InMemoryPostStore {
    documents: RwLock<Documents>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn insert(&self, post: &Post) -> Result<(), StoreError> {
        let mut docs = self.documents.write().await;
        let seq = docs.next_seq;
        docs.next_seq += 1;
        docs.posts.insert(post.id, (seq, post.clone()));
        Ok(())
    }

    async fn find_by_id(&self, post_id: Uuid) -> Result<Option<Post>, StoreError> {
        let docs = self.documents.read().await;
        Ok(docs.posts.get(&post_id).map(|(_, post)| post.clone()))
    }

    async fn find_all(&self) -> Result<Vec<Post>, StoreError> {
        let docs = self.documents.read().await;
        let mut entries: Vec<&(u64, Post)> = docs.posts.values().collect();
        entries.sort_by(|(seq_a, a), (seq_b, b)| b.date.cmp(&a.date).then(seq_b.cmp(seq_a)));
        Ok(entries.into_iter().map(|(_, post)| post.clone()).collect())
    }

    async fn delete(&self, post_id: Uuid) -> Result<bool, StoreError> {
        let mut docs = self.documents.write().await;
        Ok(docs.posts.remove(&post_id).is_some())
    }

    async fn push_like_if_absent(
        &self,
        post_id: Uuid,
        user: Uuid,
    ) -> Result<Conditional, StoreError> {
        let mut docs = self.documents.write().await;
        Ok(docs.apply(post_id, |post| post.add_like(user)))
    }

    async fn pull_like(&self, post_id: Uuid, user: Uuid) -> Result<Conditional, StoreError> {
        let mut docs = self.documents.write().await;
        Ok(docs.apply(post_id, |post| post.remove_like(user)))
    }

    async fn push_comment(
        &self,
        post_id: Uuid,
        comment: &Comment,
    ) -> Result<Option<Post>, StoreError> {
        let mut docs = self.documents.write().await;
        let applied = docs.apply(post_id, |post| {
            post.add_comment(comment.clone());
            true
        });
        match applied {
            Conditional::Applied(post) => Ok(Some(post)),
            _ => Ok(None),
        }
    }

    async fn pull_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Conditional, StoreError> {
        let mut docs = self.documents.write().await;
        Ok(docs.apply(post_id, |post| post.remove_comment(comment_id)))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
