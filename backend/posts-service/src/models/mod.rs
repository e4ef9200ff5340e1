/// Data models for posts-service
///
/// A `Post` is a single document: likes and comments are embedded sequences,
/// most-recent-first. Field names on the wire follow the document shape
/// (`_id`, `user`, `date`).
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Current time at the precision the post store keeps (microseconds).
fn stored_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// One user's endorsement of a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub user: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub text: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    pub user: Uuid,
    pub date: DateTime<Utc>,
}

impl Comment {
    pub fn new(author: Uuid, input: PostInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: input.text,
            name: input.name,
            avatar: input.avatar,
            user: author,
            date: stored_now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user: Uuid,
    pub text: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub likes: Vec<Like>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub date: DateTime<Utc>,
}

impl Post {
    pub fn new(owner: Uuid, input: PostInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            user: owner,
            text: input.text,
            name: input.name,
            avatar: input.avatar,
            likes: Vec::new(),
            comments: Vec::new(),
            date: stored_now(),
        }
    }

    pub fn is_liked_by(&self, user: Uuid) -> bool {
        self.likes.iter().any(|like| like.user == user)
    }

    pub fn comment(&self, comment_id: Uuid) -> Option<&Comment> {
        self.comments.iter().find(|comment| comment.id == comment_id)
    }

    /// Prepends a like unless `user` already liked the post.
    pub fn add_like(&mut self, user: Uuid) -> bool {
        if self.is_liked_by(user) {
            return false;
        }
        self.likes.insert(0, Like { user });
        true
    }

    pub fn remove_like(&mut self, user: Uuid) -> bool {
        match self.likes.iter().position(|like| like.user == user) {
            Some(index) => {
                self.likes.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn add_comment(&mut self, comment: Comment) {
        self.comments.insert(0, comment);
    }

    pub fn remove_comment(&mut self, comment_id: Uuid) -> bool {
        match self.comments.iter().position(|c| c.id == comment_id) {
            Some(index) => {
                self.comments.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Request body shared by post creation and comment creation
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PostInput {
    #[serde(default)]
    #[validate(custom(function = "crate::validators::validate_not_blank"))]
    pub text: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl PostInput {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_set_semantics() {
        let owner = Uuid::new_v4();
        let fan = Uuid::new_v4();
        let mut post = Post::new(owner, PostInput::with_text("hello"));

        assert!(post.add_like(fan));
        assert!(!post.add_like(fan));
        assert_eq!(post.likes, vec![Like { user: fan }]);

        assert!(post.remove_like(fan));
        assert!(!post.remove_like(fan));
        assert!(post.likes.is_empty());
    }

    #[test]
    fn test_likes_are_most_recent_first() {
        let mut post = Post::new(Uuid::new_v4(), PostInput::with_text("hello"));
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        post.add_like(first);
        post.add_like(second);

        assert_eq!(post.likes[0].user, second);
        assert_eq!(post.likes[1].user, first);
    }

    #[test]
    fn test_remove_comment_leaves_others() {
        let author = Uuid::new_v4();
        let mut post = Post::new(author, PostInput::with_text("hello"));
        let keep = Comment::new(author, PostInput::with_text("keep me"));
        let gone = Comment::new(author, PostInput::with_text("gone soon"));
        let (keep_id, gone_id) = (keep.id, gone.id);

        post.add_comment(keep);
        post.add_comment(gone);

        assert!(post.remove_comment(gone_id));
        assert!(!post.remove_comment(gone_id));
        assert_eq!(post.comments.len(), 1);
        assert!(post.comment(keep_id).is_some());
    }

    #[test]
    fn test_document_field_names() {
        let post = Post::new(Uuid::new_v4(), PostInput::with_text("hello"));
        let json = serde_json::to_value(&post).unwrap();

        assert_eq!(json["_id"], post.id.to_string());
        assert_eq!(json["user"], post.user.to_string());
        assert!(json["likes"].as_array().unwrap().is_empty());
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_new_timestamps_fit_store_precision() {
        let author = Uuid::new_v4();
        let post = Post::new(author, PostInput::with_text("hello"));
        let comment = Comment::new(author, PostInput::with_text("hi"));

        assert_eq!(post.date.timestamp_subsec_nanos() % 1_000, 0);
        assert_eq!(comment.date.timestamp_subsec_nanos() % 1_000, 0);
    }
}
