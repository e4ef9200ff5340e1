/// PostgreSQL-backed post store
///
/// One row per post. `likes` and `comments` are JSONB arrays kept in the same
/// JSON shape the API serves, so each like/comment mutation is a single
/// `UPDATE ... WHERE <membership predicate> RETURNING` statement.
use super::{Conditional, PostStore, StoreError};
use crate::config::DatabaseConfig;
use crate::models::{Comment, Like, Post};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use std::time::Duration;
use tracing::{error, info};
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    user_id: Uuid,
    text: String,
    name: Option<String>,
    avatar: Option<String>,
    likes: Json<Vec<Like>>,
    comments: Json<Vec<Comment>>,
    date: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            user: row.user_id,
            text: row.text,
            name: row.name,
            avatar: row.avatar,
            likes: row.likes.0,
            comments: row.comments.0,
            date: row.date,
        }
    }
}

#[derive(Clone)]
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a verified connection pool.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        info!(
            max_connections = config.max_connections,
            connect_timeout_secs = config.connect_timeout_secs,
            "Creating database pool"
        );

        let timeout = Duration::from_secs(config.connect_timeout_secs);
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(timeout)
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .test_before_acquire(true)
            .connect(&config.url)
            .await?;

        match tokio::time::timeout(timeout, sqlx::query("SELECT 1").execute(&pool)).await {
            Ok(Ok(_)) => {
                info!("Database pool created and verified successfully");
                Ok(Self::new(pool))
            }
            Ok(Err(e)) => {
                error!(error = %e, "Database connection verification failed");
                Err(e.into())
            }
            Err(_) => {
                error!(
                    timeout_secs = config.connect_timeout_secs,
                    "Database connection verification timeout"
                );
                Err(sqlx::Error::PoolTimedOut.into())
            }
        }
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations completed successfully");
        Ok(())
    }

    async fn exists(&self, post_id: Uuid) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Turns an `UPDATE ... RETURNING` result into a [`Conditional`].
    async fn settle(
        &self,
        post_id: Uuid,
        row: Option<PostRow>,
    ) -> Result<Conditional, StoreError> {
        match row {
            Some(row) => Ok(Conditional::Applied(row.into())),
            None if self.exists(post_id).await? => Ok(Conditional::Rejected),
            None => Ok(Conditional::Missing),
        }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn insert(&self, post: &Post) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, user_id, text, name, avatar, likes, comments, date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(post.id)
        .bind(post.user)
        .bind(&post.text)
        .bind(&post.name)
        .bind(&post.avatar)
        .bind(Json(&post.likes))
        .bind(Json(&post.comments))
        .bind(post.date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, post_id: Uuid) -> Result<Option<Post>, StoreError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, user_id, text, name, avatar, likes, comments, date
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Post::from))
    }

    async fn find_all(&self) -> Result<Vec<Post>, StoreError> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, user_id, text, name, avatar, likes, comments, date
            FROM posts
            ORDER BY date DESC, seq DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn delete(&self, post_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn push_like_if_absent(
        &self,
        post_id: Uuid,
        user: Uuid,
    ) -> Result<Conditional, StoreError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            UPDATE posts
            SET likes = jsonb_build_array(jsonb_build_object('user', $2::text)) || likes
            WHERE id = $1
              AND NOT likes @> jsonb_build_array(jsonb_build_object('user', $2::text))
            RETURNING id, user_id, text, name, avatar, likes, comments, date
            "#,
        )
        .bind(post_id)
        .bind(user.to_string())
        .fetch_optional(&self.pool)
        .await?;

        self.settle(post_id, row).await
    }

    async fn pull_like(&self, post_id: Uuid, user: Uuid) -> Result<Conditional, StoreError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            UPDATE posts
            SET likes = COALESCE(
                (SELECT jsonb_agg(elem ORDER BY ord)
                 FROM jsonb_array_elements(likes) WITH ORDINALITY AS t(elem, ord)
                 WHERE elem->>'user' <> $2::text),
                '[]'::jsonb)
            WHERE id = $1
              AND likes @> jsonb_build_array(jsonb_build_object('user', $2::text))
            RETURNING id, user_id, text, name, avatar, likes, comments, date
            "#,
        )
        .bind(post_id)
        .bind(user.to_string())
        .fetch_optional(&self.pool)
        .await?;

        self.settle(post_id, row).await
    }

    async fn push_comment(
        &self,
        post_id: Uuid,
        comment: &Comment,
    ) -> Result<Option<Post>, StoreError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            UPDATE posts
            SET comments = jsonb_build_array($2::jsonb) || comments
            WHERE id = $1
            RETURNING id, user_id, text, name, avatar, likes, comments, date
            "#,
        )
        .bind(post_id)
        .bind(Json(comment))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Post::from))
    }

    async fn pull_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Conditional, StoreError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            UPDATE posts
            SET comments = COALESCE(
                (SELECT jsonb_agg(elem ORDER BY ord)
                 FROM jsonb_array_elements(comments) WITH ORDINALITY AS t(elem, ord)
                 WHERE elem->>'_id' <> $2::text),
                '[]'::jsonb)
            WHERE id = $1
              AND comments @> jsonb_build_array(jsonb_build_object('_id', $2::text))
            RETURNING id, user_id, text, name, avatar, likes, comments, date
            "#,
        )
        .bind(post_id)
        .bind(comment_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        self.settle(post_id, row).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}
