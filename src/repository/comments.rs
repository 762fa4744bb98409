use crate::domain::models::CommentWithAuthor;
use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for Comment operations
#[derive(Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new comment, returning it with the author projection resolved
    pub async fn create_comment(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<CommentWithAuthor> {
        let comment = sqlx::query_as::<_, CommentWithAuthor>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (post_id, user_id, content)
                VALUES ($1, $2, $3)
                RETURNING id, post_id, user_id, content, created_at
            )
            SELECT
                i.id, i.post_id, i.user_id, i.content, i.created_at,
                p.display_name AS author_display_name,
                p.avatar_url AS author_avatar_url
            FROM inserted i
            LEFT JOIN profiles p ON p.user_id = i.user_id
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    /// Get comments for a post with author display fields, oldest first
    pub async fn get_post_comments(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>> {
        let comments = sqlx::query_as::<_, CommentWithAuthor>(
            r#"
            SELECT
                c.id, c.post_id, c.user_id, c.content, c.created_at,
                p.display_name AS author_display_name,
                p.avatar_url AS author_avatar_url
            FROM comments c
            LEFT JOIN profiles p ON p.user_id = c.user_id
            WHERE c.post_id = $1
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }
}
