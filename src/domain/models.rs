use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - a feed post authored by a user
///
/// `like_count` mirrors the authoritative counter column on the `posts`
/// relation, maintained remotely by a trigger on `likes`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub category: Vec<String>,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Comment joined with its author's display fields
///
/// Flattened projection of `comments` joined to `profiles` on `user_id`, the
/// shape the comment panel renders directly.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommentWithAuthor {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author_display_name: Option<String>,
    pub author_avatar_url: Option<String>,
}

/// Profile entity - read-mostly, fetched once per viewed user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i32>,
    pub city: Option<String>,
    pub gender: Option<String>,
    pub interests: Option<String>,
}
