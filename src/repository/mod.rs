use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::models::{CommentWithAuthor, Post, Profile};

mod comments;
mod likes;
mod posts;
mod profiles;

pub use comments::CommentRepository;
pub use likes::LikeRepository;
pub use posts::PostRepository;
pub use profiles::ProfileRepository;

/// Query/mutation surface of the remote store, as consumed by the
/// engagement store.
///
/// This trait abstracts the remote relations to allow for testing and
/// alternative implementations.
#[async_trait]
pub trait FeedRepository: Send + Sync {
    /// All posts authored by `user_id`.
    async fn posts_by_author(&self, user_id: Uuid) -> Result<Vec<Post>>;

    /// Single-row profile projection for `user_id`.
    async fn profile(&self, user_id: Uuid) -> Result<Option<Profile>>;

    /// IDs of every post `user_id` has liked.
    async fn liked_post_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>>;

    /// Insert a like row for (`user_id`, `post_id`).
    async fn insert_like(&self, user_id: Uuid, post_id: Uuid) -> Result<()>;

    /// Delete the like row for (`user_id`, `post_id`).
    async fn delete_like(&self, user_id: Uuid, post_id: Uuid) -> Result<()>;

    /// Authoritative like count for a post.
    async fn like_count(&self, post_id: Uuid) -> Result<i64>;

    /// Comments for a post with author display fields, ordered by creation
    /// time ascending.
    async fn comments_for_post(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>>;

    /// Insert a comment and return it with the author projection resolved.
    async fn insert_comment(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<CommentWithAuthor>;
}

/// PostgreSQL-backed implementation of [`FeedRepository`], composed from the
/// per-relation repositories.
#[derive(Clone)]
pub struct SqlxFeedRepository {
    posts: PostRepository,
    likes: LikeRepository,
    comments: CommentRepository,
    profiles: ProfileRepository,
}

impl SqlxFeedRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            posts: PostRepository::new(pool.clone()),
            likes: LikeRepository::new(pool.clone()),
            comments: CommentRepository::new(pool.clone()),
            profiles: ProfileRepository::new(pool),
        }
    }
}

#[async_trait]
impl FeedRepository for SqlxFeedRepository {
    async fn posts_by_author(&self, user_id: Uuid) -> Result<Vec<Post>> {
        self.posts.get_user_posts(user_id).await
    }

    async fn profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        self.profiles.get_profile(user_id).await
    }

    async fn liked_post_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>> {
        self.likes.get_liked_post_ids(user_id).await
    }

    async fn insert_like(&self, user_id: Uuid, post_id: Uuid) -> Result<()> {
        self.likes.create_like(user_id, post_id).await
    }

    async fn delete_like(&self, user_id: Uuid, post_id: Uuid) -> Result<()> {
        self.likes.delete_like(user_id, post_id).await?;
        Ok(())
    }

    async fn like_count(&self, post_id: Uuid) -> Result<i64> {
        self.posts.get_like_count(post_id).await
    }

    async fn comments_for_post(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>> {
        self.comments.get_post_comments(post_id).await
    }

    async fn insert_comment(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<CommentWithAuthor> {
        self.comments.create_comment(post_id, user_id, content).await
    }
}
