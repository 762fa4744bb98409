#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use engagement_service::domain::models::{CommentWithAuthor, Post, Profile};
use engagement_service::repository::FeedRepository;

/// In-memory stand-in for the remote store.
///
/// Mirrors the trigger-maintained `like_count` column: like mutations adjust
/// the stored post's counter, and `like_count` reads it back. Failure flags
/// make individual remote operations fail on demand; counters record how many
/// times each remote operation was attempted.
#[derive(Default)]
pub struct InMemoryFeed {
    pub posts: Mutex<Vec<Post>>,
    /// (user_id, post_id) pairs.
    pub likes: Mutex<HashSet<(Uuid, Uuid)>>,
    pub comments: Mutex<Vec<CommentWithAuthor>>,
    pub profiles: Mutex<HashMap<Uuid, Profile>>,

    pub fail_like_mutations: AtomicBool,
    pub fail_like_set_fetch: AtomicBool,
    pub fail_comment_fetch: AtomicBool,
    pub fail_comment_insert: AtomicBool,

    pub comment_fetches: AtomicUsize,
    pub comment_inserts: AtomicUsize,

    mutation_delay: Mutex<Option<Duration>>,
}

impl InMemoryFeed {
    pub fn with_profile(user_id: Uuid, display_name: &str) -> Self {
        let feed = Self::default();
        feed.profiles.lock().unwrap().insert(
            user_id,
            Profile {
                user_id,
                display_name: Some(display_name.to_string()),
                avatar_url: Some(format!("https://cdn.example.com/{}.png", display_name)),
                first_name: None,
                last_name: None,
                age: None,
                city: None,
                gender: None,
                interests: None,
            },
        );
        feed
    }

    pub fn seed_post(&self, author: Uuid, title: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.posts.lock().unwrap().push(Post {
            id,
            user_id: author,
            title: title.to_string(),
            content: format!("{} body", title),
            image_url: None,
            category: vec!["general".to_string()],
            like_count: 0,
            created_at: Utc::now(),
        });
        id
    }

    pub fn seed_like(&self, user_id: Uuid, post_id: Uuid) {
        if self.likes.lock().unwrap().insert((user_id, post_id)) {
            self.adjust_like_count(post_id, 1);
        }
    }

    pub fn seed_comment(&self, post_id: Uuid, author: Uuid, content: &str, at: DateTime<Utc>) {
        let author_profile = self.profiles.lock().unwrap().get(&author).cloned();
        self.comments.lock().unwrap().push(CommentWithAuthor {
            id: Uuid::new_v4(),
            post_id,
            user_id: author,
            content: content.to_string(),
            created_at: at,
            author_display_name: author_profile.as_ref().and_then(|p| p.display_name.clone()),
            author_avatar_url: author_profile.as_ref().and_then(|p| p.avatar_url.clone()),
        });
    }

    pub fn set_mutation_delay(&self, delay: Duration) {
        *self.mutation_delay.lock().unwrap() = Some(delay);
    }

    pub fn remote_like_count(&self, post_id: Uuid) -> i64 {
        self.posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == post_id)
            .map(|p| p.like_count)
            .unwrap_or(0)
    }

    pub fn remote_has_like(&self, user_id: Uuid, post_id: Uuid) -> bool {
        self.likes.lock().unwrap().contains(&(user_id, post_id))
    }

    fn adjust_like_count(&self, post_id: Uuid, delta: i64) {
        if let Some(post) = self
            .posts
            .lock()
            .unwrap()
            .iter_mut()
            .find(|p| p.id == post_id)
        {
            post.like_count = (post.like_count + delta).max(0);
        }
    }

    async fn apply_mutation_delay(&self) {
        let delay = *self.mutation_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl FeedRepository for InMemoryFeed {
    async fn posts_by_author(&self, user_id: Uuid) -> Result<Vec<Post>> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        Ok(self.profiles.lock().unwrap().get(&user_id).cloned())
    }

    async fn liked_post_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>> {
        if self.fail_like_set_fetch.load(Ordering::SeqCst) {
            return Err(anyhow!("like-set fetch refused"));
        }
        Ok(self
            .likes
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, p)| *p)
            .collect())
    }

    async fn insert_like(&self, user_id: Uuid, post_id: Uuid) -> Result<()> {
        self.apply_mutation_delay().await;
        if self.fail_like_mutations.load(Ordering::SeqCst) {
            return Err(anyhow!("like insert refused"));
        }
        if self.likes.lock().unwrap().insert((user_id, post_id)) {
            self.adjust_like_count(post_id, 1);
        }
        Ok(())
    }

    async fn delete_like(&self, user_id: Uuid, post_id: Uuid) -> Result<()> {
        self.apply_mutation_delay().await;
        if self.fail_like_mutations.load(Ordering::SeqCst) {
            return Err(anyhow!("like delete refused"));
        }
        if self.likes.lock().unwrap().remove(&(user_id, post_id)) {
            self.adjust_like_count(post_id, -1);
        }
        Ok(())
    }

    async fn like_count(&self, post_id: Uuid) -> Result<i64> {
        Ok(self.remote_like_count(post_id))
    }

    async fn comments_for_post(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>> {
        self.comment_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_comment_fetch.load(Ordering::SeqCst) {
            return Err(anyhow!("comment fetch refused"));
        }
        let mut comments: Vec<CommentWithAuthor> = self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }

    async fn insert_comment(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<CommentWithAuthor> {
        self.comment_inserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_comment_insert.load(Ordering::SeqCst) {
            return Err(anyhow!("comment insert refused"));
        }
        let author_profile = self.profiles.lock().unwrap().get(&user_id).cloned();
        let comment = CommentWithAuthor {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            content: content.to_string(),
            created_at: Utc::now(),
            author_display_name: author_profile.as_ref().and_then(|p| p.display_name.clone()),
            author_avatar_url: author_profile.as_ref().and_then(|p| p.avatar_url.clone()),
        };
        self.comments.lock().unwrap().push(comment.clone());
        Ok(comment)
    }
}
