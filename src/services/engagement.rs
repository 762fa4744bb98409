use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::models::{CommentWithAuthor, Post, Profile};
use crate::error::{InteractionError, InteractionResult, LoadError};
use crate::repository::FeedRepository;

/// Per-viewer feed state exposed to the presentational layer.
///
/// The remote store is the sole source of truth; this is the local working
/// copy that mutations touch optimistically before their remote effect
/// resolves. `like_count` on each post is only ever overwritten from the
/// remote counter, never incremented locally.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedState {
    pub posts: Vec<Post>,
    pub profile: Option<Profile>,
    /// Post IDs the viewer has liked.
    pub liked: HashSet<Uuid>,
    /// Fetched comment threads, keyed by post. Absence means not fetched yet.
    pub comments: HashMap<Uuid, Vec<CommentWithAuthor>>,
    /// Posts whose comment panel is currently open.
    pub open_panels: HashSet<Uuid>,
    /// Per-post comment input buffers.
    pub drafts: HashMap<Uuid, String>,
    pub loaded: bool,
}

impl FeedState {
    pub fn is_liked(&self, post_id: Uuid) -> bool {
        self.liked.contains(&post_id)
    }

    pub fn like_count(&self, post_id: Uuid) -> Option<i64> {
        self.posts.iter().find(|p| p.id == post_id).map(|p| p.like_count)
    }
}

/// Optimistic engagement store for one viewer's feed.
///
/// Mutations apply a local tentative transition, publish it, then attempt the
/// remote effect; failures roll the local state back by re-fetching ground
/// truth (falling back to the explicit inverse transition). Two guards keep
/// overlapping completions honest:
///
/// - a per-post async mutex queues like mutations targeting the same post, so
///   reconciliation reads cannot land out of order;
/// - a monotonic epoch scopes in-flight requests to the current mount of the
///   view; completions from a previous mount observe a bumped epoch and drop
///   their writes.
pub struct EngagementStore<R> {
    repo: Arc<R>,
    viewer: Uuid,
    state: RwLock<FeedState>,
    epoch: AtomicU64,
    post_guards: DashMap<Uuid, Arc<Mutex<()>>>,
    tx: watch::Sender<FeedState>,
}

impl<R: FeedRepository> EngagementStore<R> {
    pub fn new(repo: Arc<R>, viewer: Uuid) -> Self {
        let (tx, _rx) = watch::channel(FeedState::default());
        Self {
            repo,
            viewer,
            state: RwLock::new(FeedState::default()),
            epoch: AtomicU64::new(0),
            post_guards: DashMap::new(),
            tx,
        }
    }

    pub fn viewer(&self) -> Uuid {
        self.viewer
    }

    /// Current state, cloned.
    pub fn snapshot(&self) -> FeedState {
        self.state.read().expect("feed state lock poisoned").clone()
    }

    /// Receiver that observes every published state change (the re-render
    /// signal for the presentational layer).
    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.tx.subscribe()
    }

    /// Invalidate the current view lifetime. In-flight remote completions
    /// started before this call will not write into the state.
    pub fn invalidate(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    fn is_stale(&self, epoch: u64) -> bool {
        self.current_epoch() != epoch
    }

    /// Mutate the state in a short critical section, then publish a snapshot.
    fn mutate<T>(&self, f: impl FnOnce(&mut FeedState) -> T) -> T {
        let out = {
            let mut state = self.state.write().expect("feed state lock poisoned");
            f(&mut state)
        };
        self.tx
            .send_replace(self.state.read().expect("feed state lock poisoned").clone());
        out
    }

    fn post_guard(&self, post_id: Uuid) -> Arc<Mutex<()>> {
        let entry = self.post_guards.entry(post_id).or_default();
        Arc::clone(&entry)
    }

    /// Fetch posts, profile and the viewer's like-set; replace local state.
    ///
    /// Any fetch failure surfaces as [`LoadError`] and leaves the previous
    /// state untouched, so the caller can render an error state and retry.
    pub async fn load_feed(&self) -> Result<FeedState, LoadError> {
        let epoch = self.current_epoch();

        let posts = self
            .repo
            .posts_by_author(self.viewer)
            .await
            .map_err(LoadError::Posts)?;
        let profile = self
            .repo
            .profile(self.viewer)
            .await
            .map_err(LoadError::Profile)?
            .ok_or(LoadError::ProfileNotFound(self.viewer))?;
        let liked = self
            .repo
            .liked_post_ids(self.viewer)
            .await
            .map_err(LoadError::Likes)?;

        if self.is_stale(epoch) {
            debug!(viewer = %self.viewer, "Discarding stale feed load");
            return Ok(self.snapshot());
        }

        Ok(self.mutate(move |state| {
            *state = FeedState {
                posts,
                profile: Some(profile),
                liked,
                loaded: true,
                ..FeedState::default()
            };
            state.clone()
        }))
    }

    /// Flip the viewer's like on a post.
    ///
    /// The local membership flag flips and publishes before the remote
    /// delete-or-insert resolves. On success the authoritative like count is
    /// re-fetched and overwrites the local count; on any failure the like-set
    /// is re-fetched to restore ground truth and the error is returned for
    /// the boundary to swallow.
    pub async fn toggle_like(&self, post_id: Uuid) -> InteractionResult<()> {
        let guard = self.post_guard(post_id);
        let _serialized = guard.lock().await;
        let epoch = self.current_epoch();

        let was_liked = self.mutate(|state| {
            let was_liked = state.liked.contains(&post_id);
            if was_liked {
                state.liked.remove(&post_id);
            } else {
                state.liked.insert(post_id);
            }
            was_liked
        });

        let mutation = if was_liked {
            self.repo.delete_like(self.viewer, post_id).await
        } else {
            self.repo.insert_like(self.viewer, post_id).await
        };

        let reconcile = match mutation {
            Ok(()) => self.repo.like_count(post_id).await,
            Err(err) => Err(err),
        };

        match reconcile {
            Ok(count) => {
                if self.is_stale(epoch) {
                    debug!(%post_id, "Discarding stale like reconciliation");
                    return Ok(());
                }
                self.mutate(|state| {
                    if let Some(post) = state.posts.iter_mut().find(|p| p.id == post_id) {
                        post.like_count = count;
                    }
                });
                Ok(())
            }
            Err(err) => {
                warn!(%post_id, error = ?err, "Like mutation failed, restoring like set");
                self.restore_like_set(epoch, post_id, was_liked).await;
                Err(InteractionError::Like(err))
            }
        }
    }

    /// Roll the optimistic flip back by re-fetching the viewer's like-set.
    /// Falls back to the inverse transition when the re-fetch itself fails.
    async fn restore_like_set(&self, epoch: u64, post_id: Uuid, was_liked: bool) {
        match self.repo.liked_post_ids(self.viewer).await {
            Ok(liked) => {
                if !self.is_stale(epoch) {
                    self.mutate(|state| state.liked = liked);
                }
            }
            Err(err) => {
                warn!(
                    viewer = %self.viewer,
                    error = ?err,
                    "Like-set re-fetch failed, applying inverse transition"
                );
                if !self.is_stale(epoch) {
                    self.mutate(|state| {
                        if was_liked {
                            state.liked.insert(post_id);
                        } else {
                            state.liked.remove(&post_id);
                        }
                    });
                }
            }
        }
    }

    /// Open or close a post's comment panel.
    ///
    /// Panel states per post: Closed -> Open(empty) -> Open(loaded), with
    /// Open -> Closed always allowed. The first open triggers exactly one
    /// comment fetch; a failed fetch leaves the panel open but empty and does
    /// not populate the cache, so the next open retries. Returns the new
    /// open flag.
    pub async fn toggle_comments(&self, post_id: Uuid) -> bool {
        let epoch = self.current_epoch();

        let (now_open, needs_fetch) = self.mutate(|state| {
            if state.open_panels.remove(&post_id) {
                (false, false)
            } else {
                state.open_panels.insert(post_id);
                (true, !state.comments.contains_key(&post_id))
            }
        });

        if now_open && needs_fetch {
            match self.repo.comments_for_post(post_id).await {
                Ok(comments) => {
                    if self.is_stale(epoch) {
                        debug!(%post_id, "Discarding stale comment fetch");
                    } else {
                        self.mutate(|state| {
                            state.comments.insert(post_id, comments);
                        });
                    }
                }
                Err(err) => {
                    warn!(%post_id, error = ?err, "Failed to fetch comments");
                }
            }
        }

        now_open
    }

    /// Update the comment input buffer for a post.
    pub fn set_draft(&self, post_id: Uuid, text: impl Into<String>) {
        let text = text.into();
        self.mutate(|state| {
            state.drafts.insert(post_id, text);
        });
    }

    /// Insert a comment for the viewer on a post.
    ///
    /// No-ops when `text` trims to empty. On success the returned record
    /// (author fields resolved) is appended to the post's comment sequence
    /// and the post's draft buffer is cleared. On failure nothing was
    /// appended, so local state needs no rollback; the draft is kept.
    pub async fn add_comment(
        &self,
        post_id: Uuid,
        text: &str,
    ) -> InteractionResult<Option<CommentWithAuthor>> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        let epoch = self.current_epoch();

        match self.repo.insert_comment(post_id, self.viewer, text).await {
            Ok(comment) => {
                if !self.is_stale(epoch) {
                    let appended = comment.clone();
                    self.mutate(|state| {
                        state.comments.entry(post_id).or_default().push(appended);
                        state.drafts.remove(&post_id);
                    });
                }
                Ok(Some(comment))
            }
            Err(err) => {
                warn!(%post_id, error = ?err, "Failed to add comment");
                Err(InteractionError::CommentInsert(err))
            }
        }
    }
}
