use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use tracing::{debug, error};
use uuid::Uuid;

use crate::handlers::auth::ErrorResponse;
use crate::repository::SqlxFeedRepository;
use crate::services::sessions::SessionRegistry;

type Registry = SessionRegistry<SqlxFeedRepository>;

fn feed_not_mounted() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse {
        error: "Feed not mounted".to_string(),
        details: None,
    })
}

/// Mount a viewer's feed and load it
/// POST /api/v1/feed/{user_id}/load
pub async fn load_feed(registry: web::Data<Registry>, path: web::Path<Uuid>) -> impl Responder {
    let user_id = path.into_inner();
    let store = registry.mount(user_id);

    match store.load_feed().await {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot),
        Err(err) => {
            error!(%user_id, error = ?err, "Failed to load feed");
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to load posts. Please try again.".to_string(),
                details: None,
            })
        }
    }
}

/// Current feed snapshot
/// GET /api/v1/feed/{user_id}
pub async fn get_feed(registry: web::Data<Registry>, path: web::Path<Uuid>) -> impl Responder {
    match registry.get(path.into_inner()) {
        Some(store) => HttpResponse::Ok().json(store.snapshot()),
        None => feed_not_mounted(),
    }
}

/// Unmount a viewer's feed
/// DELETE /api/v1/feed/{user_id}
pub async fn unmount_feed(registry: web::Data<Registry>, path: web::Path<Uuid>) -> impl Responder {
    if registry.unmount(path.into_inner()) {
        HttpResponse::NoContent().finish()
    } else {
        feed_not_mounted()
    }
}

/// Toggle the viewer's like on a post
/// POST /api/v1/feed/{user_id}/posts/{post_id}/like
///
/// Mutation failures roll local state back inside the store and are not
/// surfaced; the response is always the current snapshot.
pub async fn toggle_like(
    registry: web::Data<Registry>,
    path: web::Path<(Uuid, Uuid)>,
) -> impl Responder {
    let (user_id, post_id) = path.into_inner();
    let Some(store) = registry.get(user_id) else {
        return feed_not_mounted();
    };

    if let Err(err) = store.toggle_like(post_id).await {
        debug!(%user_id, %post_id, error = ?err, "Like toggle rolled back");
    }
    HttpResponse::Ok().json(store.snapshot())
}

/// Open or close a post's comment panel
/// POST /api/v1/feed/{user_id}/posts/{post_id}/comments/toggle
pub async fn toggle_comments(
    registry: web::Data<Registry>,
    path: web::Path<(Uuid, Uuid)>,
) -> impl Responder {
    let (user_id, post_id) = path.into_inner();
    let Some(store) = registry.get(user_id) else {
        return feed_not_mounted();
    };

    store.toggle_comments(post_id).await;
    HttpResponse::Ok().json(store.snapshot())
}

#[derive(Debug, Deserialize)]
pub struct CommentBody {
    pub text: String,
}

/// Update a post's comment draft buffer
/// PUT /api/v1/feed/{user_id}/posts/{post_id}/comments/draft
pub async fn set_draft(
    registry: web::Data<Registry>,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<CommentBody>,
) -> impl Responder {
    let (user_id, post_id) = path.into_inner();
    let Some(store) = registry.get(user_id) else {
        return feed_not_mounted();
    };

    store.set_draft(post_id, body.into_inner().text);
    HttpResponse::Ok().json(store.snapshot())
}

/// Add a comment to a post
/// POST /api/v1/feed/{user_id}/posts/{post_id}/comments
///
/// Insert failures are logged by the store and not surfaced; empty text is a
/// no-op. The response is always the current snapshot.
pub async fn add_comment(
    registry: web::Data<Registry>,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<CommentBody>,
) -> impl Responder {
    let (user_id, post_id) = path.into_inner();
    let Some(store) = registry.get(user_id) else {
        return feed_not_mounted();
    };

    if let Err(err) = store.add_comment(post_id, &body.text).await {
        debug!(%user_id, %post_id, error = ?err, "Comment insert failed");
    }
    HttpResponse::Ok().json(store.snapshot())
}
