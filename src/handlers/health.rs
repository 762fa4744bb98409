use actix_web::{HttpResponse, Responder};

/// GET /health
pub async fn health() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

/// GET /ready
pub async fn ready() -> impl Responder {
    HttpResponse::Ok().body("READY")
}
