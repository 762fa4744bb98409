use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::AuthError;
use crate::services::auth::{AuthSession, IdentityClient};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub session: AuthSession,
    /// Protected route the client navigates to on success.
    pub redirect_to: String,
}

/// Password sign-in
/// POST /api/v1/auth/login
pub async fn login(
    identity: web::Data<IdentityClient>,
    req: web::Json<LoginRequest>,
) -> impl Responder {
    match identity.sign_in_with_password(&req.email, &req.password).await {
        Ok(session) => HttpResponse::Ok().json(LoginResponse {
            redirect_to: identity.post_login_route().to_string(),
            session,
        }),
        Err(AuthError::Rejected(details)) => HttpResponse::Unauthorized().json(ErrorResponse {
            error: "Invalid credentials".to_string(),
            details: Some(details),
        }),
        Err(err) => {
            error!(error = ?err, "Password sign-in failed");
            HttpResponse::BadGateway().json(ErrorResponse {
                error: "Identity provider unavailable".to_string(),
                details: None,
            })
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FederatedStartRequest {
    pub redirect_uri: String,
}

/// Start the federated popup flow
/// POST /api/v1/auth/federated/start
pub async fn federated_start(
    identity: web::Data<IdentityClient>,
    req: web::Json<FederatedStartRequest>,
) -> impl Responder {
    match identity.begin_federated(&req.redirect_uri) {
        Ok(auth_url) => HttpResponse::Ok().json(auth_url),
        Err(err) => {
            error!(error = ?err, "Failed to build authorization URL");
            HttpResponse::BadRequest().json(ErrorResponse {
                error: "Failed to start federated sign-in".to_string(),
                details: None,
            })
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FederatedCallbackRequest {
    pub code: String,
    pub state: String,
    pub redirect_uri: String,
}

/// Complete the federated popup flow
/// POST /api/v1/auth/federated/callback
pub async fn federated_callback(
    identity: web::Data<IdentityClient>,
    req: web::Json<FederatedCallbackRequest>,
) -> impl Responder {
    match identity
        .complete_federated(&req.code, &req.state, &req.redirect_uri)
        .await
    {
        Ok(session) => HttpResponse::Ok().json(LoginResponse {
            redirect_to: identity.post_login_route().to_string(),
            session,
        }),
        Err(AuthError::InvalidState) => HttpResponse::Unauthorized().json(ErrorResponse {
            error: "Unknown or expired sign-in attempt".to_string(),
            details: None,
        }),
        Err(AuthError::Rejected(details)) => HttpResponse::Unauthorized().json(ErrorResponse {
            error: "Sign-in rejected".to_string(),
            details: Some(details),
        }),
        Err(err) => {
            error!(error = ?err, "Federated sign-in failed");
            HttpResponse::BadGateway().json(ErrorResponse {
                error: "Identity provider unavailable".to_string(),
                details: None,
            })
        }
    }
}
