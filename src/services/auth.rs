/// Identity provider client
///
/// Supports the two sign-in paths the front end offers:
/// - password sign-in (resource-owner credentials against the token endpoint)
/// - federated browser flow (authorization URL + state token, code exchange,
///   userinfo projection)
///
/// State tokens are held in-process with a 10-minute TTL; a token is consumed
/// on first use. Credential verification itself is the provider's job - this
/// client only relays and maps outcomes.
use std::time::{Duration, Instant};

use dashmap::DashMap;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::IdentityConfig;
use crate::error::AuthError;

const STATE_TTL: Duration = Duration::from_secs(600);

/// Client for the external identity provider
pub struct IdentityClient {
    config: IdentityConfig,
    http: Client,
    pending_states: DashMap<String, Instant>,
}

/// Federated flow kickoff: where to send the popup, and the state token to
/// hand back on callback.
#[derive(Debug, Serialize)]
pub struct AuthorizationUrl {
    pub url: String,
    pub state: String,
}

/// Established session, as consumed by the caller navigating to a protected
/// route.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub subject: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

impl IdentityClient {
    pub fn new(config: IdentityConfig) -> Self {
        Self {
            config,
            http: Client::new(),
            pending_states: DashMap::new(),
        }
    }

    /// Protected route the caller navigates to after a successful sign-in.
    pub fn post_login_route(&self) -> &str {
        &self.config.post_login_route
    }

    /// Password sign-in against the provider's token endpoint.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let mut params = vec![
            ("grant_type", "password".to_string()),
            ("username", email.to_string()),
            ("password", password.to_string()),
            ("client_id", self.config.client_id.clone()),
            ("scope", "openid profile email".to_string()),
        ];
        if let Some(secret) = &self.config.client_secret {
            params.push(("client_secret", secret.clone()));
        }

        let token = self.request_token(&params).await?;
        self.session_from_token(token).await
    }

    /// Start the federated browser flow: register a state token and build the
    /// authorization URL the popup navigates to.
    pub fn begin_federated(&self, redirect_uri: &str) -> Result<AuthorizationUrl, AuthError> {
        let state = Uuid::new_v4().to_string();

        self.prune_expired_states();
        self.pending_states.insert(state.clone(), Instant::now());

        let url = Url::parse_with_params(
            &self.config.authorize_url,
            &[
                ("response_type", "code"),
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("scope", "openid profile email"),
                ("state", state.as_str()),
            ],
        )
        .map_err(|e| AuthError::Malformed(format!("invalid authorize URL: {}", e)))?;

        debug!(%state, "Federated sign-in started");

        Ok(AuthorizationUrl {
            url: url.into(),
            state,
        })
    }

    /// Complete the federated flow: verify the state token, exchange the code
    /// and resolve the user.
    pub async fn complete_federated(
        &self,
        code: &str,
        state: &str,
        redirect_uri: &str,
    ) -> Result<AuthSession, AuthError> {
        let (_, started) = self
            .pending_states
            .remove(state)
            .ok_or(AuthError::InvalidState)?;
        if started.elapsed() > STATE_TTL {
            warn!(%state, "Expired federated state token");
            return Err(AuthError::InvalidState);
        }

        let mut params = vec![
            ("grant_type", "authorization_code".to_string()),
            ("code", code.to_string()),
            ("redirect_uri", redirect_uri.to_string()),
            ("client_id", self.config.client_id.clone()),
        ];
        if let Some(secret) = &self.config.client_secret {
            params.push(("client_secret", secret.clone()));
        }

        let token = self.request_token(&params).await?;
        self.session_from_token(token).await
    }

    async fn request_token(&self, params: &[(&str, String)]) -> Result<TokenResponse, AuthError> {
        let response = self
            .http
            .post(&self.config.token_url)
            .form(params)
            .send()
            .await?;

        match response.status() {
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "credentials rejected".to_string());
                Err(AuthError::Rejected(body))
            }
            _ => {
                let response = response.error_for_status()?;
                Ok(response.json::<TokenResponse>().await?)
            }
        }
    }

    async fn session_from_token(&self, token: TokenResponse) -> Result<AuthSession, AuthError> {
        let response = self
            .http
            .get(&self.config.userinfo_url)
            .bearer_auth(&token.access_token)
            .send()
            .await?
            .error_for_status()?;

        let info = response.json::<UserInfo>().await?;
        if info.sub.is_empty() {
            return Err(AuthError::Malformed("userinfo without subject".to_string()));
        }

        debug!(
            subject = %info.sub,
            expires_in = ?token.expires_in,
            "Sign-in completed"
        );

        Ok(AuthSession {
            subject: info.sub,
            display_name: info.name,
            email: info.email,
            avatar_url: info.picture,
            access_token: token.access_token,
        })
    }

    fn prune_expired_states(&self) {
        self.pending_states
            .retain(|_, started| started.elapsed() <= STATE_TTL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> IdentityConfig {
        IdentityConfig {
            token_url: "https://id.example.com/token".to_string(),
            authorize_url: "https://id.example.com/authorize".to_string(),
            userinfo_url: "https://id.example.com/userinfo".to_string(),
            client_id: "feed-web".to_string(),
            client_secret: None,
            post_login_route: "/dashboard".to_string(),
        }
    }

    #[test]
    fn authorization_url_carries_state_and_client() {
        let client = IdentityClient::new(test_config());
        let auth_url = client
            .begin_federated("https://app.example.com/callback")
            .unwrap();

        let parsed = Url::parse(&auth_url.url).unwrap();
        let pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert!(pairs.contains(&("client_id".to_string(), "feed-web".to_string())));
        assert!(pairs.contains(&("state".to_string(), auth_url.state.clone())));
        assert!(client.pending_states.contains_key(&auth_url.state));
    }

    #[tokio::test]
    async fn unknown_state_is_rejected_before_any_exchange() {
        let client = IdentityClient::new(test_config());
        let result = client
            .complete_federated("code", "not-a-known-state", "https://app.example.com/cb")
            .await;

        assert!(matches!(result, Err(AuthError::InvalidState)));
    }
}
