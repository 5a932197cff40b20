use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

// 1. IdentityProvider Contract
/// IdentityProvider
///
/// The session provider: signs staff in and out against the hosted auth
/// service. Handlers only see this trait, so tests swap in
/// `MockIdentityProvider` without any network access.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchanges email and password for an access token.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, IdentityError>;

    /// Revokes the session behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError>;
}

/// AuthSession
///
/// The subset of the hosted auth token response the service uses.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub user: AuthIdentity,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AuthIdentity {
    pub id: Uuid,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("auth provider responded with {0}")]
    Upstream(StatusCode),

    #[error("auth provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

// 2. The Real Implementation (Supabase Auth / GoTrue)
/// SupabaseIdentityClient
///
/// Talks to `{SUPABASE_URL}/auth/v1`. Every call carries the project's anon
/// key in the `apikey` header.
#[derive(Clone)]
pub struct SupabaseIdentityClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseIdentityClient {
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        }
    }
}

#[async_trait]
impl IdentityProvider for SupabaseIdentityClient {
    /// sign_in
    ///
    /// Password grant. 400 and 401 both mean the credentials were rejected.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, IdentityError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);

        let response = self
            .http
            .post(url)
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json::<AuthSession>().await?),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                Err(IdentityError::InvalidCredentials)
            }
            status => Err(IdentityError::Upstream(status)),
        }
    }

    /// sign_out
    ///
    /// Revokes the refresh tokens of the session. An already expired token is
    /// treated as signed out.
    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let url = format!("{}/auth/v1/logout", self.base_url);

        let response = self
            .http
            .post(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED => Ok(()),
            status => Err(IdentityError::Upstream(status)),
        }
    }
}

// 3. The Mock Implementation (For Tests)
/// MockIdentityProvider
///
/// Accepts a single known credential pair and hands out a fixed token.
#[derive(Clone)]
pub struct MockIdentityProvider {
    pub user_id: Uuid,
    pub email: String,
    pub password: String,
    pub access_token: String,
    /// When true, every call behaves as if the provider were down.
    pub should_fail: bool,
}

impl MockIdentityProvider {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            email: "staff@store.test".to_string(),
            password: "correct-horse".to_string(),
            access_token: "mock-access-token".to_string(),
            should_fail: false,
        }
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new(Uuid::nil())
        }
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, IdentityError> {
        if self.should_fail {
            return Err(IdentityError::Upstream(StatusCode::SERVICE_UNAVAILABLE));
        }
        if email != self.email || password != self.password {
            return Err(IdentityError::InvalidCredentials);
        }

        Ok(AuthSession {
            access_token: self.access_token.clone(),
            refresh_token: "mock-refresh-token".to_string(),
            expires_in: 3600,
            user: AuthIdentity { id: self.user_id },
        })
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), IdentityError> {
        if self.should_fail {
            return Err(IdentityError::Upstream(StatusCode::SERVICE_UNAVAILABLE));
        }
        Ok(())
    }
}

/// IdentityState
///
/// The concrete type used to share the identity provider across the application state.
pub type IdentityState = Arc<dyn IdentityProvider>;
