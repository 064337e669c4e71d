//! Auth provider client — identity is owned by the hosted auth service.
//!
//! This service never sees passwords. Callers present the session token the
//! provider issued; we resolve it to a user id via the provider's user
//! endpoint and use that id to stamp and scope rows.

use std::time::Duration;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("session token rejected by auth provider")]
    InvalidToken,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("auth provider error (status {status}): {message}")]
    Provider { status: u16, message: String },
}

/// The identity behind a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn user_for_token(&self, token: &str) -> Result<AuthUser, AuthError>;
}

/// Client for the hosted auth REST API (`GET /auth/v1/user`).
#[derive(Clone)]
pub struct HostedAuthClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HostedAuthClient {
    pub fn new(base_url: &str, api_key: String) -> Result<Self, AuthError> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(10)).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn user_url(&self) -> String {
        format!("{}/auth/v1/user", self.base_url)
    }
}

#[async_trait]
impl AuthProvider for HostedAuthClient {
    async fn user_for_token(&self, token: &str) -> Result<AuthUser, AuthError> {
        let response = self
            .client
            .get(self.user_url())
            .bearer_auth(token)
            .header("apikey", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            debug!("Auth provider rejected session token ({status})");
            return Err(AuthError::InvalidToken);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("Auth provider returned {status}: {message}");
            return Err(AuthError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<AuthUser>().await?)
    }
}

/// Extractor for handlers that need a signed-in user.
/// Rejects with 401 when the token is missing or the provider refuses it.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthUser);

impl CurrentUser {
    pub fn id(&self) -> Uuid {
        self.0.id
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthError::MissingToken)?;
        let user = state.auth.user_for_token(token).await?;
        Ok(CurrentUser(user))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
