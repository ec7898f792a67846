//! Bearer-token authentication
//!
//! Identity is owned by an external provider; this service only needs to map
//! a presented token to the user it was issued for.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use rand::RngExt;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::UserId;
use crate::{Result, WorkToHomeError};

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Resolve a bearer token to a user, or fail with `Unauthorized`
    async fn authenticate(&self, token: &str) -> Result<UserId>;
}

/// Token table held in memory, seeded from configuration
#[derive(Default)]
pub struct TokenAuthenticator {
    tokens: RwLock<HashMap<String, UserId>>,
}

impl TokenAuthenticator {
    #[must_use]
    pub fn new(tokens: HashMap<String, UserId>) -> Self {
        Self {
            tokens: RwLock::new(tokens),
        }
    }

    /// Mint a fresh random token for a user
    pub async fn issue(&self, user_id: UserId) -> String {
        let token = generate_token();
        self.tokens.write().await.insert(token.clone(), user_id);
        token
    }
}

#[async_trait]
impl Authenticator for TokenAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<UserId> {
        self.tokens
            .read()
            .await
            .get(token)
            .copied()
            .ok_or(WorkToHomeError::Unauthorized)
    }
}

/// 128 random bits as lowercase hex
#[must_use]
pub fn generate_token() -> String {
    let value: u128 = rand::rng().random();
    format!("{value:032x}")
}

/// The authenticated caller of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub UserId);

impl<S> FromRequestParts<S> for AuthUser
where
    Arc<dyn Authenticator>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = WorkToHomeError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(WorkToHomeError::Unauthorized)?;

        let authenticator = Arc::<dyn Authenticator>::from_ref(state);
        let user_id = authenticator.authenticate(token).await.inspect_err(|_| {
            debug!("Rejected unknown access token");
        })?;
        Ok(AuthUser(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_issue_and_authenticate() {
        let auth = TokenAuthenticator::default();
        let user_id = Uuid::new_v4();
        let token = auth.issue(user_id).await;

        assert_eq!(token.len(), 32);
        assert_eq!(auth.authenticate(&token).await.unwrap(), user_id);
    }

    #[tokio::test]
    async fn test_unknown_token_is_unauthorized() {
        let auth = TokenAuthenticator::new(HashMap::new());
        let err = auth.authenticate("nope").await.unwrap_err();
        assert!(matches!(err, WorkToHomeError::Unauthorized));
    }

    #[test]
    fn test_generated_tokens_differ() {
        assert_ne!(generate_token(), generate_token());
    }
}
