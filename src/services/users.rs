//! User profiles

use tracing::{info, instrument};

use crate::models::{ProfileUpdate, User, UserId};
use crate::repository::Repositories;
use crate::{Result, WorkToHomeError};

#[derive(Clone)]
pub struct UserService {
    repos: Repositories,
}

impl UserService {
    #[must_use]
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Create a profile for a user the identity provider already knows
    #[instrument(skip(self))]
    pub async fn register(&self, email: &str, username: &str) -> Result<User> {
        let email = email.trim();
        let username = username.trim();
        if !is_plausible_email(email) {
            return Err(WorkToHomeError::validation("Invalid email format"));
        }
        if username.is_empty() {
            return Err(WorkToHomeError::validation("username is required"));
        }

        let user = User::new(email, username);
        self.repos.users.save_user(&user).await?;
        info!("Registered user {}", user.id);
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn profile(&self, user_id: UserId) -> Result<User> {
        self.repos
            .users
            .get_user(user_id)
            .await?
            .ok_or_else(|| WorkToHomeError::not_found("User"))
    }

    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, user_id: UserId, update: ProfileUpdate) -> Result<User> {
        let mut user = self.profile(user_id).await?;
        update.apply(&mut user)?;
        self.repos.users.save_user(&user).await?;
        Ok(user)
    }
}

/// `local@domain.tld` with no whitespace
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !email.chars().any(char::is_whitespace)
        && !domain.contains('@')
        && domain
            .rsplit_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && tld.len() >= 2)
}
