//! Auth service.
//!
//! Tokens are `token_<userId>_<millis>`: an opaque session label for the
//! browser, not a credential. Nothing is signed or stored server-side.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use hearth_core::validation::validate_new_user;
use hearth_core::{NewUser, UserProfile};
use hearth_db::RecordStore;

use crate::error::{ApiError, ApiResult};

/// Builds the session token for a user.
pub fn issue_token(user_id: i64, at: DateTime<Utc>) -> String {
    format!("token_{}_{}", user_id, at.timestamp_millis())
}

/// Extracts the user id from an `Authorization` header value.
///
/// The value is split on `_` and the second segment is the id, so both
/// `token_3_1700000000000` and `Bearer token_3_1700000000000` resolve to 3.
pub fn token_user_id(header: &str) -> Option<i64> {
    header.split('_').nth(1)?.trim().parse().ok()
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn RecordStore>,
}

impl AuthService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        AuthService { store }
    }

    /// Checks the credentials and issues a token.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<(UserProfile, String)> {
        let user = self
            .store
            .get_user_by_username(username)
            .await?
            .filter(|u| u.password == password)
            .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

        info!(user_id = user.id, role = ?user.role, "User logged in");
        Ok((UserProfile::from(&user), issue_token(user.id, Utc::now())))
    }

    /// Resolves the user named by an `Authorization` header.
    pub async fn current_user(&self, header: Option<&str>) -> ApiResult<UserProfile> {
        let header = header.ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;
        if header.split('_').count() < 2 {
            return Err(ApiError::unauthorized("Invalid token"));
        }

        let user = match token_user_id(header) {
            Some(id) => self.store.get_user(id).await?,
            None => None,
        };
        user.map(|u| UserProfile::from(&u))
            .ok_or_else(|| ApiError::unauthorized("User not found"))
    }

    pub async fn list_users(&self) -> ApiResult<Vec<UserProfile>> {
        let users = self.store.list_users().await?;
        Ok(users.iter().map(UserProfile::from).collect())
    }

    pub async fn create_user(&self, user: NewUser) -> ApiResult<UserProfile> {
        validate_new_user(&user)?;
        let user = self.store.create_user(user).await?;
        Ok(UserProfile::from(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_token_round_trip() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let token = issue_token(7, at);
        assert_eq!(token, "token_7_1700000000000");
        assert_eq!(token_user_id(&token), Some(7));
        assert_eq!(token_user_id("Bearer token_12_1"), Some(12));
    }

    #[test]
    fn test_malformed_tokens() {
        assert_eq!(token_user_id("garbage"), None);
        assert_eq!(token_user_id("token_abc_1"), None);
    }
}
