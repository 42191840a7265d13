//! Explicit session context passed to the API client.

use proctor_core::model::{UserId, UserProfile};

/// Who is talking to which backend.
///
/// Note: custom Debug impl masks the access token to keep it out of logs.
#[derive(Clone, Default)]
pub struct SessionContext {
    pub base_url: String,
    token: Option<String>,
    /// Filled in after `GET /user/me` succeeds.
    pub user: Option<UserProfile>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("user", &self.user)
            .finish()
    }
}

impl SessionContext {
    pub fn anonymous(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            user: None,
        }
    }

    pub fn authenticated(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: Some(token.into()),
            user: None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user.as_ref().map(|u| u.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_masks_token() {
        let ctx = SessionContext::authenticated("http://localhost", "secret-token");
        let dbg = format!("{ctx:?}");
        assert!(!dbg.contains("secret-token"));
        assert!(dbg.contains("***"));
    }

    #[test]
    fn empty_token_is_anonymous() {
        let ctx = SessionContext::authenticated("http://localhost", "");
        assert!(!ctx.is_authenticated());
    }
}
