//! Login, registration and profile endpoints.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use proctor_core::error::ApiError;
use proctor_core::model::UserProfile;

use crate::api::ApiClient;

/// Shortest password the account settings accept.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Serialize)]
struct LoginBody<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginData {
    access_token: String,
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    username: &'a str,
    password: &'a str,
    email: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdate {
    pub username: String,
    pub email: String,
}

#[derive(Serialize)]
struct PasswordChange<'a> {
    old_password: &'a str,
    new_password: &'a str,
}

impl ApiClient {
    /// Exchange credentials for an access token. The token is also attached
    /// to this client for subsequent calls.
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, username: &str, password: &str) -> Result<String, ApiError> {
        let data: LoginData = self
            .send_json(Method::POST, "/login", &LoginBody { username, password })
            .await?
            .into_data()?;
        self.context_mut().set_token(Some(data.access_token.clone()));
        tracing::info!(username, "logged in");
        Ok(data.access_token)
    }

    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str, email: &str) -> Result<(), ApiError> {
        self.send_json(
            Method::POST,
            "/register",
            &RegisterBody {
                username,
                password,
                email,
            },
        )
        .await?;
        Ok(())
    }

    /// Fetch the current user and remember it in the session context.
    #[instrument(skip(self))]
    pub async fn me(&mut self) -> Result<UserProfile, ApiError> {
        let path = "/user/me";
        let builder = self.request(Method::GET, path)?;
        let profile: UserProfile = self.send(builder, path).await?.into_data()?;
        self.context_mut().user = Some(profile.clone());
        Ok(profile)
    }

    #[instrument(skip(self))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        self.send_json(Method::PUT, "/user", update).await?.into_data()
    }

    #[instrument(skip_all)]
    pub async fn change_password(&self, old_password: &str, new_password: &str) -> Result<(), ApiError> {
        self.send_json(
            Method::PUT,
            "/user/password",
            &PasswordChange {
                old_password,
                new_password,
            },
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_account(&self) -> Result<(), ApiError> {
        let path = "/user";
        let builder = self.request(Method::DELETE, path)?;
        self.send(builder, path).await?;
        Ok(())
    }
}

/// Local checks the settings form makes before changing a password.
pub fn check_new_password(new_password: &str, confirmation: &str) -> Result<(), String> {
    if new_password.is_empty() {
        return Err("new password is empty".into());
    }
    if new_password != confirmation {
        return Err("passwords do not match".into());
    }
    if new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SessionContext;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn login_stores_token_for_later_calls() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/login"))
            .and(body_json(serde_json::json!({"username": "ana", "password": "pw123456"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": "SUCCESS",
                "data": {"access_token": "jwt-abc"}
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/user/me"))
            .and(header("authorization", "Bearer jwt-abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": "SUCCESS",
                "data": {"id": 3, "username": "ana", "email": "ana@example.com"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = ApiClient::new(SessionContext::anonymous(server.uri())).unwrap();
        let token = client.login("ana", "pw123456").await.unwrap();
        assert_eq!(token, "jwt-abc");

        let me = client.me().await.unwrap();
        assert_eq!(me.username, "ana");
        assert_eq!(client.context().user_id(), Some(3));
    }

    #[tokio::test]
    async fn bad_credentials_are_unauthorized() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "code": "invalid_credentials",
                "message": "Wrong username or password"
            })))
            .mount(&server)
            .await;

        let mut client = ApiClient::new(SessionContext::anonymous(server.uri())).unwrap();
        let err = client.login("ana", "nope").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "Wrong username or password"));
        assert!(!client.context().is_authenticated());
    }

    #[tokio::test]
    async fn change_password_body() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/user/password"))
            .and(body_json(serde_json::json!({"old_password": "a", "new_password": "bbbbbb"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"code": "SUCCESS"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(SessionContext::authenticated(server.uri(), "t")).unwrap();
        client.change_password("a", "bbbbbb").await.unwrap();
    }

    #[test]
    fn password_rules() {
        assert!(check_new_password("secret1", "secret1").is_ok());
        assert_eq!(
            check_new_password("secret1", "secret2").unwrap_err(),
            "passwords do not match"
        );
        assert!(check_new_password("abc", "abc").unwrap_err().contains("at least 6"));
    }
}
