//! Authentication flows

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::Model;
use crate::model::session::{SessionRecord, Token};
use crate::model::users::PublicUser;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Username and password are required")]
    MissingCredentials,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Token is required")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Session store failure")]
    Store(color_eyre::Report),
}

impl From<color_eyre::Report> for Error {
    fn from(err: color_eyre::Report) -> Self {
        Self::Store(err)
    }
}

/// Result of a successful login
#[derive(Debug, Clone, PartialEq)]
pub struct Login {
    /// Token of the created session
    pub token: Token,
    /// Logged in user
    pub user: PublicUser,
}

/// Normalizes an optional request field - empty strings are treated as not provided
fn provided(field: Option<&str>) -> Option<&str> {
    field.filter(|field| !field.is_empty())
}

impl Model {
    /// Authenticates the user with credentials, opening a new session
    ///
    /// Unknown user and wrong password are reported the same way so the caller cannot tell
    /// which usernames exist.
    pub async fn login(
        &self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<Login, Error> {
        let (Some(username), Some(password)) = (provided(username), provided(password)) else {
            debug!("Login without credentials");
            return Err(Error::MissingCredentials);
        };

        let user = self
            .credentials()
            .find_by_username(username)
            .filter(|user| user.password_matches(password));

        let Some(user) = user else {
            warn!(username, "Login rejected");
            return Err(Error::InvalidCredentials);
        };

        let token = self.sessions().issue(user).await?;
        info!(username, user_id = %user.id, "User logged in");

        Ok(Login {
            token,
            user: user.public(),
        })
    }

    /// Returns the session attached to the token
    pub async fn verify(&self, token: Option<&str>) -> Result<SessionRecord, Error> {
        let token = provided(token).ok_or(Error::MissingToken)?;
        self.sessions()
            .lookup(&Token::from(token))
            .await?
            .ok_or(Error::InvalidToken)
    }

    /// Closes the session if the token is known. Never fails for unknown or missing tokens.
    pub async fn logout(&self, token: Option<&str>) -> Result<(), Error> {
        if let Some(token) = provided(token) {
            let token = Token::from(token);
            if let Some(session) = self.sessions().lookup(&token).await? {
                info!(username = %session.username, user_id = %session.user_id, "User logged out");
            }
            self.sessions().revoke(&token).await?;
        }

        Ok(())
    }

    /// Number of currently open sessions
    pub async fn active_sessions(&self) -> Result<usize, Error> {
        self.sessions().count().await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::users::{Role, UserId};

    #[tokio::test]
    async fn login_with_valid_credentials() {
        let model = Model::test().await.unwrap();

        let login = model.login(Some("admin"), Some("admin123")).await.unwrap();
        assert_eq!(
            login.user,
            PublicUser {
                id: UserId::new(1),
                username: "admin".to_owned(),
                name: "Administrator".to_owned(),
                role: Role::Admin,
            }
        );
        assert!(login.token.as_str().starts_with("token_"));
        assert_eq!(model.active_sessions().await.unwrap(), 1);

        let other = model.login(Some("admin"), Some("admin123")).await.unwrap();
        assert_ne!(login.token, other.token);
        assert_eq!(model.active_sessions().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn login_without_credentials() {
        let model = Model::test().await.unwrap();

        let cases = [
            (None, None),
            (Some("admin"), None),
            (None, Some("admin123")),
            (Some(""), Some("admin123")),
            (Some("admin"), Some("")),
            (Some("nobody"), Some("")),
        ];

        for (username, password) in cases {
            let err = model.login(username, password).await.unwrap_err();
            assert!(
                matches!(err, Error::MissingCredentials),
                "{username:?}/{password:?}: {err:?}"
            );
        }

        assert_eq!(model.active_sessions().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn login_with_invalid_credentials() {
        let model = Model::test().await.unwrap();

        let err = model
            .login(Some("admin"), Some("wrongpass"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));

        let err = model
            .login(Some("nobody"), Some("admin123"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));

        // Password of another user
        let err = model.login(Some("admin"), Some("pass123")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));

        assert_eq!(model.active_sessions().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn verify_issued_token() {
        let model = Model::test().await.unwrap();
        let login = model.login(Some("user2"), Some("pass123")).await.unwrap();

        let session = model.verify(Some(login.token.as_str())).await.unwrap();
        assert_eq!(session.user_id, UserId::new(3));
        assert_eq!(session.username, "user2");
        assert_eq!(session.name, "Jane Smith");
        assert_eq!(session.role, Role::User);
    }

    #[tokio::test]
    async fn verify_rejections() {
        let model = Model::test().await.unwrap();

        let err = model.verify(None).await.unwrap_err();
        assert!(matches!(err, Error::MissingToken));

        let err = model.verify(Some("")).await.unwrap_err();
        assert!(matches!(err, Error::MissingToken));

        let err = model.verify(Some("token_0_unknown")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidToken));
    }

    #[tokio::test]
    async fn logout_revokes_session() {
        let model = Model::test().await.unwrap();
        let login = model.login(Some("user1"), Some("pass123")).await.unwrap();
        let token = login.token.as_str();

        model.logout(Some(token)).await.unwrap();

        let err = model.verify(Some(token)).await.unwrap_err();
        assert!(matches!(err, Error::InvalidToken));
        assert_eq!(model.active_sessions().await.unwrap(), 0);

        // Repeated and bogus logouts still succeed
        model.logout(Some(token)).await.unwrap();
        model.logout(Some("never_issued")).await.unwrap();
        model.logout(Some("")).await.unwrap();
        model.logout(None).await.unwrap();
    }

    #[tokio::test]
    async fn logout_leaves_other_sessions() {
        let model = Model::test().await.unwrap();
        let first = model.login(Some("user1"), Some("pass123")).await.unwrap();
        let second = model.login(Some("user1"), Some("pass123")).await.unwrap();

        model.logout(Some(first.token.as_str())).await.unwrap();

        let session = model.verify(Some(second.token.as_str())).await.unwrap();
        assert_eq!(session.username, "user1");
        assert_eq!(model.active_sessions().await.unwrap(), 1);
    }
}
