//! Session registry

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use color_eyre::Result;
use derivative::Derivative;
use serde::{Serialize, Serializer};
use tokio::sync::RwLock;
use tracing::debug;

use crate::model::users::{Role, User, UserId};

/// Prefix of every issued token
const TOKEN_PREFIX: &str = "token_";

/// Alphabet of the random token suffix (base 36)
const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

const SUFFIX_LEN: usize = 9;

/// Opaque bearer token identifying a session
///
/// Token has a structure of `token_{millis}_{suffix}` where `millis` is the issue time as epoch
/// milliseconds, and `suffix` is a short random base 36 string. The token is easy to inspect but
/// it is not cryptographically secure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Generates a new token for the current time
    pub fn generate() -> Self {
        Self::generate_at(Utc::now())
    }

    fn generate_at(now: DateTime<Utc>) -> Self {
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| SUFFIX_ALPHABET[fastrand::usize(..SUFFIX_ALPHABET.len())] as char)
            .collect();

        Self(format!("{TOKEN_PREFIX}{}_{suffix}", now.timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Token {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for Token {
    fn from(token: &str) -> Self {
        Self(token.to_owned())
    }
}

/// Formats a timestamp the way it is exposed through the API: `2024-05-01T12:00:00.000Z`
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_timestamp<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_timestamp(timestamp))
}

/// Snapshot of the user identity taken on login
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub user_id: UserId,
    pub username: String,
    pub name: String,
    pub role: Role,
    #[serde(serialize_with = "serialize_timestamp")]
    pub login_time: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(user: &User, login_time: DateTime<Utc>) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            name: user.name.clone(),
            role: user.role,
            login_time,
        }
    }
}

/// Storage of active sessions
///
/// Absence of a token means that the session was never issued or it was already revoked - those
/// cases are indistinguishable.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Opens a new session for the user, returning its token
    async fn issue(&self, user: &User) -> Result<Token>;

    /// Returns session attached to the token
    async fn lookup(&self, token: &Token) -> Result<Option<SessionRecord>>;

    /// Closes the session. Revoking unknown token is a no-op.
    async fn revoke(&self, token: &Token) -> Result<()>;

    /// Number of active sessions
    async fn count(&self) -> Result<usize>;
}

/// Process-local session store
#[derive(Debug, Derivative)]
#[derivative(Default(new = "true"))]
pub struct MemorySessions {
    sessions: RwLock<HashMap<Token, SessionRecord>>,
}

#[async_trait]
impl SessionStore for MemorySessions {
    async fn issue(&self, user: &User) -> Result<Token> {
        let mut sessions = self.sessions.write().await;

        // Tokens issued in the same millisecond differ only by the random suffix
        let token = loop {
            let token = Token::generate();
            if !sessions.contains_key(&token) {
                break token;
            }
        };

        sessions.insert(token.clone(), SessionRecord::new(user, Utc::now()));
        debug!(user_id = %user.id, active = sessions.len(), "Session issued");

        Ok(token)
    }

    async fn lookup(&self, token: &Token) -> Result<Option<SessionRecord>> {
        Ok(self.sessions.read().await.get(token).cloned())
    }

    async fn revoke(&self, token: &Token) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.remove(token) {
            debug!(user_id = %session.user_id, active = sessions.len(), "Session revoked");
        }
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.sessions.read().await.len())
    }
}
