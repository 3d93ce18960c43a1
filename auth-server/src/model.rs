//! Service global context

use std::sync::Arc;

use color_eyre::Result;

pub mod auth;
pub mod session;
pub mod users;

use session::{MemorySessions, SessionStore};
use users::{Credentials, User};

/// State shared by all the request handlers
#[derive(Clone)]
pub struct Model {
    /// Known users
    credentials: Arc<Credentials>,
    /// Open sessions
    sessions: Arc<dyn SessionStore>,
}

impl Model {
    /// Builds the model over the given session store
    pub fn new(credentials: Credentials, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            credentials: Arc::new(credentials),
            sessions,
        }
    }

    /// Context for testing purposes - demo users and empty in-memory session store
    pub async fn test() -> Result<Self> {
        Ok(Self::new(
            Credentials::default(),
            Arc::new(MemorySessions::new()),
        ))
    }

    /// Context from configuration
    ///
    /// If no users are configured, the demo users are registered. Sessions are always kept in
    /// memory.
    pub fn with_config(users: Vec<User>) -> Result<Self> {
        let credentials = if users.is_empty() {
            Credentials::default()
        } else {
            Credentials::new(users)?
        };

        Ok(Self::new(credentials, Arc::new(MemorySessions::new())))
    }

    /// Accesses the credentials registry
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Accesses the session store
    pub fn sessions(&self) -> &dyn SessionStore {
        self.sessions.as_ref()
    }
}
