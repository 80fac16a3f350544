//! Session resolution: exchanges a session cookie for an identity.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use thiserror::Error;
use time::OffsetDateTime;

use crate::application::repos::{RepoError, SessionsRepo, UsersRepo};
use crate::domain::entities::Identity;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Hash applied to session tokens before they are stored or looked up.
/// The raw token only ever lives in the client cookie.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Clone)]
pub struct SessionResolver {
    sessions: Arc<dyn SessionsRepo>,
    users: Arc<dyn UsersRepo>,
}

impl SessionResolver {
    pub fn new(sessions: Arc<dyn SessionsRepo>, users: Arc<dyn UsersRepo>) -> Self {
        Self { sessions, users }
    }

    /// Resolves the cookie value into an identity, or `None` for anonymous
    /// callers. Unknown, expired, and orphaned tokens all resolve to `None`;
    /// only storage failures surface as errors. No side effects.
    pub async fn resolve(&self, token: Option<&str>) -> Result<Option<Identity>, SessionError> {
        let Some(token) = token else {
            return Ok(None);
        };

        let token_hash = hash_token(token);
        let Some(session) = self.sessions.find_session(&token_hash).await? else {
            return Ok(None);
        };

        if session.expires_at <= OffsetDateTime::now_utc() {
            return Ok(None);
        }

        let Some(user) = self.users.find_by_id(session.user_id).await? else {
            return Ok(None);
        };

        Ok(Some(Identity {
            id: user.id,
            name: user.name,
            image: user.image,
        }))
    }
}
