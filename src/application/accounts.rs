//! Email/password accounts: registration, sign-in, sign-out.
//!
//! Passwords are stored as salted SHA-256 digests and compared in constant
//! time. Session tokens are random, returned to the caller exactly once for
//! cookie issuance, and persisted only as digests.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::application::repos::{NewUser, RepoError, SessionsRepo, UsersRepo};
use crate::application::sessions::hash_token;
use crate::domain::entities::{SessionRecord, UserRecord};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("invalid {0}")]
    InvalidField(&'static str),
    #[error("email already registered")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// A freshly issued session, carrying the raw token for cookie issuance.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub user: UserRecord,
    pub token: String,
    pub expires_at: OffsetDateTime,
}

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UsersRepo>,
    sessions: Arc<dyn SessionsRepo>,
    session_ttl: Duration,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UsersRepo>,
        sessions: Arc<dyn SessionsRepo>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            users,
            sessions,
            session_ttl,
        }
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<IssuedSession, AccountError> {
        if name.trim().is_empty() {
            return Err(AccountError::InvalidField("name"));
        }
        if !email.contains('@') || email.trim().is_empty() {
            return Err(AccountError::InvalidField("email"));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AccountError::InvalidField("password"));
        }

        let params = NewUser {
            name: name.trim().to_string(),
            email: email.trim().to_ascii_lowercase(),
            image: None,
            password_hash: hash_password(password),
        };

        let user = match self.users.create_user(params).await {
            Ok(user) => user,
            Err(RepoError::Duplicate { .. }) => return Err(AccountError::EmailTaken),
            Err(err) => return Err(err.into()),
        };

        metrics::counter!("foglio_accounts_registered_total").increment(1);

        self.issue_session(user).await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<IssuedSession, AccountError> {
        let normalized = email.trim().to_ascii_lowercase();
        let Some(user) = self.users.find_by_email(&normalized).await? else {
            return Err(AccountError::InvalidCredentials);
        };

        if !verify_password(&user.password_hash, password) {
            return Err(AccountError::InvalidCredentials);
        }

        self.issue_session(user).await
    }

    /// Idempotent: signing out an unknown or already-cleared token succeeds.
    pub async fn sign_out(&self, token: &str) -> Result<(), AccountError> {
        self.sessions.delete_session(&hash_token(token)).await?;
        Ok(())
    }

    async fn issue_session(&self, user: UserRecord) -> Result<IssuedSession, AccountError> {
        let token = generate_token();
        let now = OffsetDateTime::now_utc();
        let expires_at = now + self.session_ttl;

        self.sessions
            .insert_session(SessionRecord {
                token_hash: hash_token(&token),
                user_id: user.id,
                created_at: now,
                expires_at,
            })
            .await?;

        metrics::counter!("foglio_sessions_issued_total").increment(1);

        Ok(IssuedSession {
            user,
            token,
            expires_at,
        })
    }
}

fn generate_token() -> String {
    let mut bytes = Vec::with_capacity(32);
    bytes.extend_from_slice(Uuid::new_v4().as_bytes());
    bytes.extend_from_slice(Uuid::new_v4().as_bytes());
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Stored form: `hex(salt)$hex(sha256(salt || password))`.
fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4();
    let digest = salted_digest(salt.as_bytes(), password);
    format!("{}${}", hex::encode(salt.as_bytes()), hex::encode(digest))
}

fn verify_password(stored: &str, candidate: &str) -> bool {
    let Some((salt_hex, digest_hex)) = stored.split_once('$') else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (hex::decode(salt_hex), hex::decode(digest_hex)) else {
        return false;
    };

    let actual = salted_digest(&salt, candidate);
    expected.ct_eq(&actual).unwrap_u8() == 1
}

fn salted_digest(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}
