//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::{PostRecord, PostWithAuthor, SessionRecord, UserRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PostUpdate {
    pub id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    async fn create_post(&self, params: NewPost) -> Result<PostRecord, RepoError>;

    /// Persists the update and refreshes `updated_at`. `NotFound` when the
    /// id does not exist.
    async fn update_post(&self, params: PostUpdate) -> Result<PostRecord, RepoError>;

    /// `NotFound` when the id does not exist.
    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostWithAuthor>, RepoError>;

    /// Bare record lookup, used for existence and ownership checks.
    async fn find_record(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError>;

    /// All posts ordered by `created_at` descending. An empty store yields
    /// an empty vector, not an error.
    async fn list_posts(&self) -> Result<Vec<PostWithAuthor>, RepoError>;
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub password_hash: String,
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    /// `Duplicate` when the email is already registered.
    async fn create_user(&self, params: NewUser) -> Result<UserRecord, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError>;
}

#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// Round-trips the backing store to confirm it is reachable.
    async fn health_check(&self) -> Result<(), RepoError>;
}

#[async_trait]
pub trait SessionsRepo: Send + Sync {
    async fn insert_session(&self, record: SessionRecord) -> Result<(), RepoError>;

    async fn find_session(&self, token_hash: &str) -> Result<Option<SessionRecord>, RepoError>;

    /// Idempotent; deleting an unknown token is not an error.
    async fn delete_session(&self, token_hash: &str) -> Result<(), RepoError>;
}
