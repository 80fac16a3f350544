use serde::Serialize;
use thiserror::Error;

use crate::application::repos::RepoError;
use crate::application::sessions::SessionError;
use crate::domain::validation::ValidationError;

#[derive(Debug, Error)]
pub enum PostError {
    #[error("unauthorized: a signed-in session is required")]
    Unauthorized,
    #[error("forbidden: only the author may modify this post")]
    NotOwner,
    #[error("post not found")]
    NotFound,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Success acknowledgment returned by mutation operations.
#[derive(Debug, Clone, Serialize)]
pub struct Ack {
    pub success: bool,
    pub message: &'static str,
}

impl Ack {
    pub(crate) fn new(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }
}
