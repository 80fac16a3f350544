//! Request/response bodies for the HTTP surface.

use serde::{Deserialize, Serialize};

use crate::domain::entities::{Identity, PostWithAuthor};
use crate::domain::validation::PostDraft;

#[derive(Debug, Deserialize)]
pub struct PostPayload {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    pub content: String,
    #[serde(default, rename = "imageUrl")]
    pub image_url: Option<String>,
}

impl From<PostPayload> for PostDraft {
    fn from(payload: PostPayload) -> Self {
        Self {
            title: payload.title,
            subtitle: payload.subtitle,
            content: payload.content,
            image_url: payload.image_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInPayload {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: Identity,
}

#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub posts: Vec<PostWithAuthor>,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub post: PostWithAuthor,
}
