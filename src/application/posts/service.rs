//! The post CRUD orchestrator: session resolution, validation, persistence.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::application::repos::{NewPost, PostUpdate, PostsRepo};
use crate::application::sessions::SessionResolver;
use crate::domain::entities::PostWithAuthor;
use crate::domain::validation::{PostDraft, validate_post};

use super::types::{Ack, PostError};

#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn PostsRepo>,
    resolver: SessionResolver,
    /// When set, update and delete require the caller to be the post's
    /// author. Off by default: only create checks the session, and
    /// update/delete are open to any caller that reaches them past the
    /// admin access guard.
    require_owner_for_mutation: bool,
}

impl PostService {
    pub fn new(
        repo: Arc<dyn PostsRepo>,
        resolver: SessionResolver,
        require_owner_for_mutation: bool,
    ) -> Self {
        Self {
            repo,
            resolver,
            require_owner_for_mutation,
        }
    }

    /// Creates a post attributed to the session identity. Anonymous callers
    /// are rejected before the payload is even validated.
    pub async fn create_post(
        &self,
        session_token: Option<&str>,
        draft: PostDraft,
    ) -> Result<Ack, PostError> {
        let identity = self
            .resolver
            .resolve(session_token)
            .await?
            .ok_or(PostError::Unauthorized)?;

        let valid = validate_post(draft)?;

        let post = self
            .repo
            .create_post(NewPost {
                author_id: identity.id,
                title: valid.title,
                subtitle: valid.subtitle,
                content: valid.content,
                image_url: valid.image_url,
            })
            .await?;

        info!(
            target = "foglio::posts",
            post_id = %post.id,
            author_id = %identity.id,
            "post created",
        );
        metrics::counter!("foglio_posts_created_total").increment(1);

        Ok(Ack::new("Post created successfully"))
    }

    pub async fn update_post(
        &self,
        session_token: Option<&str>,
        id: Uuid,
        draft: PostDraft,
    ) -> Result<Ack, PostError> {
        let valid = validate_post(draft)?;

        let existing = self
            .repo
            .find_record(id)
            .await?
            .ok_or(PostError::NotFound)?;

        if self.require_owner_for_mutation {
            self.ensure_owner(session_token, existing.author_id).await?;
        }

        let post = self
            .repo
            .update_post(PostUpdate {
                id,
                title: valid.title,
                subtitle: valid.subtitle,
                content: valid.content,
                image_url: valid.image_url,
            })
            .await?;

        info!(target = "foglio::posts", post_id = %post.id, "post updated");
        metrics::counter!("foglio_posts_updated_total").increment(1);

        Ok(Ack::new("Post updated successfully"))
    }

    pub async fn delete_post(
        &self,
        session_token: Option<&str>,
        id: Uuid,
    ) -> Result<Ack, PostError> {
        let existing = self
            .repo
            .find_record(id)
            .await?
            .ok_or(PostError::NotFound)?;

        if self.require_owner_for_mutation {
            self.ensure_owner(session_token, existing.author_id).await?;
        }

        self.repo.delete_post(id).await?;

        info!(target = "foglio::posts", post_id = %id, "post deleted");
        metrics::counter!("foglio_posts_deleted_total").increment(1);

        Ok(Ack::new("Post deleted successfully"))
    }

    pub async fn get_post(&self, id: Uuid) -> Result<PostWithAuthor, PostError> {
        self.repo.find_by_id(id).await?.ok_or(PostError::NotFound)
    }

    /// All posts, newest first. An empty store is a valid, empty result.
    pub async fn list_posts(&self) -> Result<Vec<PostWithAuthor>, PostError> {
        Ok(self.repo.list_posts().await?)
    }

    async fn ensure_owner(
        &self,
        session_token: Option<&str>,
        author_id: Uuid,
    ) -> Result<(), PostError> {
        let identity = self
            .resolver
            .resolve(session_token)
            .await?
            .ok_or(PostError::Unauthorized)?;

        if identity.id != author_id {
            return Err(PostError::NotOwner);
        }

        Ok(())
    }
}
