use async_trait::async_trait;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{NewPost, PostUpdate, PostsRepo, RepoError};
use crate::domain::entities::{AuthorProjection, PostRecord, PostWithAuthor};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(FromRow)]
struct PostRow {
    id: Uuid,
    author_id: Uuid,
    title: String,
    subtitle: Option<String>,
    content: String,
    image_url: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            author_id: row.author_id,
            title: row.title,
            subtitle: row.subtitle,
            content: row.content,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct PostWithAuthorRow {
    id: Uuid,
    author_id: Uuid,
    title: String,
    subtitle: Option<String>,
    content: String,
    image_url: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    author_name: String,
    author_image: Option<String>,
}

impl From<PostWithAuthorRow> for PostWithAuthor {
    fn from(row: PostWithAuthorRow) -> Self {
        Self {
            author: AuthorProjection {
                id: row.author_id,
                name: row.author_name,
                image: row.author_image,
            },
            post: PostRecord {
                id: row.id,
                author_id: row.author_id,
                title: row.title,
                subtitle: row.subtitle,
                content: row.content,
                image_url: row.image_url,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

const POST_WITH_AUTHOR_COLUMNS: &str = "p.id, p.author_id, p.title, p.subtitle, p.content, \
     p.image_url, p.created_at, p.updated_at, \
     u.name AS author_name, u.image AS author_image";

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn create_post(&self, params: NewPost) -> Result<PostRecord, RepoError> {
        let id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();

        let row: PostRow = sqlx::query_as(
            r#"
            INSERT INTO posts (id, author_id, title, subtitle, content, image_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING id, author_id, title, subtitle, content, image_url, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(params.author_id)
        .bind(params.title)
        .bind(params.subtitle)
        .bind(params.content)
        .bind(params.image_url)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(PostRecord::from(row))
    }

    async fn update_post(&self, params: PostUpdate) -> Result<PostRecord, RepoError> {
        // GREATEST keeps updated_at strictly ahead of the prior value even
        // when two writes land within the clock resolution.
        let row: PostRow = sqlx::query_as(
            r#"
            UPDATE posts
               SET title = $2,
                   subtitle = $3,
                   content = $4,
                   image_url = $5,
                   updated_at = GREATEST(now(), updated_at + interval '1 microsecond')
             WHERE id = $1
            RETURNING id, author_id, title, subtitle, content, image_url, created_at, updated_at
            "#,
        )
        .bind(params.id)
        .bind(params.title)
        .bind(params.subtitle)
        .bind(params.content)
        .bind(params.image_url)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(PostRecord::from(row))
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostWithAuthor>, RepoError> {
        let row: Option<PostWithAuthorRow> = sqlx::query_as(&format!(
            r#"
            SELECT {POST_WITH_AUTHOR_COLUMNS}
              FROM posts p
              JOIN users u ON u.id = p.author_id
             WHERE p.id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(PostWithAuthor::from))
    }

    async fn find_record(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        let row: Option<PostRow> = sqlx::query_as(
            r#"
            SELECT id, author_id, title, subtitle, content, image_url, created_at, updated_at
              FROM posts
             WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(PostRecord::from))
    }

    async fn list_posts(&self) -> Result<Vec<PostWithAuthor>, RepoError> {
        let rows: Vec<PostWithAuthorRow> = sqlx::query_as(&format!(
            r#"
            SELECT {POST_WITH_AUTHOR_COLUMNS}
              FROM posts p
              JOIN users u ON u.id = p.author_id
             ORDER BY p.created_at DESC
            "#,
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostWithAuthor::from).collect())
    }
}
