//! Shared in-memory repositories backing the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use uuid::Uuid;

use foglio::application::accounts::AccountService;
use foglio::application::posts::PostService;
use foglio::application::repos::{
    HealthCheck, NewPost, NewUser, PostUpdate, PostsRepo, RepoError, SessionsRepo, UsersRepo,
};
use foglio::application::sessions::{SessionResolver, hash_token};
use foglio::domain::entities::{
    AuthorProjection, PostRecord, PostWithAuthor, SessionRecord, UserRecord,
};
use foglio::infra::http::{self, AppState, GuardConfig};

pub struct MemoryStore {
    posts: Mutex<HashMap<Uuid, PostRecord>>,
    users: Mutex<HashMap<Uuid, UserRecord>>,
    sessions: Mutex<HashMap<String, SessionRecord>>,
    clock: Mutex<OffsetDateTime>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            posts: Mutex::default(),
            users: Mutex::default(),
            sessions: Mutex::default(),
            clock: Mutex::new(OffsetDateTime::now_utc()),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            clock: Mutex::new(OffsetDateTime::now_utc()),
            ..Self::default()
        })
    }

    /// Strictly monotonic timestamps, so ordering assertions are stable even
    /// when calls land within the clock resolution.
    async fn tick(&self) -> OffsetDateTime {
        let mut clock = self.clock.lock().await;
        let now = OffsetDateTime::now_utc();
        *clock = if now > *clock {
            now
        } else {
            *clock + Duration::nanoseconds(1)
        };
        *clock
    }

    async fn with_author(&self, post: PostRecord) -> Result<PostWithAuthor, RepoError> {
        let users = self.users.lock().await;
        let author = users
            .get(&post.author_id)
            .ok_or_else(|| RepoError::from_persistence("author missing"))?;
        Ok(PostWithAuthor {
            author: AuthorProjection {
                id: author.id,
                name: author.name.clone(),
                image: author.image.clone(),
            },
            post,
        })
    }
}

#[async_trait]
impl PostsRepo for MemoryStore {
    async fn create_post(&self, params: NewPost) -> Result<PostRecord, RepoError> {
        let now = self.tick().await;
        let record = PostRecord {
            id: Uuid::new_v4(),
            author_id: params.author_id,
            title: params.title,
            subtitle: params.subtitle,
            content: params.content,
            image_url: params.image_url,
            created_at: now,
            updated_at: now,
        };
        self.posts.lock().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_post(&self, params: PostUpdate) -> Result<PostRecord, RepoError> {
        let now = self.tick().await;
        let mut posts = self.posts.lock().await;
        let record = posts.get_mut(&params.id).ok_or(RepoError::NotFound)?;

        record.title = params.title;
        record.subtitle = params.subtitle;
        record.content = params.content;
        record.image_url = params.image_url;
        record.updated_at = if now > record.updated_at {
            now
        } else {
            record.updated_at + Duration::nanoseconds(1)
        };

        Ok(record.clone())
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
        self.posts
            .lock()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostWithAuthor>, RepoError> {
        let post = self.posts.lock().await.get(&id).cloned();
        match post {
            Some(post) => Ok(Some(self.with_author(post).await?)),
            None => Ok(None),
        }
    }

    async fn find_record(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        Ok(self.posts.lock().await.get(&id).cloned())
    }

    async fn list_posts(&self) -> Result<Vec<PostWithAuthor>, RepoError> {
        let records: Vec<PostRecord> = self.posts.lock().await.values().cloned().collect();
        let mut posts = Vec::with_capacity(records.len());
        for record in records {
            posts.push(self.with_author(record).await?);
        }
        posts.sort_by(|a, b| b.post.created_at.cmp(&a.post.created_at));
        Ok(posts)
    }
}

#[async_trait]
impl UsersRepo for MemoryStore {
    async fn create_user(&self, params: NewUser) -> Result<UserRecord, RepoError> {
        let mut users = self.users.lock().await;
        if users.values().any(|user| user.email == params.email) {
            return Err(RepoError::Duplicate {
                constraint: "users_email_key".to_string(),
            });
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            name: params.name,
            email: params.email,
            image: params.image,
            password_hash: params.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        Ok(self.users.lock().await.get(&id).cloned())
    }
}

#[async_trait]
impl SessionsRepo for MemoryStore {
    async fn insert_session(&self, record: SessionRecord) -> Result<(), RepoError> {
        self.sessions
            .lock()
            .await
            .insert(record.token_hash.clone(), record);
        Ok(())
    }

    async fn find_session(&self, token_hash: &str) -> Result<Option<SessionRecord>, RepoError> {
        Ok(self.sessions.lock().await.get(token_hash).cloned())
    }

    async fn delete_session(&self, token_hash: &str) -> Result<(), RepoError> {
        self.sessions.lock().await.remove(token_hash);
        Ok(())
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    async fn health_check(&self) -> Result<(), RepoError> {
        Ok(())
    }
}

pub fn resolver(store: &Arc<MemoryStore>) -> SessionResolver {
    SessionResolver::new(store.clone(), store.clone())
}

pub fn post_service(store: &Arc<MemoryStore>, require_owner: bool) -> PostService {
    PostService::new(store.clone(), resolver(store), require_owner)
}

pub fn account_service(store: &Arc<MemoryStore>) -> AccountService {
    AccountService::new(store.clone(), store.clone(), Duration::hours(24))
}

pub const SESSION_COOKIE: &str = "foglio_session";

/// The production router wired to in-memory repositories, with the default
/// guard settings.
pub fn router(store: &Arc<MemoryStore>, require_owner: bool) -> axum::Router {
    let state = AppState {
        posts: Arc::new(post_service(store, require_owner)),
        accounts: Arc::new(account_service(store)),
        db: store.clone(),
        session_cookie: SESSION_COOKIE.to_string(),
        session_ttl: Duration::hours(24),
    };
    let guard = GuardConfig {
        protected_prefixes: vec!["/admin".to_string()],
        sign_in_path: "/sign-in".to_string(),
        cookie_name: SESSION_COOKIE.to_string(),
    };
    http::build_router(state, guard)
}

/// Seeds a user directly and opens a session for them, returning the raw
/// session token a client would carry in its cookie.
pub async fn seed_user_with_session(
    store: &Arc<MemoryStore>,
    name: &str,
    email: &str,
) -> (UserRecord, String) {
    let user = store
        .create_user(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            image: None,
            password_hash: "seeded$seeded".to_string(),
        })
        .await
        .expect("seed user");

    let token = format!("test-token-{}", Uuid::new_v4());
    let now = OffsetDateTime::now_utc();
    store
        .insert_session(SessionRecord {
            token_hash: hash_token(&token),
            user_id: user.id,
            created_at: now,
            expires_at: now + Duration::hours(1),
        })
        .await
        .expect("seed session");

    (user, token)
}
