use std::sync::Arc;

use crate::application::accounts::AccountService;
use crate::application::posts::PostService;
use crate::application::repos::HealthCheck;

#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<PostService>,
    pub accounts: Arc<AccountService>,
    pub db: Arc<dyn HealthCheck>,
    /// Name of the session cookie consumed by handlers and the access guard.
    pub session_cookie: String,
    /// Session lifetime, mirrored into cookie max-age.
    pub session_ttl: time::Duration,
}
