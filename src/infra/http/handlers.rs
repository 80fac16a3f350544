//! HTTP handlers for the public feed, the admin post CRUD, and accounts.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

use crate::application::accounts::IssuedSession;
use crate::application::error::ErrorReport;
use crate::domain::entities::Identity;

use super::error::ApiError;
use super::models::{
    PostListResponse, PostPayload, PostResponse, RegisterPayload, SessionResponse, SignInPayload,
};
use super::state::AppState;

fn session_token<'a>(state: &AppState, jar: &'a CookieJar) -> Option<&'a str> {
    jar.get(&state.session_cookie).map(|cookie| cookie.value())
}

pub async fn list_posts(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let posts = state.posts.list_posts().await?;
    Ok(Json(PostListResponse { posts }))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.posts.get_post(id).await?;
    Ok(Json(PostResponse { post }))
}

pub async fn create_post(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<PostPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let ack = state
        .posts
        .create_post(session_token(&state, &jar), payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(ack)))
}

pub async fn update_post(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
    Json(payload): Json<PostPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let ack = state
        .posts
        .update_post(session_token(&state, &jar), id, payload.into())
        .await?;
    Ok(Json(ack))
}

pub async fn delete_post(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let ack = state
        .posts
        .delete_post(session_token(&state, &jar), id)
        .await?;
    Ok(Json(ack))
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let issued = state
        .accounts
        .register(&payload.name, &payload.email, &payload.password)
        .await?;

    Ok(session_created(&state, jar, issued))
}

pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<SignInPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let issued = state
        .accounts
        .sign_in(&payload.email, &payload.password)
        .await?;

    Ok(session_created(&state, jar, issued))
}

pub async fn sign_out(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = session_token(&state, &jar) {
        state.accounts.sign_out(token).await?;
    }

    let jar = jar.remove(Cookie::from(state.session_cookie.clone()));
    Ok((jar, StatusCode::NO_CONTENT))
}

pub async fn health(State(state): State<AppState>) -> Response {
    match state.db.health_check().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}

fn session_created(
    state: &AppState,
    jar: CookieJar,
    issued: IssuedSession,
) -> impl IntoResponse + use<> {
    let cookie = Cookie::build((state.session_cookie.clone(), issued.token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(state.session_ttl)
        .build();

    let user = Identity {
        id: issued.user.id,
        name: issued.user.name,
        image: issued.user.image,
    };

    (
        jar.add(cookie),
        (StatusCode::CREATED, Json(SessionResponse { user })),
    )
}
