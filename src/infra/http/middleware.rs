use std::time::Instant;

use axum::extract::State;
use axum::response::{IntoResponse, Redirect};
use axum::{body::Body, http::Request, middleware::Next, response::Response};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;
use crate::config::AuthSettings;

#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
}

/// Path-prefix gate for the admin area. Requests without session evidence
/// are redirected to the sign-in page with the requested path carried in
/// the `callbackUrl` query parameter. The check is deliberately coarse: it
/// looks for cookie presence, not validity. Resource-level authorization
/// stays in the post service.
#[derive(Clone)]
pub struct GuardConfig {
    pub protected_prefixes: Vec<String>,
    pub sign_in_path: String,
    pub cookie_name: String,
}

impl From<&AuthSettings> for GuardConfig {
    fn from(auth: &AuthSettings) -> Self {
        Self {
            protected_prefixes: auth.protected_prefixes.clone(),
            sign_in_path: auth.sign_in_path.clone(),
            cookie_name: auth.cookie_name.clone(),
        }
    }
}

impl GuardConfig {
    fn protects(&self, path: &str) -> bool {
        self.protected_prefixes
            .iter()
            .any(|prefix| path == prefix || path.starts_with(&format!("{prefix}/")))
    }
}

pub async fn access_guard(
    State(guard): State<GuardConfig>,
    jar: CookieJar,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path();

    if guard.protects(path) && jar.get(&guard.cookie_name).is_none() {
        let query: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("callbackUrl", path)
            .finish();
        let location = format!("{}?{}", guard.sign_in_path, query);

        warn!(
            target = "foglio::http::guard",
            path = %path,
            "unauthenticated request to protected path, redirecting",
        );

        return Redirect::to(&location).into_response();
    }

    next.run(request).await
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let ctx = RequestContext {
        request_id: request_id.clone(),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let status = response.status();

    if status.is_client_error() || status.is_server_error() {
        let elapsed_ms = start.elapsed().as_millis();
        let report = response.extensions_mut().remove::<ErrorReport>();
        let (source, messages) = match report {
            Some(report) => (report.source, report.messages),
            None => ("unknown", Vec::new()),
        };
        let detail = messages
            .first()
            .cloned()
            .unwrap_or_else(|| "no diagnostic available".to_string());

        if status.is_server_error() {
            error!(
                target = "foglio::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = request_id,
                "request failed",
            );
        } else {
            warn!(
                target = "foglio::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = request_id,
                "client request error",
            );
        }
    }

    response
}
